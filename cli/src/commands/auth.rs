use anyhow::Result;

use quill_engine::{App, RegisterOutcome};

use super::prompt_line;

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_line("Password")?,
    };
    app.auth().login(email, &password).await?;
    eprintln!("Signed in as {email}");
    Ok(())
}

pub async fn register(
    app: &App,
    name: &str,
    email: &str,
    password: Option<String>,
    confirmation: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_line("Password")?,
    };
    let confirmation = match confirmation {
        Some(confirmation) => confirmation,
        None => prompt_line("Confirm password")?,
    };

    match app
        .auth()
        .register(name, email, &password, &confirmation)
        .await?
    {
        RegisterOutcome::SignedIn => eprintln!("Account created; signed in as {email}"),
        RegisterOutcome::Registered(identity) => {
            eprintln!(
                "Account created for {}. Run `quill login --email {}` to sign in.",
                identity.name, identity.email
            );
        }
    }
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    app.auth().logout()?;
    eprintln!("Signed out");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    if !app.auth().is_authenticated() {
        eprintln!("Not signed in");
        return Ok(());
    }
    let identity = app.auth().current_identity().await?;
    println!("{} <{}>", identity.name, identity.email);
    Ok(())
}
