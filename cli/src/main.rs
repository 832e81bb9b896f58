//! Quill CLI: sign in, generate README documents and browse past generations.
//!
//! ```text
//! main() -> init_tracing() -> QuillConfig::load() -> App::new() -> commands::*
//! ```
//!
//! Documents are written to stdout. Status lines, stage labels and errors go to stderr.

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use quill_engine::{App, GenerationMode, QuillConfig};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Generate README documents from a short project description", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session credential
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        /// Read from stdin when omitted
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Generate a README for a project
    Generate(GenerateArgs),
    /// List past generations, or show one
    History(HistoryArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long = "name")]
    project_name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    tech_stack: String,
    #[arg(long)]
    features: String,
    #[arg(long = "install")]
    installation_steps: String,
    #[arg(long = "notes", default_value = "")]
    extra_notes: String,
    /// `basic` (Basic README) or `advanced` (Advanced AI Architect)
    #[arg(long, default_value_t = GenerationMode::Basic)]
    mode: GenerationMode,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Args)]
struct HistoryArgs {
    /// Print the document of this entry
    #[arg(long)]
    show: Option<Uuid>,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Args)]
struct ExportArgs {
    /// Copy the document to the clipboard
    #[arg(long)]
    copy: bool,
    /// Save the document into the download directory
    #[arg(long)]
    download: bool,
    /// Directory for `--download` (defaults to `export.download_dir`)
    #[arg(long, requires = "download")]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();

    let config = match QuillConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Ignoring config: {e}");
            eprintln!("warning: {e}");
            QuillConfig::default()
        }
    };
    let mut app = App::new(&config)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            commands::auth::register(&app, &name, &email, password, confirm_password).await?;
        }
        Commands::Logout => commands::auth::logout(&app)?,
        Commands::Whoami => commands::auth::whoami(&app).await?,
        Commands::Generate(args) => commands::generate::run(&app, args).await?,
        Commands::History(args) => commands::history::run(&mut app, args).await?,
    }

    Ok(())
}
