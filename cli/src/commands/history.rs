use anyhow::{Result, bail};

use quill_engine::App;

use crate::HistoryArgs;

pub async fn run(app: &mut App, args: HistoryArgs) -> Result<()> {
    app.history_mut().list().await?;

    let Some(id) = args.show else {
        if args.export.copy || args.export.download {
            bail!("--copy and --download need --show <id>");
        }
        let entries = app.history().entries();
        if entries.is_empty() {
            eprintln!("No history yet");
        }
        for entry in entries {
            println!(
                "{}  {}  {}",
                entry.id,
                entry.created_at.format("%Y-%m-%d %H:%M"),
                entry.project_name
            );
        }
        return Ok(());
    };

    let Some(entry) = app.history_mut().select(id).cloned() else {
        bail!("no history entry with id {id}");
    };

    print!("{}", entry.readme());
    if !entry.readme().is_empty() && !entry.readme().ends_with('\n') {
        println!();
    }

    super::export(
        &args.export,
        app.download_dir(),
        Some(&entry.project_name),
        entry.readme(),
    )
}
