pub mod auth;
pub mod generate;
pub mod history;

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use quill_utils::{SystemClipboard, copy_to_clipboard, download};

use crate::ExportArgs;

/// Prompt on stderr and read one line from stdin, without the trailing newline.
fn prompt_line(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Copy and/or save `document` as requested. The text is exported byte for byte.
fn export(
    args: &ExportArgs,
    default_dir: &Path,
    project_name: Option<&str>,
    document: &str,
) -> Result<()> {
    if args.copy {
        let mut clipboard = SystemClipboard::open().context("clipboard unavailable")?;
        copy_to_clipboard(&mut clipboard, document)?;
        eprintln!("Copied to clipboard");
    }

    if args.download {
        let dir = args.out_dir.as_deref().unwrap_or(default_dir);
        let path = download(dir, project_name, document)?;
        eprintln!("Saved {}", path.display());
    }

    Ok(())
}
