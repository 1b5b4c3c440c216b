// SPDX-License-Identifier: MIT
//
// kilo: a small terminal text editor.
//
// This binary only wires the crates together:
//
//   kilo-term   → raw mode, window size, key decoding, frame output
//   kilo-editor → rows, highlighting, rendering, search, the main loop
//
// Startup order matters. Options are parsed and logging is set up while
// the terminal is still in cooked mode, so a bad `--set` prints a normal
// error. Raw mode is entered next, then the window size is queried (the
// fallback probe needs raw input). The raw-mode guard lives inside `run`,
// so it has already restored the tty by the time `main` clears the screen
// and reports an error.
//
//   ┌──────────────────────────────┐
//   │ text rows                    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar                  │  ← 1 row
//   └──────────────────────────────┘

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use kilo_editor::{Editor, HELP_MESSAGE, Options};
use kilo_term::reader::StdinSource;
use kilo_term::terminal::{self, RawMode};

/// A small terminal text editor with syntax highlighting and incremental search.
#[derive(Parser, Debug)]
#[command(name = "kilo", version, about)]
struct Args {
    /// File to edit. Created on first save if it doesn't exist.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Set an option, e.g. `--set tabstop=8`. May be repeated.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Write diagnostics to this file (filtered by RUST_LOG, default debug).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Options with every `--set` directive applied in order.
    fn options(&self) -> Result<Options> {
        let mut options = Options::default();
        options
            .apply_all(self.set.iter().map(String::as_str))
            .context("invalid --set")?;
        Ok(options)
    }
}

/// Send `tracing` events to `path`. Nothing is ever logged to the terminal
/// the editor draws on.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let fmt_layer = fmt::layer().with_writer(Arc::new(file)).with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .context("cannot install the log subscriber")
}

/// Enter raw mode and edit until the user quits.
fn run(args: &Args, options: Options) -> Result<()> {
    let _raw = RawMode::enable().context("failed to enable raw mode")?;

    let mut src = StdinSource::new();
    let mut stdout = io::stdout();
    let size = terminal::window_size(&mut src, &mut stdout)
        .context("failed to get the window size")?;
    tracing::debug!(cols = size.cols, rows = size.rows, "terminal size");

    let mut editor = Editor::new(size, options);
    if let Some(path) = &args.file {
        editor.open(path)?;
    }
    editor.set_status_message(HELP_MESSAGE);
    editor.run(&mut src, &mut stdout)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let setup = args
        .log_file
        .as_deref()
        .map_or(Ok(()), init_logging)
        .and_then(|()| args.options());
    let options = match setup {
        Ok(options) => options,
        Err(err) => {
            eprintln!("kilo: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&args, options);
    // Leave a clean screen behind whether we quit or failed.
    let _ = terminal::clear_and_home();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("fatal: {err:#}");
            eprintln!("kilo: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
