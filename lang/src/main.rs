use anyhow::{Context as _, Result};
use clap::Parser;
use smartkbd_lang::{parse_script, ConverterKind, KeyDispatcher, LangConfig, MemorySurface};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Replay key scripts against an in-memory text field.
///
/// Each stdin line is one script: plain characters are key presses, `^x` is
/// a shifted x, `<BS>` is backspace, `<DAK>` is the dakuten key and
/// `<PICK:word>` picks a suggestion.
/// The resulting text is printed with `|` marking the cursor.
#[derive(Parser)]
#[command(name = "smartkbd", version)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Converter for the composing word (overrides the config file)
    #[arg(long, value_enum)]
    converter: Option<ConverterKind>,

    /// Treat the apostrophe as a word separator
    #[arg(long)]
    apostrophe_separator: bool,

    /// Commit characters directly instead of composing words
    #[arg(long)]
    no_composing: bool,

    /// Keep the text of one line as the starting text of the next
    #[arg(long)]
    keep: bool,

    /// Leave the last word composing instead of committing it
    #[arg(long)]
    no_finish: bool,
}

fn load_config(args: &Args) -> Result<LangConfig> {
    let mut config = match &args.config {
        Some(path) => LangConfig::load_toml(path)?,
        None => LangConfig::default(),
    };
    if let Some(kind) = args.converter {
        config.converter = kind;
    }
    if args.apostrophe_separator {
        config.base.apostrophe_separator = true;
    }
    if args.no_composing {
        config.base.composing = false;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::debug!(?config, "configuration loaded");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut carried = String::new();

    for (n, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let keys = parse_script(&line).with_context(|| format!("line {}", n + 1))?;

        let mut dispatcher =
            KeyDispatcher::new(config.clone(), MemorySurface::with_text(&carried));
        dispatcher.process_keys(keys);
        if !args.no_finish {
            dispatcher.finish();
        }

        let surface = dispatcher
            .surface()
            .context("dispatcher lost its editing surface")?;
        writeln!(stdout, "{}", surface.render())?;
        if args.keep {
            carried = surface.text().to_string();
        }
    }
    Ok(())
}
