mod settings;

use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{anyhow, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photo_import_core::{
    CancellationToken, ImportControl, ImportEvent, Importer, RecognizedExtensionSet,
};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "photo-import", version, about = "Copy RAW photos into YYYY/MM/DD folders by capture date")]
struct Cli {
    /// Source folder (e.g. a memory card); defaults to the last one used
    source: Option<PathBuf>,

    /// Destination folder; defaults to the last one used
    dest: Option<PathBuf>,

    /// Extension to import instead of the built-in RAW list (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Print events as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Do not remember the folders for next time
    #[arg(long)]
    no_save: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings_path = Settings::default_path();
    let mut settings = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();

    let source = cli.source.or_else(|| settings.source.clone());
    let dest = cli.dest.or_else(|| settings.dest.clone());
    let Some(source) = source.filter(|p| p.is_dir()) else {
        bail!("Invalid Source Directory");
    };
    let Some(dest) = dest.filter(|p| p.is_dir()) else {
        bail!("Invalid Destination Directory");
    };

    let importer = if cli.extensions.is_empty() {
        Importer::default()
    } else {
        Importer::new(RecognizedExtensionSet::new(&cli.extensions))
    };

    let token = CancellationToken::new();
    {
        let token = token.clone();
        ctrlc::set_handler(move || token.cancel())?;
    }
    let control = ImportControl::new().with_cancel_token(token);

    // The engine runs on a worker thread; this thread owns the terminal.
    let (tx, rx) = mpsc::channel::<ImportEvent>();
    let handle = {
        let source = source.clone();
        let dest = dest.clone();
        std::thread::spawn(move || {
            let cb = move |event: &ImportEvent| {
                if let Err(err) = tx.send(event.clone()) {
                    tracing::debug!(error = %err, "event receiver gone");
                }
            };
            importer.run(&source, &dest, &control, &cb)
        })
    };

    let pb = if cli.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map(|style| style.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for event in rx {
        match &event {
            ImportEvent::Started { total, .. } => pb.set_length(*total),
            ImportEvent::Progress { current, total } => {
                pb.set_length(*total);
                pb.set_position(*current);
                continue;
            }
            _ => {}
        }
        if cli.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            pb.println(event.to_string());
        }
    }
    pb.finish_and_clear();

    let result = handle
        .join()
        .map_err(|_| anyhow!("Import thread panicked"))??;

    if !cli.no_save {
        settings.source = Some(source);
        settings.dest = Some(dest);
        if let Some(path) = settings_path.as_deref() {
            if let Err(err) = settings.save(path) {
                tracing::warn!(?path, error = %format!("{:#}", err), "failed to save settings");
            }
        }
    }

    if !cli.json {
        eprintln!(
            "Import Completed! Copied: {} Skipped: {}{}",
            result.copied,
            result.skipped,
            if result.cancelled { " (cancelled)" } else { "" }
        );
    }
    Ok(())
}
