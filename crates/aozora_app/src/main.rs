mod config;
mod output;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use aozora_engine::{discover_blocking, Collector, CollectorEvent, CollectorHandle, EntryOutcome};
use aozora_logging::{collector_info, collector_warn};
use clap::Parser;

use config::{AppSettings, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Not logged: the logger may not be installed yet.
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = AppSettings::from_cli(cli)?;
    if !aozora_logging::initialize(settings.log_destination.clone(), settings.log_level) {
        eprintln!("warning: logging is disabled, no logger could be installed");
    }

    let collector = Collector::new(settings.collector);

    if settings.list_only {
        let mut out = io::stdout().lock();
        for candidate in discover_blocking(&collector, &settings.index_url)? {
            output::write_candidate(&mut out, &candidate)?;
        }
        return Ok(out.flush()?);
    }

    // stdout is locked per document; the worker thread may log meanwhile.
    let handle = CollectorHandle::start(collector, settings.index_url, settings.deadline)?;
    for event in handle.events() {
        match event {
            CollectorEvent::Discovered { candidates } => {
                collector_info!("{candidates} works found");
            }
            CollectorEvent::Outcome(EntryOutcome::Extracted(document)) => {
                output::write_document(&mut io::stdout().lock(), &document)?;
            }
            CollectorEvent::Outcome(EntryOutcome::Failed { entry, error }) => {
                collector_warn!(
                    "{} ({}/{}): {}",
                    entry.title,
                    entry.author_id,
                    entry.title_id,
                    error
                );
            }
            CollectorEvent::Outcome(EntryOutcome::Skipped { candidate, reason }) => {
                collector_info!(
                    "skipped {} ({}/{}): {}",
                    candidate.title,
                    candidate.author_id,
                    candidate.title_id,
                    reason
                );
            }
            CollectorEvent::Finished(result) => {
                let summary = result?;
                if summary.cancelled {
                    collector_warn!("run cancelled before all works were processed");
                }
            }
        }
    }
    Ok(io::stdout().flush()?)
}
