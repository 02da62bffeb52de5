use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use kbqa_cli::{init_tracing, knowledge_store, load_settings};
use kbqa_store::{sync, HttpFetcher, StoreError};

#[derive(Parser, Debug)]
#[command(name = "kbqa-sync", about = "Mirror configured web pages into the knowledge base")]
struct SyncCli {
    /// Knowledge base directory (defaults to store.dir)
    #[arg(long, env = "KBQA_STORE_DIR")]
    dir: Option<std::path::PathBuf>,
}

fn run(cli: SyncCli) -> Result<ExitCode> {
    let settings = load_settings()?;
    let store = match cli.dir {
        Some(dir) => kbqa_store::KnowledgeStore::new(dir),
        None => knowledge_store(&settings),
    };
    if !store.exists() {
        error!(dir = %store.dir().display(), "knowledge base directory not found");
        return Ok(ExitCode::FAILURE);
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(settings.store.sync_timeout_secs))?;
    match sync(&store, &fetcher, settings.store.max_section_chars) {
        Ok(report) if !report.ran => Ok(ExitCode::SUCCESS),
        Ok(report) => {
            println!(
                "fetched {} / failed {} / added {} / updated {}{}",
                report.fetched,
                report.failed,
                report.added,
                report.updated,
                report.version.map(|v| format!(" -> version {v}")).unwrap_or_default()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ StoreError::NothingFetched { .. }) => {
            error!(error = %e, "sync aborted");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run(SyncCli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "sync failed");
            ExitCode::FAILURE
        }
    }
}
