use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::fetch::PageFetcher;
use crate::html::html_to_text;
use crate::model::{now_iso, Section};
use crate::store::KnowledgeStore;

pub const DEFAULT_MAX_SECTION_CHARS: usize = 5000;

/// Outcome of one [`sync`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// `false` when sync is disabled or has no URLs; nothing was touched.
    pub ran: bool,
    pub fetched: usize,
    pub failed: usize,
    pub added: usize,
    pub updated: usize,
    /// Version created by the save, if any.
    pub version: Option<String>,
}

/// Fetch every configured URL and upsert one auto-synced section per page.
///
/// Individual fetch failures are logged and skipped. Returns
/// [`StoreError::NothingFetched`] when no page produced text.
pub fn sync(store: &KnowledgeStore, fetcher: &dyn PageFetcher, max_section_chars: usize) -> Result<SyncReport> {
    let log = |message: &str| {
        info!("{message}");
        if let Err(e) = store.append_log(message) {
            warn!(error = %e, "could not write sync log");
        }
    };

    let mut config = store.load_sync_config()?;
    if !config.enabled {
        log("Auto-sync is disabled. Skipping.");
        return Ok(SyncReport::default());
    }
    if config.urls.is_empty() {
        log("No URLs configured for sync");
        return Ok(SyncReport::default());
    }

    log("Starting scheduled sync");
    log(&format!("Syncing {} URL(s)", config.urls.len()));
    let mut report = SyncReport { ran: true, ..SyncReport::default() };
    let mut pages = Vec::new();
    for url in &config.urls {
        log(&format!("Fetching: {url}"));
        let text = fetcher.fetch(url).map(|html| html_to_text(&html));
        match text {
            Ok(text) if !text.is_empty() => {
                log(&format!("SUCCESS: Fetched {} characters", text.chars().count()));
                report.fetched += 1;
                pages.push((url.clone(), text));
            }
            Ok(_) => {
                log(&format!("FAILED: {url} returned no text"));
                report.failed += 1;
            }
            Err(e) => {
                log(&format!("ERROR fetching {url}: {e}"));
                report.failed += 1;
            }
        }
    }

    if pages.is_empty() {
        log("No content fetched. Sync aborted.");
        return Err(StoreError::NothingFetched { attempted: config.urls.len() });
    }

    let mut kb = store.load()?;
    for (url, text) in pages {
        let content: String = text.chars().take(max_section_chars).collect();
        if kb.upsert_synced(Section::synced(&url, content)) {
            log(&format!("Updated existing section from {url}"));
            report.updated += 1;
        } else {
            log(&format!("Added new section from {url}"));
            report.added += 1;
        }
    }
    let version = store.save(&mut kb, "Auto-sync")?;
    report.version = Some(version);

    config.last_sync = Some(now_iso());
    store.save_sync_config(&config)?;
    log("Sync completed successfully");
    Ok(report)
}
