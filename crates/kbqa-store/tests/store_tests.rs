use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use kbqa_store::model::INITIAL_VERSION;
use kbqa_store::store::{CURRENT_FILE, SYNC_LOG_FILE};
use kbqa_store::{
    export_text, knowledge_document, parse_text, sync, KnowledgeBase, KnowledgeStore, PageFetcher, Section,
    StoreError, SyncConfig,
};
use tempfile::tempdir;

fn kb_with(sections: &[(&str, &str)]) -> KnowledgeBase {
    let mut kb = KnowledgeBase::default();
    for (title, content) in sections {
        kb.add_section(Section::new(*title, *content)).unwrap();
    }
    kb
}

#[test]
fn missing_store_loads_empty_kb() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::new(dir.path().join("kb"));
    let kb = store.load().unwrap();
    assert!(kb.sections.is_empty());
    assert_eq!(kb.version, INITIAL_VERSION);
    assert!(store.versions().unwrap().is_empty());
    assert_eq!(store.load_sync_config().unwrap(), SyncConfig::default());
}

#[test]
fn save_versions_and_restore() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::open(dir.path()).unwrap();

    let mut kb = kb_with(&[("Hours", "Mon - Fri")]);
    assert_eq!(store.save(&mut kb, "initial").unwrap(), "1.0.0");
    assert_eq!(kb.version, "1.0.0");
    assert!(kb.last_updated.is_some());

    kb.update_section("Hours", "Mon - Sat").unwrap();
    assert_eq!(store.save(&mut kb, "open saturdays").unwrap(), "2.0.0");

    let versions = store.versions().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].commit_message, "open saturdays");
    for v in &versions {
        assert_eq!(v.hash.len(), 8);
        assert!(v.hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(fs::metadata(&v.file).is_ok(), "missing {}", v.file);
    }
    assert_eq!(store.load().unwrap().find_section("Hours").unwrap().content, "Mon - Sat");

    let restored = store.restore("1.0.0").unwrap();
    assert_eq!(restored.find_section("Hours").unwrap().content, "Mon - Fri");
    assert_eq!(store.load().unwrap(), restored);

    assert!(matches!(store.restore("9.0.0"), Err(StoreError::VersionNotFound(v)) if v == "9.0.0"));
}

#[test]
fn content_hash_is_stable() {
    let kb = kb_with(&[("A", "alpha")]);
    assert_eq!(kb.content_hash().unwrap(), kb.clone().content_hash().unwrap());
    let other = kb_with(&[("A", "beta")]);
    assert_ne!(kb.content_hash().unwrap(), other.content_hash().unwrap());
}

#[test]
fn unknown_fields_round_trip() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::open(dir.path()).unwrap();
    let raw = r#"{
        "sections": [{"title": "T", "content": "c", "priority": 3}],
        "version": "1.0.0",
        "last_updated": null,
        "migrated_from": "hardcoded_text"
    }"#;
    fs::write(dir.path().join(CURRENT_FILE), raw).unwrap();

    let kb = store.load().unwrap();
    assert_eq!(kb.extra["migrated_from"], "hardcoded_text");
    assert_eq!(kb.sections[0].extra["priority"], 3);
    store.save_current(&kb).unwrap();

    let written = fs::read_to_string(dir.path().join(CURRENT_FILE)).unwrap();
    assert!(written.contains("migrated_from"));
    assert!(written.contains("priority"));
    assert!(!written.contains("auto_synced"));
}

#[test]
fn section_crud() {
    let mut kb = kb_with(&[("Hours", "Mon - Fri")]);
    assert!(matches!(kb.add_section(Section::new("Hours", "dup")), Err(StoreError::DuplicateSection(_))));
    assert!(kb.update_section("Hours", "daily").unwrap().updated_at.is_some());
    assert!(matches!(kb.update_section("Nope", "x"), Err(StoreError::SectionNotFound(_))));
    assert_eq!(kb.remove_section("Hours").unwrap().content, "daily");
    assert!(kb.find_section("Hours").is_none());
    assert!(kb.remove_section("Hours").is_err());
}

#[test]
fn export_text_layout() {
    let kb = kb_with(&[("Hours", "Mon - Fri"), ("Contact", "Phone 123")]);
    let rule = "=".repeat(47);
    let expected = format!(
        "OFFICE INFO\n\n{rule}\nHOURS\n{rule}\n\nMon - Fri\n\n{rule}\nCONTACT\n{rule}\n\nPhone 123\n\n"
    );
    assert_eq!(export_text(&kb, "OFFICE INFO"), expected);

    let doc = knowledge_document(&kb, "OFFICE INFO");
    assert_eq!(doc.title, "OFFICE INFO");
    assert_eq!(doc.text, expected);
}

#[test]
fn parse_text_splits_on_rules() {
    let rule = "=".repeat(44);
    let long = "x".repeat(120);
    let text = format!("Contacts\nPhone 123\n{rule}\nHours\nMon - Fri\n{rule}\n{long}\nstill hours\n{rule}\nEmpty\n");
    let sections = parse_text(&text);
    let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Contacts", "Hours"]);
    assert_eq!(sections[0].content, "Phone 123");
    assert_eq!(sections[1].content, format!("Mon - Fri\n{long}\nstill hours"));
    assert!(sections.iter().all(|s| s.created_at.is_some()));
}

struct StubFetcher {
    pages: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages.iter().map(|(u, b)| (u.to_string(), b.to_string())).collect(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl PageFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> kbqa_store::Result<String> {
        self.calls.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::Fetch { url: url.to_string(), message: "404".into() })
    }
}

fn enable_sync(store: &KnowledgeStore, urls: &[&str]) {
    let config = SyncConfig { enabled: true, urls: urls.iter().map(|u| u.to_string()).collect(), ..SyncConfig::default() };
    store.save_sync_config(&config).unwrap();
}

#[test]
fn disabled_sync_does_nothing() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::open(dir.path()).unwrap();
    let fetcher = StubFetcher::new(&[]);
    let report = sync(&store, &fetcher, 5000).unwrap();
    assert!(!report.ran);
    assert!(fetcher.calls.borrow().is_empty());
    assert!(store.versions().unwrap().is_empty());
}

#[test]
fn sync_adds_then_updates_sections() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::open(dir.path()).unwrap();
    let mut kb = kb_with(&[("Manual", "kept as is")]);
    store.save(&mut kb, "seed").unwrap();
    enable_sync(&store, &["https://a.example/news", "https://b.example/down"]);

    let fetcher = StubFetcher::new(&[("https://a.example/news", "<html><body><p>Rate held</p></body></html>")]);
    let report = sync(&store, &fetcher, 5000).unwrap();
    assert!(report.ran);
    assert_eq!((report.fetched, report.failed, report.added, report.updated), (1, 1, 1, 0));
    assert_eq!(report.version.as_deref(), Some("2.0.0"));

    let kb = store.load().unwrap();
    let synced = kb.find_section("Auto-Synced from https://a.example/news").unwrap();
    assert!(synced.auto_synced);
    assert_eq!(synced.content, "Rate held");
    assert_eq!(synced.source_url.as_deref(), Some("https://a.example/news"));
    assert!(kb.find_section("Manual").is_some());

    let fetcher = StubFetcher::new(&[("https://a.example/news", "<p>Rate cut</p>")]);
    let report = sync(&store, &fetcher, 5000).unwrap();
    assert_eq!((report.added, report.updated), (0, 1));
    let kb = store.load().unwrap();
    assert_eq!(kb.sections.len(), 2);
    assert_eq!(kb.find_section("Auto-Synced from https://a.example/news").unwrap().content, "Rate cut");

    assert!(store.load_sync_config().unwrap().last_sync.is_some());
    let log = fs::read_to_string(dir.path().join(SYNC_LOG_FILE)).unwrap();
    assert!(log.contains("ERROR fetching https://b.example/down"));
    assert!(log.lines().all(|l| l.starts_with('[')));
}

#[test]
fn sync_truncates_long_pages() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::open(dir.path()).unwrap();
    enable_sync(&store, &["https://a.example"]);
    let body = format!("<p>{}</p>", "é".repeat(50));
    let fetcher = StubFetcher::new(&[("https://a.example", body.as_str())]);
    sync(&store, &fetcher, 10).unwrap();
    let kb = store.load().unwrap();
    assert_eq!(kb.sections[0].content, "é".repeat(10));
}

#[test]
fn manual_section_with_same_url_is_not_replaced() {
    let mut kb = KnowledgeBase::default();
    let mut manual = Section::new("Notes", "hand written");
    manual.source_url = Some("https://a.example".into());
    kb.add_section(manual).unwrap();
    assert!(!kb.upsert_synced(Section::synced("https://a.example", "fresh")));
    assert_eq!(kb.sections.len(), 2);
    assert!(kb.upsert_synced(Section::synced("https://a.example", "fresher")));
    assert_eq!(kb.sections.len(), 2);
    assert_eq!(kb.sections[1].content, "fresher");
}

#[test]
fn sync_without_any_content_fails() {
    let dir = tempdir().unwrap();
    let store = KnowledgeStore::open(dir.path()).unwrap();
    enable_sync(&store, &["https://a.example", "https://b.example"]);
    let fetcher = StubFetcher::new(&[("https://b.example", "<script>only()</script>")]);
    let err = sync(&store, &fetcher, 5000).unwrap_err();
    assert!(matches!(err, StoreError::NothingFetched { attempted: 2 }));
    assert!(store.versions().unwrap().is_empty());
}
