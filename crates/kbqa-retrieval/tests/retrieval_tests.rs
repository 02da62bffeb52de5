use std::sync::Arc;

use anyhow::{anyhow, Result};
use kbqa_core::config::{AcronymBoost, ScoringWeights, Settings};
use kbqa_core::{Chunker, Document, Embedder};
use kbqa_embed::FakeEmbedder;
use kbqa_retrieval::scorer::token_overlap;
use kbqa_retrieval::{extract, extract_query, ingest, ChunkStore, RetrievalEngine, Scorer};

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize { 4 }
    fn encode(&self, _text: &str) -> Result<Vec<f32>> { Err(anyhow!("model crashed")) }
}

fn lexical_engine() -> RetrievalEngine {
    RetrievalEngine::from_settings(&Settings::default(), None).unwrap()
}

fn store_with(engine: &RetrievalEngine, docs: &[(&str, &str)]) -> ChunkStore {
    let mut store = ChunkStore::new();
    for (id, text) in docs {
        engine.index(&mut store, &Document::new(*id, *text));
    }
    store
}

#[test]
fn parenthesized_acronym_wins_and_unrelated_chunk_is_excluded() {
    let engine = lexical_engine();
    let store = store_with(&engine, &[
        ("a", "Rapat Dewan Gubernur (RDG)"),
        ("b", "Inflasi bulan ini stabil"),
    ]);
    let hits = engine.retrieve(&store, "RDG", 5);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "a");
    assert!((hits[0].score - 25.0).abs() < 1e-4, "score was {}", hits[0].score);
}

#[test]
fn acronym_bonus_can_be_disabled() {
    let settings = Settings {
        retrieval: kbqa_core::config::RetrievalSettings { top_k: 5, acronym_boost: AcronymBoost::Never },
        ..Settings::default()
    };
    let engine = RetrievalEngine::from_settings(&settings, None).unwrap();
    let store = store_with(&engine, &[("a", "Rapat Dewan Gubernur (RDG)")]);
    assert!(engine.retrieve(&store, "RDG", 5).is_empty());
}

#[test]
fn more_matching_chunk_ranks_first() {
    let engine = lexical_engine();
    let store = store_with(&engine, &[
        ("partial", "apple"),
        ("full", "apple banana cherry"),
        ("none", "grape"),
    ]);
    let hits = engine.retrieve(&store, "apple banana cherry", 10);
    let ids: Vec<&str> = hits.iter().map(|h| h.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["full", "partial"]);
    assert!(hits[0].score > hits[1].score);
    assert!(hits.iter().all(|h| h.score > 0.0));
}

#[test]
fn results_are_bounded_by_k() {
    let engine = lexical_engine();
    let docs: Vec<(String, String)> = (0..6).map(|i| (format!("d{i}"), format!("shared term {i}"))).collect();
    let refs: Vec<(&str, &str)> = docs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let store = store_with(&engine, &refs);
    assert_eq!(engine.retrieve(&store, "shared", 3).len(), 3);
    assert_eq!(engine.retrieve(&store, "shared", 100).len(), 6);
    assert!(engine.retrieve(&store, "shared", 0).is_empty());
}

#[test]
fn equal_scores_keep_ingestion_order() {
    let engine = lexical_engine();
    let store = store_with(&engine, &[
        ("first", "water pump manual"),
        ("second", "water pump manual"),
        ("third", "water pump manual"),
    ]);
    let ids: Vec<String> = engine.retrieve(&store, "pump", 3).into_iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn blank_query_or_empty_store_returns_nothing() {
    let engine = lexical_engine();
    let store = store_with(&engine, &[("a", "some text")]);
    assert!(engine.retrieve(&store, "", 5).is_empty());
    assert!(engine.retrieve(&store, "   \t\n", 5).is_empty());
    assert!(engine.retrieve(&ChunkStore::new(), "text", 5).is_empty());
}

#[test]
fn failing_encoder_degrades_to_lexical_ranking() {
    let lexical = lexical_engine();
    let failing = RetrievalEngine::from_settings(&Settings::default(), Some(Arc::new(FailingEmbedder))).unwrap();
    let docs = [("a", "Rapat Dewan Gubernur (RDG)"), ("b", "jadwal rapat dewan")];

    let store_lexical = store_with(&lexical, &docs);
    let store_failing = store_with(&failing, &docs);
    assert!(store_failing.chunks().iter().all(|c| c.features.embedding.is_none()));

    for query in ["RDG", "rapat dewan", "jadwal"] {
        assert_eq!(
            failing.retrieve(&store_failing, query, 5),
            lexical.retrieve(&store_lexical, query, 5),
            "query {query:?}"
        );
    }
}

#[test]
fn semantic_similarity_dominates_with_an_encoder() {
    let engine = RetrievalEngine::from_settings(&Settings::default(), Some(Arc::new(FakeEmbedder::new(384)))).unwrap();
    let store = store_with(&engine, &[
        ("garden", "garden tools and seeds"),
        ("solar", "solar panel maintenance schedule"),
    ]);
    assert!(store.chunks().iter().all(|c| c.features.embedding.is_some()));
    let hits = engine.retrieve(&store, "solar panel maintenance", 2);
    assert_eq!(hits[0].doc_id, "solar");
    assert!(hits[0].score > 40.0, "score was {}", hits[0].score);
}

#[test]
fn reindexing_a_document_replaces_its_chunks() {
    let engine = lexical_engine();
    let mut store = store_with(&engine, &[("a", "old text"), ("b", "other")]);
    engine.index(&mut store, &Document::new("a", "new text"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.documents(), vec!["b".to_string(), "a".to_string()]);
    assert!(engine.retrieve(&store, "old", 5).is_empty());
    assert_eq!(engine.retrieve(&store, "new", 5)[0].doc_id, "a");

    assert_eq!(store.remove("a"), 1);
    assert_eq!(store.remove("missing"), 0);
    store.clear();
    assert!(store.is_empty());
}

#[test]
fn reindexing_with_empty_text_drops_the_document() {
    let engine = lexical_engine();
    let mut store = store_with(&engine, &[("a", "stale pump manual")]);
    assert_eq!(engine.retrieve(&store, "pump", 5).len(), 1);

    assert_eq!(engine.index(&mut store, &Document::new("a", "")), 0);
    assert!(store.is_empty());
    assert!(store.documents().is_empty());
    assert!(engine.retrieve(&store, "pump", 5).is_empty());
}

#[test]
fn chunks_carry_document_position_and_title() {
    let chunker = Chunker::new(10, 2).unwrap();
    let engine = RetrievalEngine::new(chunker, Scorer::default(), None);
    let doc = Document::new("manual", "abcdefghij klmnopqrst uvwxyz").with_title("Pump Manual");
    let chunks = engine.ingest_document(&doc);
    let total = chunker.expected_chunks(doc.text.chars().count());
    assert_eq!(chunks.len(), total);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.chunk.chunk_index, i);
        assert_eq!(c.chunk.total_chunks, total);
        assert_eq!(c.chunk.doc_title, "Pump Manual");
        assert_eq!(c.features.length, c.chunk.text.chars().count());
    }

    let free = ingest("manual", &doc.text, &chunker, None);
    assert_eq!(free.len(), total);
    assert_eq!(free[0].chunk.doc_title, "manual");
}

#[test]
fn keywords_keep_duplicates_and_feed_the_acronym_bonus() {
    let chunk = extract("Kebijakan moneter kebijakan fiskal", None);
    assert_eq!(chunk.keywords, vec!["kebijakan", "moneter", "kebijakan", "fiskal"]);

    let scorer = Scorer::new(ScoringWeights::default(), AcronymBoost::Always);
    let query = extract_query("kebijakan", None);
    // overlap 2, phrase 10, two keyword hits 6, one term hit 1
    assert!((scorer.score(&query, &chunk) - 19.0).abs() < 1e-4);
}

#[test]
fn adding_matching_query_terms_never_lowers_the_score() {
    let chunk = extract("pompa air tenaga surya untuk kebun", None);
    let scorer = Scorer::default();
    let terms = ["pompa", "air", "tenaga", "surya", "untuk"];

    let mut last_overlap = 0;
    let mut last_score = 0.0f32;
    for n in 1..=terms.len() {
        let query = extract_query(&terms[..n].join(" "), None);
        let overlap = token_overlap(&query, &chunk);
        let score = scorer.score(&query, &chunk);
        assert_eq!(overlap, n);
        assert!(overlap >= last_overlap);
        assert!(score >= last_score, "{n} terms scored {score} after {last_score}");
        last_overlap = overlap;
        last_score = score;
    }
}

#[test]
fn parenthesized_acronym_beats_plain_mention() {
    let scorer = Scorer::default();
    let query = extract_query("RDG", None);
    let paren = scorer.score(&query, &extract("Keputusan Rapat Dewan Gubernur (RDG)", None));
    let plain = scorer.score(&query, &extract("Keputusan RDG bulan ini", None));
    let spelled_out = scorer.score(&query, &extract("Rapat Dewan Gubernur", None));

    assert!((paren - 25.0).abs() < 1e-4, "paren scored {paren}");
    assert!((plain - 12.0).abs() < 1e-4, "plain scored {plain}");
    assert_eq!(spelled_out, 0.0);
    assert!(paren > plain && plain > spelled_out);

    let engine = lexical_engine();
    let store = store_with(&engine, &[
        ("spelled", "Rapat Dewan Gubernur"),
        ("plain", "Keputusan RDG bulan ini"),
        ("paren", "Keputusan Rapat Dewan Gubernur (RDG)"),
    ]);
    let ids: Vec<_> = engine.retrieve(&store, "RDG", 5).into_iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec!["paren", "plain"]);
}
