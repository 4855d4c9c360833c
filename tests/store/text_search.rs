//! Text search through the bag-of-words embedder.

use crate::common::*;

#[test]
fn embedded_documents_round_trip_and_rank() {
    let mut t = TestStore::new();
    let mut embedder = TextEmbedder::new(64).unwrap();

    let docs = [
        ("rust", "rust is a systems programming language"),
        ("python", "python is a scripting language"),
        ("cooking", "slow cooked tomato sauce with basil"),
    ];
    for (id, text) in docs {
        t.store().save(embedder.embed(text, id).unwrap()).unwrap();
    }
    t.reopen();

    let query = embedder.embed_query("systems programming in rust").unwrap();
    let results = t
        .store()
        .query()
        .similar_to_record(&query)
        .limit(1)
        .execute()
        .unwrap();
    assert_eq!(ids(&results), vec!["rust"]);
}

#[test]
fn unrelated_text_scores_below_related_text() {
    let t = TestStore::new();
    let mut embedder = TextEmbedder::new(128).unwrap();
    t.store()
        .save(embedder.embed("vector database storage engine", "db").unwrap())
        .unwrap();
    t.store()
        .save(embedder.embed("garden flowers in spring", "garden").unwrap())
        .unwrap();

    let query = embedder.embed_query("database engine").unwrap();
    let results = t.store().search(query.values(), 0, 0.0).unwrap();
    assert_eq!(results[0].id().as_str(), "db");
    assert!(results[0].score > results[1].score);
}
