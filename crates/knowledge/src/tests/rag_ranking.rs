//! Ranking behavior of the retriever over a built index.

use super::fakes::{RecordingLlm, ScriptedEmbedder};
use crate::rag::AnswerSynthesizer;
use crate::retriever::Retriever;
use crate::session::Session;
use crate::types::EmbeddingMode;
use crate::vector_index::VectorIndex;
use docchat_core::RetrievalConfig;
use std::sync::Arc;

const ANIMALS: &str = "A cat sat.\nA dog ran.\nA bird flew.";

fn animals_embedder() -> ScriptedEmbedder {
    ScriptedEmbedder::new()
        .with("A cat sat.", &[1.0, 0.0])
        .with("A dog ran.", &[0.0, 1.0])
        .with("A bird flew.", &[0.5, 0.5])
        .with("Which animal sat?", &[0.9, 0.1])
        .with("Which animal ran?", &[0.0, 1.0])
}

fn retriever(embedder: Arc<ScriptedEmbedder>, chunk_size: i64) -> Retriever {
    Retriever::new(
        embedder,
        RetrievalConfig {
            chunk_size,
            chunk_overlap: 0,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_end_to_end_question_answering() {
    let embedder = Arc::new(animals_embedder());
    let llm = Arc::new(RecordingLlm::answering("The cat sat."));
    let session = Session::new(
        retriever(embedder.clone(), 12),
        AnswerSynthesizer::new(llm.clone(), "gemini-1.5-flash"),
    );

    let index = session.process_upload(ANIMALS).await.unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index.dimension(), Some(2));

    let answer = session.ask("Which animal sat?", 2).await.unwrap();
    assert_eq!(answer, "The cat sat.");

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("A cat sat.\nA bird flew.\n\nQuestion: Which animal sat?"));
    assert!(!prompts[0].contains("A dog ran."));
}

#[tokio::test]
async fn test_results_ordered_by_distance() {
    let embedder = Arc::new(animals_embedder());
    let retriever = retriever(embedder, 12);
    let index = retriever.build_from_text(ANIMALS).await.unwrap();

    let chunks = retriever.retrieve(&index, "Which animal sat?", 3).await.unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["A cat sat.", "A bird flew.", "A dog ran."]);
}

#[tokio::test]
async fn test_exact_match_ranks_first() {
    let embedder = Arc::new(animals_embedder());
    let retriever = retriever(embedder, 12);
    let index = retriever.build_from_text(ANIMALS).await.unwrap();

    let chunks = retriever.retrieve(&index, "Which animal ran?", 1).await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "A dog ran.");
}

#[tokio::test]
async fn test_top_k_limited_by_index_size() {
    let embedder = Arc::new(animals_embedder());
    let retriever = retriever(embedder, 12);
    let index = retriever.build_from_text(ANIMALS).await.unwrap();

    let chunks = retriever.retrieve(&index, "Which animal sat?", 30).await.unwrap();
    assert_eq!(chunks.len(), 3);

    let none = retriever.retrieve(&index, "Which animal sat?", 0).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_empty_index_returns_nothing() {
    let embedder = Arc::new(animals_embedder());
    let retriever = retriever(embedder.clone(), 12);
    let index = retriever.build_from_text("").await.unwrap();

    let chunks = retriever.retrieve(&index, "Which animal sat?", 5).await.unwrap();
    assert!(chunks.is_empty());
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn test_ties_keep_document_order() {
    let embedder = Arc::new(
        ScriptedEmbedder::new()
            .with("first", &[1.0, 0.0])
            .with("second", &[1.0, 0.0])
            .with("third", &[1.0, 0.0])
            .with("query", &[0.0, 0.0]),
    );
    let retriever = retriever(embedder, 6);
    let index = retriever.build_from_text("first\nsecond\nthird").await.unwrap();

    let chunks = retriever.retrieve(&index, "query", 3).await.unwrap();
    let orders: Vec<usize> = chunks.iter().map(|c| c.source_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_documents_and_questions_use_distinct_modes() {
    let embedder = Arc::new(animals_embedder());
    let retriever = retriever(embedder.clone(), 12);
    let index = retriever.build_from_text(ANIMALS).await.unwrap();
    retriever.retrieve(&index, "Which animal sat?", 1).await.unwrap();

    let modes = embedder.modes();
    assert_eq!(modes.len(), 4);
    assert!(modes[..3].iter().all(|m| *m == EmbeddingMode::Document));
    assert_eq!(modes[3], EmbeddingMode::Query);
}
