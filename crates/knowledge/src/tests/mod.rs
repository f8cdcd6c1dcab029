//! Cross-module scenarios for the retrieval pipeline.

mod rag_ranking;
