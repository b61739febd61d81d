pub mod creator_ingestion;
pub mod embedding_client;
pub mod llm_client;
pub mod platform_client;
pub mod platform_search;
pub mod query_digest;
pub mod query_digest_cache;
pub mod query_expansion;
pub mod quota_governor;
pub mod ranking;
pub mod read_view;
pub mod scoring;
pub mod search_core;
pub mod session_materializer;
pub mod token_governor;
