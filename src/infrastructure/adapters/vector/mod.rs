//! Vector Adapter - Qdrant 向量库

mod qdrant_store;

pub use qdrant_store::{QdrantConfig, QdrantVectorStore};
