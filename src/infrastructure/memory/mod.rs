//! Memory Layer - In-Memory Storage
//!
//! 内存文档存储，`database.backend = "memory"` 时使用，也供测试使用

mod document_store;

pub use document_store::InMemoryDocumentStore;
