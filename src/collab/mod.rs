//! Collaborator traits: the persistent session store and the LLM client.
//! Both are opaque to the resilience core — it calls them through the
//! degradation coordinator and never reaches into their internals.

pub mod llm;
pub mod store;

pub use llm::{CompressOptions, CompressResult, LlmClient, LlmError, StubLlmClient, TopicResult};
pub use store::{Session, SessionStore, SqliteSessionStore, StoreError};
