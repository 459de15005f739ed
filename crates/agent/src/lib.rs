//! Collaborator clients and dispatch orchestration for the kopi assistant.
//!
//! This crate owns everything that talks to the outside world on behalf of
//! the chat loop:
//! - `llm` - the pluggable completion client with timeout + bounded retry
//! - `catalog` - product-name fetching from the shop page
//! - `index` - top-k product snippet retrieval
//! - `tools` - the product and outlet tools built on those clients
//! - `router` - intent dispatch, plan/act fallback, per-session history
//!
//! # Safety Principle
//!
//! The LLM is strictly a text generator. Routing decisions, arithmetic, and
//! SQL compilation are deterministic `kopi-core` code; collaborator failures
//! stop at the dispatch boundary as apologies and never decide anything.

pub mod catalog;
pub mod index;
pub mod llm;
pub mod router;
pub mod tools;

pub use catalog::{HttpProductSource, ProductSource};
pub use index::ProductIndex;
pub use llm::{HttpLlmClient, LlmClient, LlmError};
pub use router::DispatchRouter;
pub use tools::{OutletTool, ProductTool};
