//! Core decision logic for the kopi assistant.
//!
//! Everything in this crate is pure and synchronous: intent routing,
//! arithmetic evaluation, and the outlet query compiler take text in and
//! produce values out, with no I/O. The collaborator clients that do talk to
//! the network or the database live in `kopi-agent` and `kopi-db` and consume
//! the vocabulary defined here.
//!
//! # Key Types
//!
//! - `Intent` - the routing decision for a single utterance (see `intent`)
//! - `calculator::process` - two-operand arithmetic with explicit failures
//! - `text2sql::QueryCompiler` - allow-listed NL -> SQL compilation
//! - `SessionContext` - per-session, append-only conversation history
//!
//! # Safety Principle
//!
//! The query compiler never splices user text into SQL. Every fragment of a
//! compiled query comes from a fixed template or the fixed predicate table,
//! which makes the output injection-immune by construction.

pub mod calculator;
pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod text2sql;

pub use domain::conversation::{ConversationTurn, Role, SessionContext};
pub use domain::outlet::{OutletRecord, OutletSummary};
pub use errors::{ApplicationError, InterfaceError};
pub use intent::Intent;
pub use text2sql::QueryCompiler;
