//! Session state and orchestration command handlers for Promoreel
//!
//! This crate sequences user intents (create, upload, configure, generate)
//! against the project service and keeps the local session consistent with the
//! service's authoritative state. It is deliberately decoupled from any
//! rendering framework: every handler is a plain async method returning a
//! `Result`, directly unit-testable without a UI harness.

pub mod orchestrator;
pub mod session;

pub use orchestrator::Orchestrator;
pub use session::Session;
