//! Session-manager logic and port traits for Confab.
//!
//! This crate defines the conversation session state machine plus the
//! "ports" (repository and completion-client traits) that the
//! infrastructure layer implements. It depends only on `confab-types` --
//! never on `confab-infra` or any database/IO crate.

pub mod completion;
pub mod conversation;
pub mod library;
pub mod session;
