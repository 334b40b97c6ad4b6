//! Shared domain types for Confab.
//!
//! This crate contains the core domain types used across the Confab
//! backend: messages, conversations, personalities, identity sessions,
//! keyword-library entries, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod conversation;
pub mod error;
pub mod identity;
pub mod library;
pub mod message;
pub mod personality;
