//! Lingo - client for a bidirectional German/English translation service
//!
//! Wraps the service's HTTP API in a single-flight translation session,
//! keeps a bounded translation history on disk and tracks which backend
//! model is active.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod history;
pub mod language;
pub mod latch;
pub mod model;
pub mod session;
