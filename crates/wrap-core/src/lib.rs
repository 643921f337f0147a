//! # wrap-core
//!
//! A Unicode-aware paragraph-fill engine (the `wrap` core), a Markdown-
//! aware wrap mode, and the `wrapc` comment-reflowing pipeline built on
//! top of it.

pub mod config;
pub mod engine;
pub mod error;
pub mod markdown;
pub mod options;
pub mod regexes;
pub mod unicode;
pub mod wrapc;

pub use engine::{wrap, wrap_str, Engine};
pub use error::{Error, ExitCode, Result};
pub use options::Options;
