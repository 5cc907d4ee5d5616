//! Per-platform selector configuration and the platform registry.
//!
//! Platform customization is a data record ([`SelectorConfig`]) plus an
//! optional author-detection hook, looked up through an explicit
//! [`PlatformRegistry`] built at startup. There is no ambient global state.

pub mod config;
pub mod registry;

pub use config::{AuthorHint, SelectorConfig, chatgpt, claude, gemini, generic, perplexity};
pub use registry::PlatformRegistry;
