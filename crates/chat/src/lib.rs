//! # Scribe Chat
//!
//! HTTP client for hosted chat-completion APIs, exposed to the core as a
//! [`scribe_core::GenerationService`].
//!
//! Uses `scribe-core` only for the generation boundary; prompt assembly and parsing of the reply
//! stay in the core.

#![warn(rust_2018_idioms)]

pub mod client;
pub mod config;

pub use client::ChatCompletionClient;
pub use config::{chat_config_from_env_values, ChatConfig, ChatEnv};
