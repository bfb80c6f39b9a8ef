//! Terminal chat client for the agent service.
//!
//! This module provides the pieces the `salesgpt-chat` binary is assembled
//! from:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing and handling
//! - [`render`]: Printing replies, history, and the thinking process
//!
//! The conversation itself is driven by
//! [`SessionController`](crate::SessionController).

mod commands;
mod config;
mod render;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer, format_trace_entry};
