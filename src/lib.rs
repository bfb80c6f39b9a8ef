// Public modules
pub mod analytics;
pub mod chat;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod identity;
pub mod layout;
pub mod types;
pub mod typing;

mod observability;

// Re-exports
pub use analytics::{
    AnalyticsEmitter, AnalyticsEvent, EventKind, NoopAnalytics, PostHogAnalytics, analytics_for,
};
pub use client::{AgentClient, ChatTransport, build_headers};
pub use config::{DeploymentConfig, DeploymentMode};
pub use controller::{AgentReply, DispatchOutcome, SessionController, SessionSnapshot};
pub use error::{Error, Result};
pub use history::{ConversationLog, TraceLog};
pub use identity::SessionId;
pub use layout::{RESERVED_MARGIN, ViewportHeight, available_height};
pub use observability::register_biometrics;
pub use types::*;
pub use typing::{TypingGuard, TypingIndicator};
