//! Configuration types for the terminal chat client.
//!
//! This module provides CLI argument parsing via `arrrg` and layers the
//! resulting overrides on top of the deployment configuration read from the
//! environment.

use arrrg_derive::CommandLine;
use url::Url;

use crate::config::{API_URL_VAR, DeploymentConfig, DeploymentMode};
use crate::error::{Error, Result};

/// Command-line arguments for the salesgpt-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the agent service.
    #[arrrg(optional, "Agent service URL (default: $SALESGPT_API_URL or http://localhost:8000)", "URL")]
    pub api_url: Option<String>,

    /// Request incremental replies.
    #[arrrg(flag, "Request streamed replies (not yet supported by the client)")]
    pub stream: bool,

    /// Force production mode.
    #[arrrg(flag, "Use the production profile (requires $SALESGPT_AUTH_KEY)")]
    pub production: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved configuration for a chat client run.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The deployment to talk to.
    pub deployment: DeploymentConfig,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether dispatches ask for incremental replies.
    pub stream: bool,
}

impl ChatConfig {
    /// Creates a config for the given deployment with default display options.
    ///
    /// Defaults:
    /// - Color: enabled
    /// - Streaming: disabled
    pub fn new(deployment: DeploymentConfig) -> Self {
        Self {
            deployment,
            use_color: true,
            stream: false,
        }
    }

    /// Applies command-line overrides to a deployment read from the environment.
    pub fn resolve(args: ChatArgs, deployment: DeploymentConfig) -> Result<Self> {
        let mut deployment = deployment;
        if let Some(api_url) = args.api_url {
            let url = Url::parse(api_url.trim()).map_err(|err| {
                Error::configuration(
                    format!("invalid --api-url {api_url:?}: {err}"),
                    Some(API_URL_VAR.to_string()),
                )
            })?;
            deployment = deployment.with_api_url(url);
        }
        if args.production {
            deployment = deployment.with_mode(DeploymentMode::Production);
        }
        deployment.validate()?;

        Ok(Self {
            deployment,
            use_color: !args.no_color,
            stream: args.stream,
        })
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the streaming capability flag.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}
