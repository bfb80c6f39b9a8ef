//! Deployment configuration.
//!
//! The deployment environment decides whether requests carry credentials and
//! whether analytics are emitted.  It is read once at startup and never
//! changes afterwards.

use std::env;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

/// Environment variable selecting the deployment mode.
pub const ENVIRONMENT_VAR: &str = "SALESGPT_ENVIRONMENT";
/// Environment variable holding the agent service base URL.
pub const API_URL_VAR: &str = "SALESGPT_API_URL";
/// Environment variable holding the bearer token used in production.
pub const AUTH_KEY_VAR: &str = "SALESGPT_AUTH_KEY";
/// Environment variable holding the analytics project key.
pub const ANALYTICS_KEY_VAR: &str = "SALESGPT_POSTHOG_KEY";
/// Environment variable holding the analytics ingestion host.
pub const ANALYTICS_HOST_VAR: &str = "SALESGPT_POSTHOG_HOST";
/// Environment variable holding the page location reported with analytics events.
pub const PAGE_URL_VAR: &str = "SALESGPT_PAGE_URL";

/// Default agent service base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default analytics ingestion host.
pub const DEFAULT_ANALYTICS_HOST: &str = "https://app.posthog.com";

/// The deployment profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    /// Local development: no credentials, no analytics.
    #[default]
    Development,

    /// Production: bearer credentials on every request, analytics enabled.
    Production,
}

impl DeploymentMode {
    /// Returns true in production.
    pub fn is_production(&self) -> bool {
        matches!(self, DeploymentMode::Production)
    }
}

impl FromStr for DeploymentMode {
    type Err = std::convert::Infallible;

    /// Only `production` (any case) selects production.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("production") {
            Ok(DeploymentMode::Production)
        } else {
            Ok(DeploymentMode::Development)
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Development => write!(f, "development"),
            DeploymentMode::Production => write!(f, "production"),
        }
    }
}

/// Everything the controller needs to know about its deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// The deployment profile.
    pub mode: DeploymentMode,

    /// Base URL of the agent service.
    pub api_url: Url,

    /// Bearer token attached in production.
    pub auth_token: Option<String>,

    /// Analytics project key; analytics stay off without one.
    pub analytics_key: Option<String>,

    /// Analytics ingestion host.
    pub analytics_host: Url,

    /// The location reported with analytics events.
    pub page_url: Url,
}

impl DeploymentConfig {
    /// Creates a development configuration pointing at `api_url`.
    pub fn development(api_url: &str) -> Result<Self> {
        let api_url = parse_url(api_url, API_URL_VAR)?;
        Ok(Self {
            mode: DeploymentMode::Development,
            page_url: default_page_url(&api_url)?,
            api_url,
            auth_token: None,
            analytics_key: None,
            analytics_host: parse_url(DEFAULT_ANALYTICS_HOST, ANALYTICS_HOST_VAR)?,
        })
    }

    /// Creates a production configuration pointing at `api_url`.
    pub fn production(api_url: &str, auth_token: impl Into<String>) -> Result<Self> {
        let config = Self::development(api_url)?;
        Ok(Self {
            mode: DeploymentMode::Production,
            auth_token: Some(auth_token.into()),
            ..config
        })
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mode = get(ENVIRONMENT_VAR)
            .map(|v| v.parse::<DeploymentMode>().unwrap_or_default())
            .unwrap_or_default();
        let api_url = parse_url(
            &get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            API_URL_VAR,
        )?;
        let analytics_host = parse_url(
            &get(ANALYTICS_HOST_VAR).unwrap_or_else(|| DEFAULT_ANALYTICS_HOST.to_string()),
            ANALYTICS_HOST_VAR,
        )?;
        let page_url = match get(PAGE_URL_VAR) {
            Some(page_url) => parse_url(&page_url, PAGE_URL_VAR)?,
            None => default_page_url(&api_url)?,
        };

        let config = Self {
            mode,
            api_url,
            auth_token: get(AUTH_KEY_VAR),
            analytics_key: get(ANALYTICS_KEY_VAR),
            analytics_host,
            page_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that production has the credentials it needs.
    pub fn validate(&self) -> Result<()> {
        if self.mode.is_production() && self.auth_token.is_none() {
            return Err(Error::configuration(
                "an auth token is required in production",
                Some(AUTH_KEY_VAR.to_string()),
            ));
        }
        Ok(())
    }

    /// Sets the deployment mode.
    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Points the configuration at a different agent service.
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    /// Sets the bearer token.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Sets the analytics project key.
    pub fn with_analytics_key(mut self, key: Option<String>) -> Self {
        self.analytics_key = key;
        self
    }

    /// Sets the analytics ingestion host.
    pub fn with_analytics_host(mut self, host: Url) -> Self {
        self.analytics_host = host;
        self
    }

    /// Sets the page location reported with analytics events.
    pub fn with_page_url(mut self, page_url: Url) -> Self {
        self.page_url = page_url;
        self
    }

    /// Resolves an endpoint path against the agent service base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(base_for_join(&self.api_url).join(path)?)
    }
}

impl fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("mode", &self.mode)
            .field("api_url", &self.api_url.as_str())
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("analytics_key", &self.analytics_key.as_ref().map(|_| "<redacted>"))
            .field("analytics_host", &self.analytics_host.as_str())
            .field("page_url", &self.page_url.as_str())
            .finish()
    }
}

fn parse_url(value: &str, variable: &str) -> Result<Url> {
    Url::parse(value.trim()).map_err(|err| {
        Error::configuration(
            format!("invalid URL {value:?}: {err}"),
            Some(variable.to_string()),
        )
    })
}

fn default_page_url(api_url: &Url) -> Result<Url> {
    Ok(base_for_join(api_url).join("chat")?)
}

// Url::join drops the last path segment unless the base ends in '/'.
pub(crate) fn base_for_join(url: &Url) -> Url {
    let mut base = url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_development() {
        let config = DeploymentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.mode, DeploymentMode::Development);
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.page_url.as_str(), "http://localhost:8000/chat");
        assert!(config.auth_token.is_none());
        assert!(config.analytics_key.is_none());
    }

    #[test]
    fn production_reads_credentials() {
        let config = DeploymentConfig::from_lookup(lookup(&[
            (ENVIRONMENT_VAR, "production"),
            (API_URL_VAR, "https://agent.example.com/api"),
            (AUTH_KEY_VAR, "secret"),
            (ANALYTICS_KEY_VAR, "phc_123"),
            (PAGE_URL_VAR, "https://chat.example.com/chat"),
        ]))
        .unwrap();
        assert!(config.mode.is_production());
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.analytics_key.as_deref(), Some("phc_123"));
        assert_eq!(config.page_url.as_str(), "https://chat.example.com/chat");
    }

    #[test]
    fn production_without_token_is_rejected() {
        let err = DeploymentConfig::from_lookup(lookup(&[
            (ENVIRONMENT_VAR, "Production"),
            (AUTH_KEY_VAR, "  "),
        ]))
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn unknown_mode_is_development() {
        assert_eq!(
            "staging".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Development
        );
        assert_eq!(
            " PRODUCTION ".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Production
        );
    }

    #[test]
    fn invalid_url_names_variable() {
        let err =
            DeploymentConfig::from_lookup(lookup(&[(API_URL_VAR, "not a url")])).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration { variable: Some(ref v), .. } if v == API_URL_VAR
        ));
    }

    #[test]
    fn endpoints_keep_base_path() {
        let config = DeploymentConfig::development("https://agent.example.com/api").unwrap();
        assert_eq!(
            config.endpoint("chat").unwrap().as_str(),
            "https://agent.example.com/api/chat"
        );
        let config = DeploymentConfig::development("http://localhost:8000").unwrap();
        assert_eq!(
            config.endpoint("botname").unwrap().as_str(),
            "http://localhost:8000/botname"
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = DeploymentConfig::production("http://localhost:8000", "secret")
            .unwrap()
            .with_analytics_key(Some("phc_123".to_string()));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("phc_123"));
    }
}
