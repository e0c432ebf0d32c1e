//! Runtime configuration.
//!
//! Built once at startup and handed to the components that need it. Nothing
//! reads the process environment after [`Config::from_env`] returns.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::consts::{DEFAULT_API_BASE, DEFAULT_PORT, DEFAULT_PUBLIC_DIR};

pub const TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";
pub const PORT_VAR: &str = "PORT";
pub const API_BASE_VAR: &str = "TWITTER_API_BASE";
pub const PUBLIC_DIR_VAR: &str = "CLOUT_PUBLIC_DIR";

#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credential. `None` keeps the server up in demo-only mode.
    pub bearer_token: Option<String>,
    pub port: u16,
    pub api_base: String,
    pub public_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bearer_token: None,
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_port(None)
    }

    /// Like [`Config::from_env`], but an explicit port replaces `PORT`
    /// without it being parsed at all.
    pub fn from_env_with_port(port: Option<u16>) -> Result<Self> {
        Self::from_lookup_with_port(|key| std::env::var(key).ok(), port)
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_port(lookup, None)
    }

    pub fn from_lookup_with_port<F>(lookup: F, port: Option<u16>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match (port, get(PORT_VAR)) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {PORT_VAR}: {raw:?}"))?,
            (None, None) => defaults.port,
        };

        Ok(Self {
            bearer_token: get(TOKEN_VAR),
            port,
            api_base: get(API_BASE_VAR)
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            public_dir: get(PUBLIC_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
        })
    }

    /// Same configuration with the given credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn has_credential(&self) -> bool {
        self.bearer_token.is_some()
    }
}
