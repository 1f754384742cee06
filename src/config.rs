use crate::portal::csrf::CsrfToken;
use anyhow::{Result, bail};
use serde::Deserialize;
use std::{path::Path, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub portal: Portal,
}

#[derive(Debug, Clone)]
pub struct Portal {
    pub url: String,
    pub csrf_token: CsrfToken,
    pub insecure: bool,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from {}", path.display());

        let config = std::fs::read_to_string(path)?;
        Self::parse(&config)
    }

    /// Parse configuration from YAML
    pub fn parse(config: &str) -> Result<Self> {
        Ok(serde_norway::from_str(config)?)
    }
}

impl Portal {
    /// Create a new Portal instance, resolving the CSRF token from the environment if needed
    pub fn new(
        url: String,
        csrf_token: Option<String>,
        csrf_token_from: Option<String>,
        insecure: bool,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let token = match (csrf_token, csrf_token_from) {
            (Some(token), _) => token,
            (None, Some(var)) => std::env::var(&var)
                .map_err(|e| anyhow::anyhow!("Failed to read CSRF token from {}: {}", var, e))?,
            (None, None) => bail!("Either csrfToken or csrfTokenFrom must be set"),
        };

        if token.trim().is_empty() {
            bail!("CSRF token is empty");
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            csrf_token: CsrfToken::new(token),
            insecure,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

impl<'de> Deserialize<'de> for Portal {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct PortalRaw {
            url: String,
            #[serde(rename = "csrfToken")]
            csrf_token: Option<String>,
            #[serde(rename = "csrfTokenFrom")]
            csrf_token_from: Option<String>,
            #[serde(default)]
            insecure: Option<bool>,
            #[serde(rename = "timeoutSecs")]
            timeout_secs: Option<u64>,
        }

        let raw = PortalRaw::deserialize(deserializer)?;
        Portal::new(
            raw.url,
            raw.csrf_token,
            raw.csrf_token_from,
            raw.insecure.unwrap_or(false),
            raw.timeout_secs,
        )
        .map_err(serde::de::Error::custom)
    }
}
