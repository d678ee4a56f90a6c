//! Configuration loading from environment.

use std::env;

use ledger_client::{DEFAULT_RATES_URL, DEFAULT_TABLE};
use ledger_types::OwnerId;

/// Where the ledger rows live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// `memory://` or a `sqlite:` URL
    Database { url: String },
    /// Hosted PostgREST endpoint
    Postgrest {
        url: String,
        anon_key: String,
        access_token: Option<String>,
        table: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub owner_id: Option<OwnerId>,
    pub backend: Option<BackendConfig>,
    pub rates_url: String,
}

impl Config {
    /// Loads configuration from environment variables. `owner` and
    /// `database_url` come from flags (which fall back to the environment).
    pub fn from_env(owner: Option<String>, database_url: Option<String>) -> anyhow::Result<Self> {
        Self::from_lookup(owner, database_url, |key| env::var(key).ok())
    }

    pub fn from_lookup(
        owner: Option<String>,
        database_url: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let owner_id = owner
            .filter(|value| !value.trim().is_empty())
            .map(|value| OwnerId::new(value.trim()));

        let backend = match database_url.filter(|value| !value.trim().is_empty()) {
            Some(url) => Some(BackendConfig::Database { url }),
            None => match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY")) {
                (Some(url), Some(anon_key)) => Some(BackendConfig::Postgrest {
                    url,
                    anon_key,
                    access_token: var("SUPABASE_ACCESS_TOKEN"),
                    table: var("LEDGER_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                }),
                (Some(_), None) => {
                    anyhow::bail!("SUPABASE_ANON_KEY is required when SUPABASE_URL is set")
                }
                _ => None,
            },
        };

        let rates_url = var("RATES_URL").unwrap_or_else(|| DEFAULT_RATES_URL.to_string());

        Ok(Self {
            owner_id,
            backend,
            rates_url,
        })
    }

    pub fn require_owner(&self) -> anyhow::Result<&OwnerId> {
        self.owner_id
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("LEDGER_OWNER_ID (or --owner) is required"))
    }

    pub fn require_backend(&self) -> anyhow::Result<&BackendConfig> {
        self.backend.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "No ledger backend configured: set LEDGER_DATABASE_URL, or SUPABASE_URL and SUPABASE_ANON_KEY"
            )
        })
    }
}
