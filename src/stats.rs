use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, SkillError};

/// One query against the Cigars stats server. The dispatcher builds a
/// query per intent; the client turns it into a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsQuery {
    NextGame,
    PrevGame,
    TopHitter,
    TopPitcher,
    Record,
    PlayerStats { firstname: String, lastname: String },
}

impl StatsQuery {
    pub fn path(&self) -> &'static str {
        match self {
            Self::NextGame => "/nextgame",
            Self::PrevGame => "/prevgame",
            Self::TopHitter => "/tophitter",
            Self::TopPitcher => "/toppitcher",
            Self::Record => "/record",
            Self::PlayerStats { .. } => "/playerstats",
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::PlayerStats {
                firstname,
                lastname,
            } => vec![
                ("firstname", firstname.clone()),
                ("lastname", lastname.clone()),
            ],
            _ => Vec::new(),
        }
    }
}

/// Client seam for the stats server so the dispatcher can be tested
/// against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsClient: Send + Sync {
    async fn fetch(&self, query: StatsQuery) -> Result<Value>;
}

pub struct HttpStatsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.stats.user_agent.clone())
            .build()
            .map_err(|e| SkillError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.stats.active_base_url().to_string(),
        })
    }
}

#[async_trait]
impl StatsClient for HttpStatsClient {
    async fn fetch(&self, query: StatsQuery) -> Result<Value> {
        let url = format!("{}{}", self.base_url, query.path());
        tracing::info!("Fetching stats from {}", url);

        let mut request = self.client.get(&url);
        let params = query.params();
        if !params.is_empty() {
            request = request.query(&params);
        }

        let response = request.send().await.map_err(|source| {
            tracing::error!("Request to {} failed: {}", url, source);
            SkillError::Transport {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Stats server returned {} for {}", status, url);
            return Err(SkillError::Status { status, url });
        }

        let body = response.text().await.map_err(|source| {
            tracing::error!("Failed reading body from {}: {}", url, source);
            SkillError::Transport {
                url: url.clone(),
                source,
            }
        })?;
        tracing::debug!("Stats server response from {}: {}", query.path(), body);

        serde_json::from_str(&body).map_err(|source| {
            tracing::error!("Invalid JSON from {}: {}", url, source);
            SkillError::Json { url, source }
        })
    }
}
