pub mod alexa;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod speech;
pub mod stats;

use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::{Dispatcher, IntentRequest};
use crate::error::Result;
use crate::models::SpokenResponse;
use crate::stats::{HttpStatsClient, StatsClient};

/// Wires the HTTP stats client into the dispatcher.
pub struct SkillService {
    dispatcher: Dispatcher,
}

impl SkillService {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let stats = Arc::new(HttpStatsClient::new(&config)?);
        let dispatcher = Dispatcher::new(stats as Arc<dyn StatsClient>, config);

        Ok(Self { dispatcher })
    }

    pub async fn dispatch(&self, request: &IntentRequest) -> Result<SpokenResponse> {
        self.dispatcher.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_wires_up_from_default_config() {
        assert!(SkillService::new(Arc::new(Config::default())).is_ok());
    }
}
