use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_SKILL_PATH: &str = "/skill";

/// Main configuration structure for the Cigars skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub skill: SkillConfig,
    pub stats: StatsConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Application id the platform sends with each request.
    pub application_id: String,
    /// Season opener, written like "March 26, 2017".
    pub opening_day: String,
    /// Speak a fixed service-unavailable line on fetch failures instead
    /// of answering the turn with a bare HTTP error.
    pub speak_errors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Selects between `base_url` and `dev_base_url`.
    pub production: bool,
    pub base_url: String,
    pub dev_base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind_address: String,
    /// Route the platform posts request envelopes to.
    pub path: String,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        // Load environment variables from .env files
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with process env only");
        }

        // Default config path
        let config_path =
            env::var("CIGARS_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        // Load config from file if it exists
        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::info!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Skill overrides
        if let Ok(app_id) = env::var("CIGARS_APPLICATION_ID") {
            self.skill.application_id = app_id;
        }
        if let Ok(opening_day) = env::var("CIGARS_OPENING_DAY") {
            self.skill.opening_day = opening_day;
        }
        if let Ok(speak) = env::var("CIGARS_SPEAK_ERRORS") {
            if let Ok(flag) = speak.parse() {
                self.skill.speak_errors = flag;
            }
        }

        // Stats server overrides
        if let Ok(production) = env::var("CIGARS_PRODUCTION") {
            if let Ok(flag) = production.parse() {
                self.stats.production = flag;
            }
        }
        if let Ok(base_url) = env::var("CIGARS_BASE_URL") {
            self.stats.base_url = base_url;
        }
        if let Ok(dev_base_url) = env::var("CIGARS_DEV_BASE_URL") {
            self.stats.dev_base_url = dev_base_url;
        }
        if let Ok(timeout) = env::var("CIGARS_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse() {
                self.stats.timeout_seconds = seconds;
            }
        }
        if let Ok(user_agent) = env::var("CIGARS_USER_AGENT") {
            self.stats.user_agent = user_agent;
        }

        // HTTP overrides
        if let Ok(bind_address) = env::var("CIGARS_BIND_ADDRESS") {
            self.http.bind_address = bind_address;
        }
        if let Ok(path) = env::var("CIGARS_SKILL_PATH") {
            self.http.path = path;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.skill.application_id.is_empty() {
            return Err("Application id cannot be empty".into());
        }

        if let Err(e) = crate::speech::parse_opening_day(&self.skill.opening_day) {
            return Err(format!(
                "Opening day '{}' must look like 'March 26, 2017': {e}",
                self.skill.opening_day
            )
            .into());
        }

        if self.stats.base_url.is_empty() || self.stats.dev_base_url.is_empty() {
            return Err("Stats server base URLs cannot be empty".into());
        }
        if self.stats.timeout_seconds == 0 {
            return Err("Stats request timeout cannot be 0".into());
        }

        if !self.http.path.starts_with('/') {
            return Err("Skill route path must start with '/'".into());
        }
        if self.http.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", self.http.bind_address).into());
        }

        Ok(())
    }

    /// Get the stats request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.stats.timeout_seconds)
    }
}

impl StatsConfig {
    pub fn active_base_url(&self) -> &str {
        if self.production {
            &self.base_url
        } else {
            &self.dev_base_url
        }
    }
}

impl HttpConfig {
    /// Route path safe to hand to the router. A configured path without
    /// its leading '/' would abort startup, so it falls back to the
    /// default (validation already warned about it).
    pub fn route_path(&self) -> &str {
        if self.path.starts_with('/') {
            &self.path
        } else {
            DEFAULT_SKILL_PATH
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skill: SkillConfig {
                application_id: "amzn1.ask.skill.92ca1fbc-56d2-4a73-bcf8-805fc43e7147"
                    .to_string(),
                opening_day: "March 26, 2017".to_string(),
                speak_errors: false,
            },
            stats: StatsConfig {
                production: true,
                base_url: "https://cigarsbaseballserver.herokuapp.com/cigarsbaseball"
                    .to_string(),
                dev_base_url: "http://localhost:3000/cigarsbaseball".to_string(),
                timeout_seconds: 5,
                user_agent: "cigars-skill".to_string(),
            },
            http: HttpConfig {
                bind_address: "127.0.0.1:8686".to_string(),
                path: DEFAULT_SKILL_PATH.to_string(),
            },
        }
    }
}
