use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Result, SkillError};
use crate::models::{NextGame, PlayerStats, PrevGame, SpokenResponse, TeamRecord, TopHitter, TopPitcher};
use crate::speech;
use crate::stats::{StatsClient, StatsQuery};

/// Slot that carries the spoken player name on PlayerStatsIntent.
pub const PLAYER_NAME_SLOT: &str = "PlayerName";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Launch,
    Cancel,
    Help,
    NextGame,
    PrevGame,
    LeadingHitter,
    LeadingPitcher,
    Record,
    OpeningDay,
    PlayerStats,
}

impl Intent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LaunchRequest" => Some(Self::Launch),
            "AMAZON.CancelIntent" => Some(Self::Cancel),
            "AMAZON.HelpIntent" => Some(Self::Help),
            "NextGameIntent" => Some(Self::NextGame),
            "PrevGameIntent" => Some(Self::PrevGame),
            "LeadingHitterIntent" => Some(Self::LeadingHitter),
            "LeadingPitcherIntent" => Some(Self::LeadingPitcher),
            "RecordIntent" => Some(Self::Record),
            "OpeningDayIntent" => Some(Self::OpeningDay),
            "PlayerStatsIntent" => Some(Self::PlayerStats),
            _ => None,
        }
    }
}

/// A decoded skill turn: which intent fired and, for player lookups,
/// the raw slot value as spoken.
#[derive(Debug, Clone)]
pub struct IntentRequest {
    pub intent: Intent,
    pub player_name: Option<String>,
}

impl IntentRequest {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            player_name: None,
        }
    }
}

/// Routes one intent to its response: static speech, a local
/// computation, or a stats-server fetch followed by a formatter.
pub struct Dispatcher {
    stats: Arc<dyn StatsClient>,
    config: Arc<Config>,
}

impl Dispatcher {
    pub fn new(stats: Arc<dyn StatsClient>, config: Arc<Config>) -> Self {
        Self { stats, config }
    }

    pub async fn dispatch(&self, request: &IntentRequest) -> Result<SpokenResponse> {
        match request.intent {
            Intent::Launch => Ok(speech::welcome()),
            Intent::Cancel => Ok(speech::goodbye()),
            Intent::Help => Ok(speech::help()),
            Intent::NextGame => {
                let game: NextGame = self.fetch(StatsQuery::NextGame).await?;
                Ok(SpokenResponse::tell(speech::next_game(&game)))
            }
            Intent::PrevGame => {
                let game: PrevGame = self.fetch(StatsQuery::PrevGame).await?;
                Ok(SpokenResponse::tell(speech::prev_game(&game)))
            }
            Intent::LeadingHitter => {
                let hitter: TopHitter = self.fetch(StatsQuery::TopHitter).await?;
                Ok(SpokenResponse::tell(speech::top_hitter(&hitter)))
            }
            Intent::LeadingPitcher => {
                let pitcher: TopPitcher = self.fetch(StatsQuery::TopPitcher).await?;
                Ok(SpokenResponse::tell(speech::top_pitcher(&pitcher)))
            }
            Intent::Record => {
                let record: TeamRecord = self.fetch(StatsQuery::Record).await?;
                Ok(SpokenResponse::tell(speech::record(&record)))
            }
            Intent::OpeningDay => {
                let now = chrono::Local::now().naive_local();
                Ok(SpokenResponse::tell(speech::opening_day(
                    &self.config.skill.opening_day,
                    now,
                )))
            }
            Intent::PlayerStats => match split_player_name(request.player_name.as_deref()) {
                Some((firstname, lastname)) => {
                    let stats: PlayerStats = self
                        .fetch(StatsQuery::PlayerStats {
                            firstname,
                            lastname,
                        })
                        .await?;
                    Ok(SpokenResponse::tell(speech::player_stats(&stats)))
                }
                None => {
                    tracing::warn!(
                        "Player name slot unusable: {:?}",
                        request.player_name
                    );
                    Ok(speech::player_name_reprompt())
                }
            },
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, query: StatsQuery) -> Result<T> {
        let path = query.path();
        let value = self.stats.fetch(query).await?;
        serde_json::from_value(value).map_err(|source| SkillError::Payload { path, source })
    }
}

/// Splits a spoken name into exactly first and last. Anything else
/// (missing slot, one token, three or more) is rejected so the caller
/// can re-prompt.
pub fn split_player_name(value: Option<&str>) -> Option<(String, String)> {
    let mut tokens = value?.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(first), Some(last), None) => Some((first.to_string(), last.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::MockStatsClient;
    use mockall::predicate::eq;
    use serde_json::json;

    fn dispatcher(mock: MockStatsClient) -> Dispatcher {
        Dispatcher::new(Arc::new(mock), Arc::new(Config::default()))
    }

    #[test]
    fn intent_names_map_per_interaction_model() {
        assert_eq!(Intent::from_name("LaunchRequest"), Some(Intent::Launch));
        assert_eq!(Intent::from_name("AMAZON.CancelIntent"), Some(Intent::Cancel));
        assert_eq!(Intent::from_name("AMAZON.HelpIntent"), Some(Intent::Help));
        assert_eq!(Intent::from_name("NextGameIntent"), Some(Intent::NextGame));
        assert_eq!(Intent::from_name("PrevGameIntent"), Some(Intent::PrevGame));
        assert_eq!(
            Intent::from_name("LeadingHitterIntent"),
            Some(Intent::LeadingHitter)
        );
        assert_eq!(
            Intent::from_name("LeadingPitcherIntent"),
            Some(Intent::LeadingPitcher)
        );
        assert_eq!(Intent::from_name("RecordIntent"), Some(Intent::Record));
        assert_eq!(Intent::from_name("OpeningDayIntent"), Some(Intent::OpeningDay));
        assert_eq!(
            Intent::from_name("PlayerStatsIntent"),
            Some(Intent::PlayerStats)
        );
        assert_eq!(Intent::from_name("AMAZON.StopIntent"), None);
        assert_eq!(Intent::from_name(""), None);
    }

    #[test]
    fn player_name_splits_into_exactly_two_tokens() {
        assert_eq!(
            split_player_name(Some("Babe Ruth")),
            Some(("Babe".to_string(), "Ruth".to_string()))
        );
        assert_eq!(
            split_player_name(Some("  Babe   Ruth  ")),
            Some(("Babe".to_string(), "Ruth".to_string()))
        );
        assert_eq!(split_player_name(Some("Ruth")), None);
        assert_eq!(split_player_name(Some("Babe George Ruth")), None);
        assert_eq!(split_player_name(Some("")), None);
        assert_eq!(split_player_name(None), None);
    }

    #[tokio::test]
    async fn static_intents_answer_without_fetching() {
        let mut mock = MockStatsClient::new();
        mock.expect_fetch().times(0);
        let dispatcher = dispatcher(mock);

        let welcome = dispatcher
            .dispatch(&IntentRequest::new(Intent::Launch))
            .await
            .unwrap();
        assert!(!welcome.ends_session());
        assert!(welcome.text().contains("Welcome to the Atlanta Cigars"));

        let help = dispatcher
            .dispatch(&IntentRequest::new(Intent::Help))
            .await
            .unwrap();
        assert!(!help.ends_session());

        let goodbye = dispatcher
            .dispatch(&IntentRequest::new(Intent::Cancel))
            .await
            .unwrap();
        assert!(goodbye.ends_session());
        assert_eq!(goodbye.text(), "Ok, see you at the ballpark");
    }

    #[tokio::test]
    async fn next_game_intent_fetches_and_formats() {
        let mut mock = MockStatsClient::new();
        mock.expect_fetch()
            .with(eq(StatsQuery::NextGame))
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "date": "June 3, 2017",
                    "opponent": "Braves",
                    "field": "Suntrust Park",
                    "time": "7 PM",
                }))
            });

        let response = dispatcher(mock)
            .dispatch(&IntentRequest::new(Intent::NextGame))
            .await
            .unwrap();
        assert_eq!(
            response.text(),
            "The Cigars next game is on June 3, 2017 versus the Braves at Suntrust Park. Game time is 7 PM."
        );
        assert!(response.ends_session());
    }

    #[tokio::test]
    async fn each_fetch_intent_hits_its_endpoint_once() {
        let cases = [
            (Intent::NextGame, StatsQuery::NextGame),
            (Intent::PrevGame, StatsQuery::PrevGame),
            (Intent::LeadingHitter, StatsQuery::TopHitter),
            (Intent::LeadingPitcher, StatsQuery::TopPitcher),
            (Intent::Record, StatsQuery::Record),
        ];
        for (intent, query) in cases {
            let mut mock = MockStatsClient::new();
            mock.expect_fetch()
                .with(eq(query))
                .times(1)
                .returning(|_| Ok(json!({})));

            let response = dispatcher(mock)
                .dispatch(&IntentRequest::new(intent))
                .await
                .unwrap();
            assert!(!response.text().is_empty());
        }
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_error_with_no_speech() {
        let mut mock = MockStatsClient::new();
        mock.expect_fetch().times(1).returning(|_| {
            Err(SkillError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                url: "http://localhost:3000/cigarsbaseball/record".to_string(),
            })
        });

        let result = dispatcher(mock)
            .dispatch(&IntentRequest::new(Intent::Record))
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_fetch());
    }

    #[tokio::test]
    async fn malformed_payload_is_a_fetch_class_error() {
        let mut mock = MockStatsClient::new();
        mock.expect_fetch()
            .times(1)
            .returning(|_| Ok(json!({"wins": "not a number"})));

        let result = dispatcher(mock)
            .dispatch(&IntentRequest::new(Intent::Record))
            .await;
        match result {
            Err(SkillError::Payload { path, .. }) => assert_eq!(path, "/record"),
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn player_stats_sends_name_as_query_params() {
        let mut mock = MockStatsClient::new();
        mock.expect_fetch()
            .with(eq(StatsQuery::PlayerStats {
                firstname: "Babe".to_string(),
                lastname: "Ruth".to_string(),
            }))
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "player": "Babe Ruth",
                    "atBats": 50,
                    "hits": 20,
                    "ops": ".900",
                    "avg": ".300",
                }))
            });

        let request = IntentRequest {
            intent: Intent::PlayerStats,
            player_name: Some("Babe Ruth".to_string()),
        };
        let response = dispatcher(mock).dispatch(&request).await.unwrap();
        assert_eq!(
            response.text(),
            "Babe Ruth has 20 hits with an O P S of .900 and a batting average of .300."
        );
    }

    #[tokio::test]
    async fn unusable_player_name_reprompts_without_fetching() {
        for name in [None, Some("Ruth".to_string()), Some("Babe George Ruth".to_string())] {
            let mut mock = MockStatsClient::new();
            mock.expect_fetch().times(0);

            let request = IntentRequest {
                intent: Intent::PlayerStats,
                player_name: name,
            };
            let response = dispatcher(mock).dispatch(&request).await.unwrap();
            assert!(!response.ends_session());
            assert_eq!(response.text(), speech::player_name_reprompt().text());
        }
    }

    #[tokio::test]
    async fn opening_day_is_computed_locally() {
        let mut mock = MockStatsClient::new();
        mock.expect_fetch().times(0);

        let response = dispatcher(mock)
            .dispatch(&IntentRequest::new(Intent::OpeningDay))
            .await
            .unwrap();
        assert!(response.text().contains("March 26, 2017"));
        assert!(response.ends_session());
    }
}
