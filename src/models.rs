use serde::{Deserialize, Deserializer};

/// Flexible deserializer for stat fields the server renders as either
/// strings or bare numbers (".900" vs 0.9) depending on the season export.
fn deserialize_stat_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleStat {
        Str(String),
        Num(serde_json::Number),
    }

    let value = Option::<FlexibleStat>::deserialize(deserializer)?;
    Ok(match value {
        Some(FlexibleStat::Str(s)) => s,
        Some(FlexibleStat::Num(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Flexible deserializer for counting stats (at bats, hits, strikeouts)
fn deserialize_stat_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleCount {
        Int(i64),
        Float(f64),
        Str(String),
    }

    let value = Option::<FlexibleCount>::deserialize(deserializer)?;
    match value {
        Some(FlexibleCount::Int(i)) => Ok(i),
        Some(FlexibleCount::Float(f)) => Ok(f as i64),
        Some(FlexibleCount::Str(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        None => Ok(0),
    }
}

/// Innings pitched can arrive as a number or a string; a player who has
/// never pitched has `ip = 0`.
fn deserialize_innings<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInnings {
        Num(f64),
        Str(String),
    }

    let value = Option::<FlexibleInnings>::deserialize(deserializer)?;
    match value {
        Some(FlexibleInnings::Num(n)) => Ok(n),
        Some(FlexibleInnings::Str(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        None => Ok(0.0),
    }
}

/// Payload from `/nextgame`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NextGame {
    pub date: String,
    pub opponent: String,
    pub field: String,
    pub time: String,
}

/// Payload from `/prevgame`. `result` is the raw "W##-##"/"L##-##" string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrevGame {
    pub date: String,
    pub opponent: String,
    pub result: String,
}

/// Payload from `/record`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamRecord {
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub year: String,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub wins: i64,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub losses: i64,
}

/// Payload from `/tophitter`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopHitter {
    pub player: String,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub ops: String,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub avg: String,
}

/// Payload from `/toppitcher`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopPitcher {
    pub player: String,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub whip: String,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub era: String,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub pitching_ks: i64,
}

/// Payload from `/playerstats`. Any subset of the batting and pitching
/// fields may be present; absent stats read as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStats {
    pub player: String,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub at_bats: i64,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub hits: i64,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub ops: String,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub avg: String,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub hrs: i64,
    #[serde(deserialize_with = "deserialize_innings")]
    pub ip: f64,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub whip: String,
    #[serde(deserialize_with = "deserialize_stat_string")]
    pub era: String,
    #[serde(deserialize_with = "deserialize_stat_count")]
    pub pitching_ks: i64,
}

/// Win/loss marker and score parsed out of the server's result strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub won: bool,
    pub score: String,
}

impl GameResult {
    /// The server encodes results as a leading W/L marker followed by the
    /// score ("W10-05", "L04-07"). Anything containing an 'L' counts as a
    /// loss, and the score is everything after the first two characters.
    /// That rule is the wire contract, quirks included: strings shorter
    /// than two characters yield an empty score.
    pub fn parse(result: &str) -> Self {
        Self {
            won: !result.contains('L'),
            score: result.chars().skip(2).collect(),
        }
    }
}

/// Spoken output for one turn. A "tell" ends the session; an "ask" keeps
/// it open and re-prompts the user if they stay quiet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenResponse {
    text: String,
    reprompt: Option<String>,
    end_session: bool,
}

impl SpokenResponse {
    pub fn tell(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reprompt: None,
            end_session: true,
        }
    }

    pub fn ask(text: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reprompt: Some(reprompt.into()),
            end_session: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reprompt(&self) -> Option<&str> {
        self.reprompt.as_deref()
    }

    pub fn ends_session(&self) -> bool {
        self.end_session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn game_result_parses_wins_and_losses() {
        let win = GameResult::parse("W10-05");
        assert!(win.won);
        assert_eq!(win.score, "0-05");

        let loss = GameResult::parse("L04-07");
        assert!(!loss.won);
        assert_eq!(loss.score, "4-07");
    }

    #[test]
    fn game_result_tolerates_short_strings() {
        let empty = GameResult::parse("");
        assert!(empty.won);
        assert_eq!(empty.score, "");

        let marker_only = GameResult::parse("L");
        assert!(!marker_only.won);
        assert_eq!(marker_only.score, "");
    }

    #[test]
    fn next_game_defaults_missing_fields() {
        let game: NextGame = serde_json::from_value(json!({ "date": "June 3" })).unwrap();
        assert_eq!(game.date, "June 3");
        assert_eq!(game.opponent, "");
        assert_eq!(game.field, "");
        assert_eq!(game.time, "");
    }

    #[test]
    fn player_stats_reads_camel_case_and_flexible_numbers() {
        let stats: PlayerStats = serde_json::from_value(json!({
            "player": "Joe Smith",
            "atBats": "50",
            "hits": 20,
            "ops": 0.9,
            "avg": ".300",
            "hrs": 3,
            "ip": "58.1",
            "whip": 1.08,
            "era": "2.95",
            "pitchingKs": 61.0
        }))
        .unwrap();

        assert_eq!(stats.at_bats, 50);
        assert_eq!(stats.hits, 20);
        assert_eq!(stats.ops, "0.9");
        assert_eq!(stats.avg, ".300");
        assert_eq!(stats.ip, 58.1);
        assert_eq!(stats.whip, "1.08");
        assert_eq!(stats.pitching_ks, 61);
    }

    #[test]
    fn player_stats_tolerates_absent_and_null_stats() {
        let stats: PlayerStats =
            serde_json::from_value(json!({ "player": "Joe Smith", "ip": null })).unwrap();
        assert_eq!(stats.player, "Joe Smith");
        assert_eq!(stats.at_bats, 0);
        assert_eq!(stats.ip, 0.0);
        assert_eq!(stats.ops, "");
    }

    #[test]
    fn record_accepts_numeric_or_string_year() {
        let numeric: TeamRecord =
            serde_json::from_value(json!({ "year": 2024, "wins": 30, "losses": 10 })).unwrap();
        assert_eq!(numeric.year, "2024");

        let stringy: TeamRecord =
            serde_json::from_value(json!({ "year": "2024", "wins": "30", "losses": "10" }))
                .unwrap();
        assert_eq!(stringy.year, "2024");
        assert_eq!(stringy.wins, 30);
        assert_eq!(stringy.losses, 10);
    }

    #[test]
    fn spoken_response_flags_session_state() {
        let tell = SpokenResponse::tell("done");
        assert!(tell.ends_session());
        assert!(tell.reprompt().is_none());

        let ask = SpokenResponse::ask("question", "again?");
        assert!(!ask.ends_session());
        assert_eq!(ask.reprompt(), Some("again?"));
    }
}
