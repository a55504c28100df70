use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseResult};

use crate::models::{
    GameResult, NextGame, PlayerStats, PrevGame, SpokenResponse, TeamRecord, TopHitter, TopPitcher,
};

const WELCOME: &str = "Welcome to the Atlanta Cigars Baseball app. Go ahead and ask me something about Cigars Baseball.";
const HELP: &str = "Go ahead and ask me something about Cigars Baseball. For example, you can say ask Cigars Baseball when is the next game, or ask Cigars Baseball who is the leading hitter or pitcher, or say ask Cigars Baseball, what is the team record? You may need to say ask Cigars Baseball prior to your question unless the app is just opened and active";
const REPROMPT: &str = "What would you like to know about Cigars Baseball";
const GOODBYE: &str = "Ok, see you at the ballpark";
const PLAYER_NAME_MISSING: &str =
    "I need the player's first and last name. For example, say player stats for Babe Ruth.";
const PLAYER_NAME_REPROMPT: &str = "Which player would you like statistics for";
const SERVICE_UNAVAILABLE: &str =
    "The Cigars stats server is not answering right now. Please try again later.";
const PLAYER_NOT_FOUND: &str = "statistics for player not found.";

/// Date format of the configured opening-day string ("March 26, 2017").
const OPENING_DAY_FORMAT: &str = "%B %d, %Y";

pub fn welcome() -> SpokenResponse {
    SpokenResponse::ask(WELCOME, REPROMPT)
}

pub fn help() -> SpokenResponse {
    SpokenResponse::ask(HELP, REPROMPT)
}

pub fn goodbye() -> SpokenResponse {
    SpokenResponse::tell(GOODBYE)
}

/// Re-prompt spoken when the player-name slot is missing or does not
/// split into a first and last name.
pub fn player_name_reprompt() -> SpokenResponse {
    SpokenResponse::ask(PLAYER_NAME_MISSING, PLAYER_NAME_REPROMPT)
}

/// Optional fallback line for fetch failures (`skill.speak_errors`).
pub fn service_unavailable() -> SpokenResponse {
    SpokenResponse::tell(SERVICE_UNAVAILABLE)
}

pub fn next_game(game: &NextGame) -> String {
    if game.opponent == "T B D" {
        format!(
            "The Cigars next game is on {}. Time, place and opponent are yet to be determined.",
            game.date
        )
    } else {
        format!(
            "The Cigars next game is on {} versus the {} at {}. Game time is {}.",
            game.date, game.opponent, game.field, game.time
        )
    }
}

pub fn prev_game(game: &PrevGame) -> String {
    let result = GameResult::parse(&game.result);
    let won_loss = if result.won { "won" } else { "lost" };
    format!(
        "The Cigars played the {} on {}. The Cigars {},{}",
        game.opponent, game.date, won_loss, result.score
    )
}

pub fn record(record: &TeamRecord) -> String {
    format!(
        "In {}, the Atlanta Cigars won {} games and lost {} during the season including playoff games.",
        record.year, record.wins, record.losses
    )
}

pub fn top_hitter(hitter: &TopHitter) -> String {
    format!(
        "The Cigars top hitter is {} with an O P S of {} and a batting average of {}.",
        hitter.player, hitter.ops, hitter.avg
    )
}

pub fn top_pitcher(pitcher: &TopPitcher) -> String {
    format!(
        "The Cigars top pitcher is {} with a wip of {}, an E R A of {}, and {} strikeouts.",
        pitcher.player, pitcher.whip, pitcher.era, pitcher.pitching_ks
    )
}

/// Builds the player sentence incrementally: a batting sentence when the
/// player has at bats (with a home-run clause when they have homered),
/// then a pitching sentence when they have innings pitched. Players the
/// server does not know come back as "not_found".
pub fn player_stats(stats: &PlayerStats) -> String {
    if stats.player.is_empty() || stats.player == "not_found" {
        return PLAYER_NOT_FOUND.to_string();
    }

    let mut sentences = Vec::new();
    if stats.at_bats > 0 {
        let mut batting = format!(
            "{} has {} hits with an O P S of {} and a batting average of {}",
            stats.player, stats.hits, stats.ops, stats.avg
        );
        if stats.hrs > 0 {
            batting.push_str(&format!(", including {} home runs", stats.hrs));
        }
        batting.push('.');
        sentences.push(batting);
    }
    if stats.ip > 0.0 {
        sentences.push(format!(
            "{} has pitched {} innings with a wip of {}, an E R A of {}, and {} strikeouts.",
            stats.player,
            format_innings(stats.ip),
            stats.whip,
            stats.era,
            stats.pitching_ks
        ));
    }

    if sentences.is_empty() {
        return format!("{} has no recorded statistics this season.", stats.player);
    }
    sentences.join(" ")
}

/// Countdown to the configured opening day. The date string is parsed as
/// a calendar date at midnight and the difference to `now` is rounded to
/// the nearest whole day; a difference of zero or less means opening day
/// has passed.
pub fn opening_day(date: &str, now: NaiveDateTime) -> String {
    let target = match parse_opening_day(date) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Unparseable opening day date '{}': {}", date, e);
            return format!("Opening day was on {date}.");
        }
    };

    let difference = target.and_time(NaiveTime::MIN) - now;
    if difference > chrono::Duration::zero() {
        let num_days = (difference.num_seconds() as f64 / 86_400.0).round() as i64;
        format!(
            "Cigars baseball opening day is on {date}. There are {num_days} days remaining until the season opener."
        )
    } else {
        format!("Opening day was on {date}.")
    }
}

/// Parse an opening-day date string like "March 26, 2017".
pub fn parse_opening_day(date: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), OPENING_DAY_FORMAT)
}

fn format_innings(ip: f64) -> String {
    if ip.fract() == 0.0 {
        format!("{}", ip as i64)
    } else {
        ip.to_string()
    }
}
