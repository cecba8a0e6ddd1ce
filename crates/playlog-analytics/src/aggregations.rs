//! Per-game statistics computed from the activity log.
//!
//! Aggregation is a pure pass over a snapshot of the log: the caller supplies
//! the entries (in append order) and receives a summary. Nothing is cached or
//! persisted; stats are recomputed from the log every time.

use chrono::{DateTime, Utc};
use playlog_core::entry::ActivityEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated statistics for a single game variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub games_played: u32,
    pub total_score: i64,
    pub wins: u32,
    pub losses: u32,
    /// Mean reaction time in milliseconds, rounded to the nearest integer.
    /// Absent unless at least one positive sample was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_reaction_time_ms: Option<i64>,
}

/// Summary over the full activity log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Count of `session_end`/`round_end` entries, including ones whose game
    /// could not be resolved.
    pub total_sessions: u32,
    /// Count of `guess`/`action` entries.
    pub total_guesses: u32,
    pub game_stats: BTreeMap<String, GameStats>,
    /// Timestamp of the first entry in storage order, if any.
    pub first_activity: Option<DateTime<Utc>>,
    /// Timestamp of the last entry in storage order, if any.
    pub last_activity: Option<DateTime<Utc>>,
}

/// In-progress per-game record, finalized into [`GameStats`].
#[derive(Default)]
struct GameAccumulator {
    games_played: u32,
    total_score: i64,
    wins: u32,
    losses: u32,
    reaction_sum: i64,
    reaction_count: u32,
}

impl GameAccumulator {
    fn finalize(self) -> GameStats {
        let avg_reaction_time_ms = if self.reaction_count > 0 {
            Some((self.reaction_sum as f64 / self.reaction_count as f64).round() as i64)
        } else {
            None
        };
        GameStats {
            games_played: self.games_played,
            total_score: self.total_score,
            wins: self.wins,
            losses: self.losses,
            avg_reaction_time_ms,
        }
    }
}

/// Compute the summary over a snapshot of the activity log.
///
/// Total over any well-formed input: malformed entries (missing fields)
/// degrade per the resolution rules instead of failing. Chronology of
/// `first_activity`/`last_activity` relies on the caller passing entries in
/// append order.
pub fn compute_stats(entries: &[ActivityEntry]) -> StatsSummary {
    let session_starts: Vec<&ActivityEntry> =
        entries.iter().filter(|e| e.is_session_start()).collect();
    let session_closes: Vec<&ActivityEntry> =
        entries.iter().filter(|e| e.is_session_close()).collect();
    let activity_events: Vec<&ActivityEntry> =
        entries.iter().filter(|e| e.is_activity_event()).collect();

    let mut accumulators: BTreeMap<String, GameAccumulator> = BTreeMap::new();
    for start in &session_starts {
        if let Some(game) = start.game.as_deref() {
            accumulators.entry(game.to_string()).or_default();
        }
    }

    for close in &session_closes {
        let game = match resolve_game(close, &session_starts) {
            Some(game) => game,
            // Uncorrelated close: still counts toward total_sessions below.
            None => continue,
        };
        let acc = accumulators.entry(game.to_string()).or_default();
        acc.games_played += 1;
        acc.total_score += close.resolved_score();
        match close.won {
            Some(true) => acc.wins += 1,
            Some(false) => acc.losses += 1,
            // Absent won counts toward neither wins nor losses.
            None => {}
        }
    }

    for event in &activity_events {
        let game = match resolve_game(event, &session_starts) {
            Some(game) => game,
            None => continue,
        };
        // Events only feed games that already have an accumulator.
        if let Some(acc) = accumulators.get_mut(game) {
            let reaction = event.resolved_reaction_ms();
            if reaction > 0 {
                acc.reaction_sum += reaction;
                acc.reaction_count += 1;
            }
        }
    }

    StatsSummary {
        total_sessions: session_closes.len() as u32,
        total_guesses: activity_events.len() as u32,
        game_stats: accumulators
            .into_iter()
            .map(|(game, acc)| (game, acc.finalize()))
            .collect(),
        first_activity: entries.first().map(|e| e.timestamp),
        last_activity: entries.last().map(|e| e.timestamp),
    }
}

/// Game name for an entry: its own `game` field if present, otherwise the
/// `game` of the first session start sharing its session id. Entries may
/// reference sessions whose start was never logged; the lookup tolerates
/// absence.
fn resolve_game<'a>(
    entry: &'a ActivityEntry,
    session_starts: &[&'a ActivityEntry],
) -> Option<&'a str> {
    if let Some(game) = entry.game.as_deref() {
        return Some(game);
    }
    let session_id = entry.session_id.as_deref()?;
    session_starts
        .iter()
        .find(|s| s.session_id.as_deref() == Some(session_id))
        .and_then(|s| s.game.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlog_core::entry::{EntryDraft, EntryKind};

    fn start(session: &str, game: &str) -> ActivityEntry {
        ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::SessionStart)
                .with_session_id(session)
                .with_game(game),
        )
    }

    fn end(session: &str) -> ActivityEntry {
        ActivityEntry::from_draft(EntryDraft::new(EntryKind::SessionEnd).with_session_id(session))
    }

    fn guess(session: &str, reaction_ms: i64) -> ActivityEntry {
        ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::Guess)
                .with_session_id(session)
                .with_reaction_time_ms(reaction_ms),
        )
    }

    #[test]
    fn test_empty_log() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_guesses, 0);
        assert!(stats.game_stats.is_empty());
        assert!(stats.first_activity.is_none());
        assert!(stats.last_activity.is_none());
    }

    #[test]
    fn test_global_totals_count_by_kind() {
        let entries = vec![
            start("s1", "wordle"),
            guess("s1", 100),
            ActivityEntry::from_draft(EntryDraft::new(EntryKind::Action).with_session_id("s1")),
            ActivityEntry::from_draft(EntryDraft::new(EntryKind::RoundEnd).with_session_id("s1")),
            end("s1"),
            // Unknown kinds count toward nothing.
            ActivityEntry::from_draft(EntryDraft::new(EntryKind::Other("settings".into()))),
        ];
        let stats = compute_stats(&entries);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_guesses, 2);
    }

    #[test]
    fn test_completed_session_scenario() {
        let mut close = end("s1");
        close.score = Some(5);
        close.won = Some(true);
        let entries = vec![start("s1", "wordle"), close];

        let stats = compute_stats(&entries);
        let wordle = &stats.game_stats["wordle"];
        assert_eq!(wordle.games_played, 1);
        assert_eq!(wordle.total_score, 5);
        assert_eq!(wordle.wins, 1);
        assert_eq!(wordle.losses, 0);
        assert!(wordle.avg_reaction_time_ms.is_none());
    }

    #[test]
    fn test_missing_won_counts_neither() {
        let entries = vec![start("s1", "quiz"), end("s1")];
        let stats = compute_stats(&entries);
        let quiz = &stats.game_stats["quiz"];
        assert_eq!(quiz.games_played, 1);
        assert_eq!(quiz.wins, 0);
        assert_eq!(quiz.losses, 0);
    }

    #[test]
    fn test_lost_session() {
        let mut close = end("s1");
        close.won = Some(false);
        let entries = vec![start("s1", "quiz"), close];
        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats["quiz"].losses, 1);
        assert_eq!(stats.game_stats["quiz"].wins, 0);
    }

    #[test]
    fn test_score_falls_back_to_guess_count() {
        let mut close = end("s1");
        close.guess_count = Some(4);
        let entries = vec![start("s1", "wordle"), close];
        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats["wordle"].total_score, 4);
    }

    #[test]
    fn test_unresolved_close_counts_globally_only() {
        // No own game, no matching session start.
        let entries = vec![start("s1", "wordle"), end("s2")];
        let stats = compute_stats(&entries);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.game_stats["wordle"].games_played, 0);
        assert_eq!(stats.game_stats.len(), 1);
    }

    #[test]
    fn test_close_resolves_game_via_session_start() {
        let mut close = end("s1");
        close.score = Some(3);
        let entries = vec![start("s1", "missing-vowels"), close];
        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats["missing-vowels"].games_played, 1);
        assert_eq!(stats.game_stats["missing-vowels"].total_score, 3);
    }

    #[test]
    fn test_close_with_own_game_needs_no_start() {
        let mut close = end("s9");
        close.game = Some("anagrams".into());
        let stats = compute_stats(&[close]);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.game_stats["anagrams"].games_played, 1);
    }

    #[test]
    fn test_average_reaction_time() {
        let entries = vec![
            start("s1", "wordle"),
            guess("s1", 100),
            guess("s1", 300),
            end("s1"),
        ];
        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats["wordle"].avg_reaction_time_ms, Some(200));
    }

    #[test]
    fn test_average_reaction_time_rounds() {
        let entries = vec![start("s1", "wordle"), guess("s1", 100), guess("s1", 101)];
        let stats = compute_stats(&entries);
        // 100.5 rounds away from zero.
        assert_eq!(stats.game_stats["wordle"].avg_reaction_time_ms, Some(101));
    }

    #[test]
    fn test_zero_reaction_time_is_not_a_sample() {
        let entries = vec![
            start("s1", "wordle"),
            guess("s1", 0),
            guess("s1", 200),
        ];
        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats["wordle"].avg_reaction_time_ms, Some(200));
        assert_eq!(stats.total_guesses, 2);
    }

    #[test]
    fn test_legacy_reaction_field() {
        let mut event = guess("s1", 0);
        event.reaction_time_ms = None;
        event.reaction_time = Some(400);
        let entries = vec![start("s1", "wordle"), event];
        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats["wordle"].avg_reaction_time_ms, Some(400));
    }

    #[test]
    fn test_event_without_accumulator_is_skipped() {
        // Guess names a game nothing else established.
        let mut event = guess("s1", 500);
        event.game = Some("ghost-game".into());
        let stats = compute_stats(&[event]);
        assert_eq!(stats.total_guesses, 1);
        assert!(stats.game_stats.is_empty());
    }

    #[test]
    fn test_first_and_last_activity_from_storage_order() {
        let mut a = start("s1", "wordle");
        let mut b = end("s1");
        a.timestamp = "2026-01-01T08:00:00Z".parse().unwrap();
        b.timestamp = "2026-01-02T09:30:00Z".parse().unwrap();
        let stats = compute_stats(&[a.clone(), b.clone()]);
        assert_eq!(stats.first_activity, Some(a.timestamp));
        assert_eq!(stats.last_activity, Some(b.timestamp));
    }

    #[test]
    fn test_idempotent_over_same_snapshot() {
        let entries = vec![
            start("s1", "wordle"),
            guess("s1", 120),
            end("s1"),
            start("s2", "quiz"),
        ];
        assert_eq!(compute_stats(&entries), compute_stats(&entries));
    }

    #[test]
    fn test_multiple_games_partitioned() {
        let mut w = end("s1");
        w.won = Some(true);
        w.score = Some(6);
        let mut q = end("s2");
        q.won = Some(false);
        q.score = Some(2);
        let entries = vec![start("s1", "wordle"), start("s2", "quiz"), w, q, guess("s1", 90)];

        let stats = compute_stats(&entries);
        assert_eq!(stats.game_stats.len(), 2);
        assert_eq!(stats.game_stats["wordle"].wins, 1);
        assert_eq!(stats.game_stats["wordle"].avg_reaction_time_ms, Some(90));
        assert_eq!(stats.game_stats["quiz"].losses, 1);
        assert_eq!(stats.game_stats["quiz"].total_score, 2);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let entries = vec![start("s1", "wordle"), end("s1")];
        let json = serde_json::to_value(compute_stats(&entries)).unwrap();
        assert!(json.get("totalSessions").is_some());
        assert!(json.get("gameStats").is_some());
        let wordle = &json["gameStats"]["wordle"];
        assert!(wordle.get("gamesPlayed").is_some());
        // No samples: the key is omitted entirely.
        assert!(wordle.get("avgReactionTimeMs").is_none());
    }
}
