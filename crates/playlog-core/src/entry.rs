//! Activity-log entry types.
//!
//! An entry is one immutable record in the append-only activity log. Entries
//! are created by the game front-ends via [`ActivityLog::append`] and never
//! mutated or reordered afterwards; all statistics are recomputed from the
//! log rather than kept as running totals.
//!
//! [`ActivityLog::append`]: crate::store::ActivityLog::append

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of activity entry.
///
/// The known kinds drive aggregation; anything else round-trips unchanged
/// through [`EntryKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    SessionStart,
    SessionEnd,
    RoundEnd,
    Guess,
    Action,
    Other(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::SessionStart => "session_start",
            EntryKind::SessionEnd => "session_end",
            EntryKind::RoundEnd => "round_end",
            EntryKind::Guess => "guess",
            EntryKind::Action => "action",
            EntryKind::Other(s) => s,
        }
    }
}

impl From<String> for EntryKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "session_start" => EntryKind::SessionStart,
            "session_end" => EntryKind::SessionEnd,
            "round_end" => EntryKind::RoundEnd,
            "guess" => EntryKind::Guess,
            "action" => EntryKind::Action,
            _ => EntryKind::Other(s),
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for EntryKind {
    fn default() -> Self {
        EntryKind::Action
    }
}

/// One record in the activity log.
///
/// Field names follow the original browser-storage JSON (camelCase), so logs
/// written by the game front-ends deserialize unchanged. Payload fields not
/// modelled here are preserved verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Correlates entries belonging to one game session. Matches between a
    /// `session_start` and its later `session_end`/events.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<String>,
    /// Game variant. May be absent on non-start entries, in which case it is
    /// recovered by looking up the `session_start` sharing the session id.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guess_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub won: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reaction_time_ms: Option<i64>,
    /// Legacy name for `reaction_time_ms`, still written by older game builds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reaction_time: Option<i64>,
    /// Unmodelled payload fields, kept so exports round-trip exactly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ActivityEntry {
    /// Complete a draft: assign `id` and `timestamp` at append time.
    pub fn from_draft(draft: EntryDraft) -> Self {
        let now = Utc::now();
        Self {
            id: generate_entry_id(now),
            timestamp: now,
            kind: draft.kind,
            session_id: draft.session_id,
            game: draft.game,
            score: draft.score,
            guess_count: draft.guess_count,
            won: draft.won,
            reaction_time_ms: draft.reaction_time_ms,
            reaction_time: None,
            extra: draft.extra,
        }
    }

    /// Score for a finished session: explicit `score`, else `guessCount`,
    /// else zero.
    pub fn resolved_score(&self) -> i64 {
        self.score.or(self.guess_count).unwrap_or(0)
    }

    /// Reaction-time sample in milliseconds, falling back to the legacy
    /// field name, else zero.
    pub fn resolved_reaction_ms(&self) -> i64 {
        self.reaction_time_ms.or(self.reaction_time).unwrap_or(0)
    }

    pub fn is_session_start(&self) -> bool {
        self.kind == EntryKind::SessionStart
    }

    /// Entries that close out a session: `session_end` or `round_end`.
    pub fn is_session_close(&self) -> bool {
        matches!(self.kind, EntryKind::SessionEnd | EntryKind::RoundEnd)
    }

    /// In-session activity: `guess` or `action`.
    pub fn is_activity_event(&self) -> bool {
        matches!(self.kind, EntryKind::Guess | EntryKind::Action)
    }
}

/// A partial entry lacking `id`/`timestamp`, completed at append time.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub session_id: Option<String>,
    pub game: Option<String>,
    pub score: Option<i64>,
    pub guess_count: Option<i64>,
    pub won: Option<bool>,
    pub reaction_time_ms: Option<i64>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EntryDraft {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_guess_count(mut self, count: i64) -> Self {
        self.guess_count = Some(count);
        self
    }

    pub fn with_won(mut self, won: bool) -> Self {
        self.won = Some(won);
        self
    }

    pub fn with_reaction_time_ms(mut self, ms: i64) -> Self {
        self.reaction_time_ms = Some(ms);
        self
    }
}

/// Entry id: millisecond timestamp plus a random suffix. Sorts roughly by
/// append time; uniqueness is best-effort, not guaranteed under clock
/// collisions.
pub fn generate_entry_id(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", at.timestamp_millis(), &suffix[..8])
}

/// Fresh session id for a new game session.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_roundtrip() {
        for s in ["session_start", "session_end", "round_end", "guess", "action"] {
            let kind = EntryKind::from(s.to_string());
            assert_eq!(String::from(kind), s);
        }

        let other = EntryKind::from("dataset_loaded".to_string());
        assert_eq!(other, EntryKind::Other("dataset_loaded".into()));
        assert_eq!(String::from(other), "dataset_loaded");
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::Guess)
                .with_session_id("s1")
                .with_game("wordle")
                .with_reaction_time_ms(150),
        );
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["type"], "guess");
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["reactionTimeMs"], 150);
        // Absent payload fields stay absent.
        assert!(json.get("score").is_none());
        assert!(json.get("won").is_none());
    }

    #[test]
    fn test_unknown_payload_fields_preserved() {
        let raw = r#"{
            "id": "1700000000000-abcd1234",
            "timestamp": "2026-01-05T10:00:00Z",
            "type": "guess",
            "sessionId": "s1",
            "word": "CRANE",
            "row": 3
        }"#;
        let entry: ActivityEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.extra["word"], "CRANE");
        assert_eq!(entry.extra["row"], 3);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["word"], "CRANE");
        assert_eq!(json["row"], 3);
    }

    #[test]
    fn test_resolved_score_fallbacks() {
        let mut entry = ActivityEntry::from_draft(EntryDraft::new(EntryKind::SessionEnd));
        assert_eq!(entry.resolved_score(), 0);

        entry.guess_count = Some(4);
        assert_eq!(entry.resolved_score(), 4);

        entry.score = Some(9);
        assert_eq!(entry.resolved_score(), 9);
    }

    #[test]
    fn test_resolved_reaction_legacy_field() {
        let mut entry = ActivityEntry::from_draft(EntryDraft::new(EntryKind::Guess));
        assert_eq!(entry.resolved_reaction_ms(), 0);

        entry.reaction_time = Some(250);
        assert_eq!(entry.resolved_reaction_ms(), 250);

        entry.reaction_time_ms = Some(100);
        assert_eq!(entry.resolved_reaction_ms(), 100);
    }

    #[test]
    fn test_draft_completion_assigns_id_and_timestamp() {
        let entry = ActivityEntry::from_draft(EntryDraft::new(EntryKind::SessionStart));
        let (millis, suffix) = entry.id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn test_kind_predicates() {
        let close = ActivityEntry::from_draft(EntryDraft::new(EntryKind::RoundEnd));
        assert!(close.is_session_close());
        assert!(!close.is_activity_event());

        let guess = ActivityEntry::from_draft(EntryDraft::new(EntryKind::Action));
        assert!(guess.is_activity_event());
        assert!(!guess.is_session_start());
    }
}
