//! Report generation and export dumps.
//!
//! Renders a [`StatsSummary`] as a compact text summary or a markdown
//! report, and produces the structured export document (timestamp + stats +
//! raw log) written by `playlog export`.

use crate::aggregations::{compute_stats, StatsSummary};
use chrono::{DateTime, NaiveDate, Utc};
use playlog_core::entry::ActivityEntry;
use serde::{Deserialize, Serialize};

/// Structured dump of the activity log and its computed summary.
///
/// The `logs` section carries the raw sequence verbatim, so re-ingesting an
/// export reproduces the original log exactly (order and field values).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub stats: StatsSummary,
    pub logs: Vec<ActivityEntry>,
}

impl ExportDocument {
    /// Build an export from a snapshot of the log, computing stats on the way.
    pub fn new(logs: Vec<ActivityEntry>) -> Self {
        Self {
            exported_at: Utc::now(),
            stats: compute_stats(&logs),
            logs,
        }
    }

    /// Human-readable JSON dump.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Re-ingest a previously written export.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Date-stamped export file name, e.g. `playlog-export-2026-08-06.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("playlog-export-{}.json", date.format("%Y-%m-%d"))
}

/// Report generator for stats summaries.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Compact summary suitable for terminal display.
    pub fn text_summary(stats: &StatsSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "  Sessions: {}  Guesses: {}\n",
            stats.total_sessions, stats.total_guesses
        ));

        match (stats.first_activity, stats.last_activity) {
            (Some(first), Some(last)) => {
                output.push_str(&format!(
                    "  Activity: {} - {}\n",
                    first.format("%Y-%m-%d %H:%M"),
                    last.format("%Y-%m-%d %H:%M")
                ));
            }
            _ => output.push_str("  Activity: none recorded\n"),
        }

        if stats.game_stats.is_empty() {
            output.push_str("  No completed games\n");
        }
        for (game, gs) in &stats.game_stats {
            output.push_str(&format!(
                "  {}: {} played, {}W/{}L, score {}",
                game, gs.games_played, gs.wins, gs.losses, gs.total_score
            ));
            if let Some(avg) = gs.avg_reaction_time_ms {
                output.push_str(&format!(", avg reaction {}ms", avg));
            }
            output.push('\n');
        }

        output
    }

    /// Markdown report with an overview and a per-game breakdown table.
    pub fn markdown_report(stats: &StatsSummary) -> String {
        let mut report = String::new();

        report.push_str("# Activity Report\n\n");

        report.push_str("## Overview\n\n");
        report.push_str(&format!("- **Sessions:** {}\n", stats.total_sessions));
        report.push_str(&format!("- **Guesses:** {}\n", stats.total_guesses));
        if let Some(first) = stats.first_activity {
            report.push_str(&format!(
                "- **First Activity:** {}\n",
                first.format("%B %d, %Y %H:%M")
            ));
        }
        if let Some(last) = stats.last_activity {
            report.push_str(&format!(
                "- **Last Activity:** {}\n",
                last.format("%B %d, %Y %H:%M")
            ));
        }
        report.push('\n');

        report.push_str("## Games\n\n");
        if stats.game_stats.is_empty() {
            report.push_str("No completed games.\n");
            return report;
        }

        report.push_str("| Game | Played | Wins | Losses | Score | Avg Reaction |\n");
        report.push_str("|------|--------|------|--------|-------|--------------|\n");
        for (game, gs) in &stats.game_stats {
            let reaction = gs
                .avg_reaction_time_ms
                .map(|ms| format!("{}ms", ms))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                game, gs.games_played, gs.wins, gs.losses, gs.total_score, reaction
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlog_core::entry::{EntryDraft, EntryKind};

    fn sample_entries() -> Vec<ActivityEntry> {
        let start = ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::SessionStart)
                .with_session_id("s1")
                .with_game("wordle"),
        );
        let guess = ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::Guess)
                .with_session_id("s1")
                .with_reaction_time_ms(180),
        );
        let end = ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::SessionEnd)
                .with_session_id("s1")
                .with_score(4)
                .with_won(true),
        );
        vec![start, guess, end]
    }

    #[test]
    fn test_export_roundtrip_preserves_log() {
        let entries = sample_entries();
        let export = ExportDocument::new(entries.clone());

        let json = export.to_json().unwrap();
        let reread = ExportDocument::from_json(&json).unwrap();

        assert_eq!(reread.logs, entries);
        assert_eq!(reread.stats, export.stats);
    }

    #[test]
    fn test_export_preserves_unknown_payload_fields() {
        let mut entries = sample_entries();
        entries[1]
            .extra
            .insert("word".into(), serde_json::Value::String("CRANE".into()));

        let json = ExportDocument::new(entries.clone()).to_json().unwrap();
        let reread = ExportDocument::from_json(&json).unwrap();
        assert_eq!(reread.logs, entries);
        assert_eq!(reread.logs[1].extra["word"], "CRANE");
    }

    #[test]
    fn test_export_contains_stats_and_timestamp() {
        let export = ExportDocument::new(sample_entries());
        let json: serde_json::Value =
            serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert!(json.get("exportedAt").is_some());
        assert_eq!(json["stats"]["totalSessions"], 1);
        assert_eq!(json["logs"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(export_file_name(date), "playlog-export-2026-08-06.json");
    }

    #[test]
    fn test_text_summary() {
        let stats = compute_stats(&sample_entries());
        let summary = ReportGenerator::text_summary(&stats);
        assert!(summary.contains("Sessions: 1"));
        assert!(summary.contains("wordle: 1 played, 1W/0L, score 4"));
        assert!(summary.contains("avg reaction 180ms"));
    }

    #[test]
    fn test_empty_text_summary() {
        let stats = compute_stats(&[]);
        let summary = ReportGenerator::text_summary(&stats);
        assert!(summary.contains("Sessions: 0"));
        assert!(summary.contains("none recorded"));
        assert!(summary.contains("No completed games"));
    }

    #[test]
    fn test_markdown_report_structure() {
        let stats = compute_stats(&sample_entries());
        let report = ReportGenerator::markdown_report(&stats);
        assert!(report.contains("# Activity Report"));
        assert!(report.contains("## Overview"));
        assert!(report.contains("## Games"));
        assert!(report.contains("| wordle | 1 | 1 | 0 | 4 | 180ms |"));
    }

    #[test]
    fn test_markdown_report_empty() {
        let report = ReportGenerator::markdown_report(&compute_stats(&[]));
        assert!(report.contains("No completed games."));
    }
}
