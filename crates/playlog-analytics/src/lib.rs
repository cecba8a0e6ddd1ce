//! Statistics aggregation and reporting for playlog activity logs.
//!
//! Computes per-game summaries (counts, scores, win/loss, average reaction
//! time) and global totals from the append-only activity log, and renders
//! them as text, markdown, or a structured export dump.

pub mod aggregations;
pub mod reports;

pub use aggregations::{compute_stats, GameStats, StatsSummary};
pub use reports::{export_file_name, ExportDocument, ReportGenerator};
