//! Per-run outcome and its text/JSON rendering

use crate::storage::{RunStatus, RunSummary};
use crate::CatalogError;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

/// Everything a run reports once it finishes, successfully or not
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub books_scraped: usize,
    pub books_sanitized: usize,
    pub books_saved: u64,
    pub deleted_count: u64,
    pub duration_seconds: f64,
    pub success: bool,

    /// Page failures followed by the fatal error, if any
    pub errors: Vec<String>,

    pub started_at: String,
    pub finished_at: Option<String>,
    pub failed_stage: Option<String>,
    pub cache_invalidated: bool,
    pub discarded: usize,
    pub unrecognized_ratings: usize,
    pub page_errors: usize,
}

impl RefreshOutcome {
    /// An outcome for a run starting now
    pub fn started() -> Self {
        Self {
            books_scraped: 0,
            books_sanitized: 0,
            books_saved: 0,
            deleted_count: 0,
            duration_seconds: 0.0,
            success: false,
            errors: Vec::new(),
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            failed_stage: None,
            cache_invalidated: false,
            discarded: 0,
            unrecognized_ratings: 0,
            page_errors: 0,
        }
    }

    /// Marks the run successful
    pub fn succeed(&mut self, elapsed: Duration) {
        self.success = true;
        self.finish(elapsed);
    }

    /// Marks the run failed at the stage `error` aborted
    pub fn fail(&mut self, error: &CatalogError, elapsed: Duration) {
        self.success = false;
        self.failed_stage = Some(error.stage_name());
        self.errors.push(error.to_string());
        self.finish(elapsed);
    }

    fn finish(&mut self, elapsed: Duration) {
        self.duration_seconds = elapsed.as_secs_f64();
        self.finished_at = Some(Utc::now().to_rfc3339());
    }

    /// Figures recorded in the run history
    pub fn run_summary(&self) -> RunSummary {
        RunSummary {
            status: if self.success {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            },
            books_scraped: self.books_scraped as u64,
            books_saved: self.books_saved,
            page_errors: self.page_errors as u64,
            failed_stage: self.failed_stage.clone(),
        }
    }
}

/// Formats an outcome as a human-readable summary
pub fn format_summary(outcome: &RefreshOutcome) -> String {
    let mut out = String::new();

    if outcome.success {
        out.push_str("Data refresh completed successfully\n");
    } else {
        out.push_str(&format!(
            "Data refresh FAILED at stage {}\n",
            outcome.failed_stage.as_deref().unwrap_or("UNKNOWN")
        ));
    }

    out.push_str("Summary:\n");
    out.push_str(&format!("  Books scraped: {}\n", outcome.books_scraped));
    out.push_str(&format!(
        "  Books sanitized: {} ({} discarded, {} unrecognized ratings)\n",
        outcome.books_sanitized, outcome.discarded, outcome.unrecognized_ratings
    ));
    out.push_str(&format!("  Books deleted: {}\n", outcome.deleted_count));
    out.push_str(&format!("  Books saved: {}\n", outcome.books_saved));
    out.push_str(&format!(
        "  Cache invalidated: {}\n",
        if outcome.cache_invalidated { "yes" } else { "no" }
    ));
    out.push_str(&format!("  Page errors: {}\n", outcome.page_errors));
    out.push_str(&format!(
        "  Duration: {:.2} seconds\n",
        outcome.duration_seconds
    ));
    out.push_str(&format!("  Started at: {}\n", outcome.started_at));
    if let Some(finished) = &outcome.finished_at {
        out.push_str(&format!("  Finished at: {}\n", finished));
    }

    if !outcome.errors.is_empty() {
        out.push_str(&format!("Errors ({}):\n", outcome.errors.len()));
        for error in &outcome.errors {
            out.push_str(&format!("  - {}\n", error));
        }
    }

    out
}

/// Prints an outcome to stdout, as JSON when `json` is set
pub fn print_outcome(outcome: &RefreshOutcome, json: bool) {
    if json {
        match serde_json::to_string_pretty(outcome) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!("Failed to serialize summary: {}", e),
        }
    } else {
        println!("\n{}", format_summary(outcome));
    }
}
