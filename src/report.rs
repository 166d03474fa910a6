//! Run reports: the immutable result of one orchestration pass.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sink::{CheckerStatus, Issue, Severity};

/// Outcome of one registered checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerReport {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub rule_uids: Vec<String>,
    pub status: CheckerStatus,
    #[serde(default)]
    pub summaries: Vec<String>,
    pub issue_count: usize,
}

/// Per-checker statuses and summaries plus every issue, in reporting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub bundle_name: String,
    pub bundle_version: String,
    pub schema_version: Option<String>,
    pub checkers: Vec<CheckerReport>,
    pub issues: Vec<Issue>,
}

/// Aggregate counts of a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub completed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub pending: usize,
    pub issues_by_severity: BTreeMap<Severity, usize>,
}

impl ReportSummary {
    #[must_use]
    pub fn total_issues(&self) -> usize {
        self.issues_by_severity.values().sum()
    }
}

impl RunReport {
    #[must_use]
    pub fn checker(&self, id: &str) -> Option<&CheckerReport> {
        self.checkers.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn status_of(&self, id: &str) -> Option<CheckerStatus> {
        self.checker(id).map(|c| c.status)
    }

    pub fn issues_for<'a>(&'a self, checker_id: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues
            .iter()
            .filter(move |issue| issue.checker_id == checker_id)
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for checker in &self.checkers {
            match checker.status {
                CheckerStatus::Completed => summary.completed += 1,
                CheckerStatus::Skipped => summary.skipped += 1,
                CheckerStatus::Error => summary.errored += 1,
                CheckerStatus::Pending => summary.pending += 1,
            }
        }
        for issue in &self.issues {
            *summary.issues_by_severity.entry(issue.severity).or_default() += 1;
        }
        summary
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Write the report as pretty-printed JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Render a human-readable markdown document of the run.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let summary = self.summary();

        let _ = writeln!(out, "# {} {}", self.bundle_name, self.bundle_version);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Schema version: {}",
            self.schema_version.as_deref().unwrap_or("unknown")
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Checkers: {} completed, {} skipped, {} error",
            summary.completed, summary.skipped, summary.errored
        );
        let _ = writeln!(out, "Issues: {}", summary.total_issues());

        for checker in &self.checkers {
            let _ = writeln!(out);
            let _ = writeln!(out, "## {}", checker.id);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", checker.description);
            let _ = writeln!(out);
            let _ = writeln!(out, "- Status: {}", checker.status);
            let _ = writeln!(out, "- Issues: {}", checker.issue_count);
            for uid in &checker.rule_uids {
                let _ = writeln!(out, "- Rule: `{uid}`");
            }
            for text in &checker.summaries {
                let _ = writeln!(out, "- Note: {text}");
            }
        }

        out
    }
}
