//! Issue sink: the mutation surface shared by rule implementations and the
//! orchestrator.
//!
//! Rules report findings with [`IssueSink::raise_issue`] and attach locations
//! to the returned [`IssueId`]. Every rule-facing call is scoped to the
//! checker currently running, and a rule may end itself only as `Skipped`.
//! The orchestrator records checker identity, final status and summaries.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QcError, Result};
use crate::report::{CheckerReport, RunReport};

/// Identifier of an issue, unique within one run.
pub type IssueId = u64;

/// Lifecycle state of a checker within one run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckerStatus {
    Pending,
    Skipped,
    Completed,
    Error,
}

impl CheckerStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for CheckerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Skipped => write!(f, "skipped"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Severity of a reported issue
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Information,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Information => write!(f, "information"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where an issue manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// A structural path into the source document, e.g. an XPath.
    Document { path: String, description: String },
    /// A point in the document's modeled space.
    Spatial {
        x: f64,
        y: f64,
        z: f64,
        description: String,
    },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document { path, .. } => write!(f, "{path}"),
            Self::Spatial { x, y, z, .. } => write!(f, "({x}, {y}, {z})"),
        }
    }
}

/// One finding reported by a checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub checker_id: String,
    pub rule_uid: String,
    pub severity: Severity,
    pub description: String,
    /// In the order they were attached.
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity, self.checker_id, self.description
        )?;
        if let Some(location) = self.locations.first() {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CheckerRecord {
    id: String,
    description: String,
    rule_uids: Vec<String>,
    status: CheckerStatus,
    summaries: Vec<String>,
    issue_count: usize,
}

impl CheckerRecord {
    fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            rule_uids: Vec::new(),
            status: CheckerStatus::Pending,
            summaries: Vec::new(),
            issue_count: 0,
        }
    }
}

/// Accumulates checker records and issues for a single run.
#[derive(Debug, Default)]
pub struct IssueSink {
    checkers: Vec<CheckerRecord>,
    index: HashMap<String, usize>,
    issues: Vec<Issue>,
    issue_index: HashMap<IssueId, usize>,
    next_issue_id: IssueId,
    active: Option<usize>,
}

impl IssueSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a checker. Registering the same id again keeps the first record.
    pub fn register_checker(&mut self, checker_id: &str, description: &str) {
        if self.index.contains_key(checker_id) {
            return;
        }
        self.index
            .insert(checker_id.to_string(), self.checkers.len());
        self.checkers.push(CheckerRecord::new(checker_id, description));
    }

    /// Associate a rule UID with a registered checker.
    pub fn register_rule(&mut self, checker_id: &str, rule_uid: &str) -> Result<()> {
        let record = self.record_mut(checker_id)?;
        if !record.rule_uids.iter().any(|uid| uid == rule_uid) {
            record.rule_uids.push(rule_uid.to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, checker_id: &str) -> bool {
        self.index.contains_key(checker_id)
    }

    /// End the running checker as `Skipped`.
    ///
    /// This is the only status a rule may choose for itself; `Completed` and
    /// `Error` are decided by the orchestrator. Follow it with [`add_summary`]
    /// to explain the skip.
    ///
    /// [`add_summary`]: Self::add_summary
    pub fn set_status(&mut self, checker_id: &str, status: CheckerStatus) -> Result<()> {
        if status != CheckerStatus::Skipped {
            return Err(QcError::InvalidStatus(format!(
                "checker '{checker_id}' may only skip itself, not become {status}"
            )));
        }
        self.active_slot(checker_id)?;
        self.finalize(checker_id, status)
    }

    #[must_use]
    pub fn status(&self, checker_id: &str) -> Option<CheckerStatus> {
        self.record(checker_id).map(|record| record.status)
    }

    /// Append a note to the running checker's record.
    pub fn add_summary(&mut self, checker_id: &str, text: impl Into<String>) -> Result<()> {
        let slot = self.active_slot(checker_id)?;
        self.checkers[slot].summaries.push(text.into());
        Ok(())
    }

    #[must_use]
    pub fn summaries(&self, checker_id: &str) -> &[String] {
        self.record(checker_id)
            .map(|record| record.summaries.as_slice())
            .unwrap_or_default()
    }

    /// Number of issues raised so far by a checker.
    #[must_use]
    pub fn issue_count(&self, checker_id: &str) -> usize {
        self.record(checker_id)
            .map_or(0, |record| record.issue_count)
    }

    /// Create an issue for the currently running checker.
    pub fn raise_issue(
        &mut self,
        checker_id: &str,
        rule_uid: &str,
        severity: Severity,
        description: impl Into<String>,
    ) -> Result<IssueId> {
        let slot = self.active_slot(checker_id)?;
        // A checker that skipped itself has not checked anything.
        if self.checkers[slot].status.is_terminal() {
            return Err(QcError::StatusAlreadySet {
                checker: checker_id.to_string(),
                status: self.checkers[slot].status,
            });
        }

        let id = self.next_issue_id;
        self.next_issue_id += 1;

        self.issue_index.insert(id, self.issues.len());
        self.issues.push(Issue {
            id,
            checker_id: checker_id.to_string(),
            rule_uid: rule_uid.to_string(),
            severity,
            description: description.into(),
            locations: Vec::new(),
        });
        self.checkers[slot].issue_count += 1;

        Ok(id)
    }

    pub fn attach_document_location(
        &mut self,
        issue_id: IssueId,
        path: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<()> {
        self.issue_mut(issue_id)?.locations.push(Location::Document {
            path: path.into(),
            description: description.into(),
        });
        Ok(())
    }

    pub fn attach_spatial_location(
        &mut self,
        issue_id: IssueId,
        x: f64,
        y: f64,
        z: f64,
        description: impl Into<String>,
    ) -> Result<()> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(QcError::InvalidLocation(format!(
                "coordinates ({x}, {y}, {z}) of issue {issue_id} are not finite"
            )));
        }
        self.issue_mut(issue_id)?.locations.push(Location::Spatial {
            x,
            y,
            z,
            description: description.into(),
        });
        Ok(())
    }

    /// True when every listed checker completed without reporting an issue.
    ///
    /// Unknown, pending, skipped and errored checkers never satisfy a
    /// precondition. An empty set is trivially satisfied.
    pub fn all_preconditions_satisfied<'a, I>(&self, checker_ids: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        checker_ids.into_iter().all(|id| {
            self.record(id).is_some_and(|record| {
                record.status == CheckerStatus::Completed && record.issue_count == 0
            })
        })
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Mark a registered checker as the one currently executing.
    pub(crate) fn activate(&mut self, checker_id: &str) -> Result<()> {
        let slot = *self
            .index
            .get(checker_id)
            .ok_or_else(|| QcError::UnknownChecker(checker_id.to_string()))?;
        self.active = Some(slot);
        Ok(())
    }

    pub(crate) const fn deactivate(&mut self) {
        self.active = None;
    }

    /// Move a checker to its terminal status on behalf of the orchestrator.
    ///
    /// A status may be written exactly once; `Pending` is never a valid target.
    pub(crate) fn finalize(&mut self, checker_id: &str, status: CheckerStatus) -> Result<()> {
        if !status.is_terminal() {
            return Err(QcError::InvalidStatus(format!(
                "cannot set checker '{checker_id}' back to {status}"
            )));
        }
        let record = self.record_mut(checker_id)?;
        if record.status.is_terminal() {
            return Err(QcError::StatusAlreadySet {
                checker: checker_id.to_string(),
                status: record.status,
            });
        }
        record.status = status;
        Ok(())
    }

    pub(crate) fn push_summary(&mut self, checker_id: &str, text: impl Into<String>) -> Result<()> {
        self.record_mut(checker_id)?.summaries.push(text.into());
        Ok(())
    }

    /// Record a fault raised while running a checker. A fault ends the checker
    /// in `Error` even if the rule already chose a terminal status.
    pub(crate) fn record_fault(&mut self, checker_id: &str, message: &str) -> Result<()> {
        let record = self.record_mut(checker_id)?;
        record.status = CheckerStatus::Error;
        record.summaries.push(format!("Error: {message}."));
        Ok(())
    }

    /// Freeze the sink into a report.
    #[must_use]
    pub fn into_report(self, schema_version: Option<String>) -> RunReport {
        let checkers = self
            .checkers
            .into_iter()
            .map(|record| CheckerReport {
                id: record.id,
                description: record.description,
                rule_uids: record.rule_uids,
                status: record.status,
                summaries: record.summaries,
                issue_count: record.issue_count,
            })
            .collect();

        RunReport {
            bundle_name: String::new(),
            bundle_version: String::new(),
            schema_version,
            checkers,
            issues: self.issues,
        }
    }

    fn record(&self, checker_id: &str) -> Option<&CheckerRecord> {
        self.index.get(checker_id).map(|&slot| &self.checkers[slot])
    }

    fn active_slot(&self, checker_id: &str) -> Result<usize> {
        let slot = *self
            .index
            .get(checker_id)
            .ok_or_else(|| QcError::UnknownChecker(checker_id.to_string()))?;
        if self.active != Some(slot) {
            return Err(QcError::InactiveChecker(checker_id.to_string()));
        }
        Ok(slot)
    }

    fn record_mut(&mut self, checker_id: &str) -> Result<&mut CheckerRecord> {
        let slot = *self
            .index
            .get(checker_id)
            .ok_or_else(|| QcError::UnknownChecker(checker_id.to_string()))?;
        Ok(&mut self.checkers[slot])
    }

    fn issue_mut(&mut self, issue_id: IssueId) -> Result<&mut Issue> {
        let slot = *self
            .issue_index
            .get(&issue_id)
            .ok_or(QcError::UnknownIssue(issue_id))?;
        Ok(&mut self.issues[slot])
    }
}
