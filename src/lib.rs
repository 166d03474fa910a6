//! xodr-qc - rule-validation orchestrator for OpenDRIVE quality checks.
//!
//! The engine runs an ordered registry of independent checkers against one
//! parsed document. Each checker is gated on its preconditions and on the
//! document's schema version, executed inside a fault boundary, and reports
//! issues through an [`IssueSink`]. The result is a [`RunReport`] with exactly
//! one terminal status per checker.
//!
//! # Example
//!
//! ```
//! use xodr_qc::checker::{CheckerDescriptor, Registry};
//! use xodr_qc::orchestrator::Orchestrator;
//! use xodr_qc::sink::{CheckerStatus, IssueSink, Severity};
//!
//! const UID: &str = "openmsl.net:xodr:1.4.0:road.min_length";
//!
//! let min_length = CheckerDescriptor::new(
//!     "check_openmsl_xodr_road_min_length",
//!     "Road length shall be at least 1 m",
//!     UID,
//!     |lengths: &[f64], sink: &mut IssueSink| {
//!         for (idx, length) in lengths.iter().enumerate() {
//!             if *length < 1.0 {
//!                 let issue = sink.raise_issue(
//!                     "check_openmsl_xodr_road_min_length",
//!                     UID,
//!                     Severity::Warning,
//!                     format!("road {idx} is only {length} m long"),
//!                 )?;
//!                 sink.attach_document_location(issue, format!("/OpenDRIVE/road[{}]", idx + 1), "road")?;
//!             }
//!         }
//!         Ok(())
//!     },
//! )
//! .with_applicable_version("[1.4.0, )");
//!
//! let registry = Registry::from_descriptors([min_length]).unwrap();
//! let report = Orchestrator::new(registry).run(&[12.0, 0.5][..], Some("1.6"));
//!
//! assert_eq!(report.status_of("check_openmsl_xodr_road_min_length"), Some(CheckerStatus::Completed));
//! assert_eq!(report.issues.len(), 1);
//! ```

pub mod checker;
pub mod checks;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod report;
pub mod sink;
pub mod version;

pub use checker::{Check, CheckerDescriptor, Registry, RuleUid};
pub use config::Config;
pub use document::Document;
pub use error::{QcError, Result};
pub use orchestrator::{Orchestrator, RunSettings, run};
pub use report::{CheckerReport, ReportSummary, RunReport};
pub use sink::{CheckerStatus, Issue, IssueId, IssueSink, Location, Severity};
pub use version::{Version, VersionExpr};
