//! Checker definitions.
//!
//! - [`CheckerDescriptor`] holds a checker's identity, rule UID, preconditions,
//!   applicability expression and its implementation
//! - [`Check`] is the rule implementation seam; closures implement it directly
//! - [`Registry`] keeps descriptors in execution order
//!
//! # Example
//!
//! ```
//! use xodr_qc::checker::{CheckerDescriptor, Registry};
//! use xodr_qc::sink::{IssueSink, Severity};
//!
//! let lane_type = CheckerDescriptor::new(
//!     "check_openmsl_xodr_road_lane_type_none",
//!     "Lane Type shall not be None",
//!     "openmsl.net:xodr:1.4.0:road.semantic.lane_type.none",
//!     |doc: &str, sink: &mut IssueSink| {
//!         if doc.contains("type=\"none\"") {
//!             sink.raise_issue(
//!                 "check_openmsl_xodr_road_lane_type_none",
//!                 "openmsl.net:xodr:1.4.0:road.semantic.lane_type.none",
//!                 Severity::Warning,
//!                 "lane type none",
//!             )?;
//!         }
//!         Ok(())
//!     },
//! )
//! .with_applicable_version("[1.4.0, )");
//!
//! let registry = Registry::from_descriptors([lane_type]).unwrap();
//! assert_eq!(registry.len(), 1);
//! ```

pub mod descriptor;
pub mod registry;
pub mod rule_uid;

pub use descriptor::{BoxedCheck, Check, CheckerDescriptor};
pub use registry::Registry;
pub use rule_uid::RuleUid;
