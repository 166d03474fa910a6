//! E2E Scenario: Orchestration Workflow
//!
//! Full validation passes over an in-memory road network covering:
//! - Basic checks gating domain rules
//! - Issue reporting with document and spatial locations
//! - Precondition skips after a checker reports issues
//! - Applicability gating on the schema version
//! - Fault containment for failing and panicking rules
//! - Run abort when the document cannot be read

use std::collections::HashSet;

use xodr_qc::checker::{CheckerDescriptor, Registry};
use xodr_qc::checks::{basic_checkers, RootTagIsOpenDrive, VersionIsDefined};
use xodr_qc::orchestrator::{Orchestrator, RunSettings, PRECONDITIONS_NOT_SATISFIED};
use xodr_qc::{CheckerStatus, IssueSink, Location, QcError, Severity};

use super::common::{
    LANE_TYPE_NONE_ID, MIN_LENGTH_ID, RoadNetwork, failing, lane_type_none, passing,
    road_min_length,
};

fn full_registry() -> Registry<RoadNetwork> {
    let mut registry = Registry::from_descriptors(basic_checkers()).unwrap();
    registry.register(road_min_length(1.0)).unwrap();
    registry.register(lane_type_none()).unwrap();
    registry
}

#[test]
fn clean_network_completes_every_checker() {
    let network = RoadNetwork::opendrive("1.6")
        .with_road("1", 120.0, &["driving", "sidewalk"])
        .with_road("2", 45.5, &["driving"]);

    let report = Orchestrator::new(full_registry()).run_document(&network).unwrap();

    assert_eq!(report.checkers.len(), 5);
    assert!(report.checkers.iter().all(|c| c.status == CheckerStatus::Completed));
    assert!(report.issues.is_empty());
    assert_eq!(report.schema_version.as_deref(), Some("1.6"));
}

#[test]
fn issues_carry_locations_in_attach_order() {
    let network = RoadNetwork::opendrive("1.6")
        .with_road("1", 120.0, &["driving"])
        .with_road("7", 0.4, &["driving", "none"]);

    let report = Orchestrator::new(full_registry()).run_document(&network).unwrap();

    let short: Vec<_> = report.issues_for(MIN_LENGTH_ID).collect();
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].severity, Severity::Warning);
    assert_eq!(short[0].description, "road 7 is only 0.4 m long");
    assert_eq!(short[0].locations.len(), 2);
    assert!(matches!(&short[0].locations[0], Location::Document { path, .. } if path == "/OpenDRIVE/road[2]"));
    assert!(matches!(short[0].locations[1], Location::Spatial { x, .. } if (x - 120.0).abs() < 1e-9));

    let lanes: Vec<_> = report.issues_for(LANE_TYPE_NONE_ID).collect();
    assert_eq!(lanes.len(), 1);
    assert_eq!(report.status_of(MIN_LENGTH_ID), Some(CheckerStatus::Completed));
    assert_eq!(report.status_of(LANE_TYPE_NONE_ID), Some(CheckerStatus::Completed));

    let ids: HashSet<u64> = report.issues.iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), report.issues.len());
}

#[test]
fn broken_document_skips_domain_rules() {
    let network = RoadNetwork::opendrive("1.6")
        .without_header()
        .with_road("1", 0.1, &["none"]);

    let report = Orchestrator::new(full_registry()).run_document(&network).unwrap();

    assert_eq!(report.status_of(RootTagIsOpenDrive::ID), Some(CheckerStatus::Completed));
    assert_eq!(report.status_of(VersionIsDefined::ID), Some(CheckerStatus::Skipped));
    for id in [MIN_LENGTH_ID, LANE_TYPE_NONE_ID] {
        let checker = report.checker(id).unwrap();
        assert_eq!(checker.status, CheckerStatus::Skipped);
        assert_eq!(checker.summaries, vec![PRECONDITIONS_NOT_SATISFIED.to_string()]);
        assert_eq!(report.issues_for(id).count(), 0);
    }
}

#[test]
fn reporting_checker_blocks_its_dependents() {
    const A_UID: &str = "openmsl.net:xodr:1.4.0:test.a";
    let a = CheckerDescriptor::new("A", "reports one issue", A_UID, |_: &RoadNetwork, sink: &mut IssueSink| {
        sink.raise_issue("A", A_UID, Severity::Information, "just a note")?;
        Ok(())
    });
    let b = passing("B").with_preconditions(["A"]);

    let registry = Registry::from_descriptors([a, b]).unwrap();
    let report = Orchestrator::new(registry).run(&RoadNetwork::opendrive("1.6"), Some("1.6"));

    assert_eq!(report.status_of("A"), Some(CheckerStatus::Completed));
    assert_eq!(report.issues_for("A").count(), 1);
    assert_eq!(report.status_of("B"), Some(CheckerStatus::Skipped));
    assert_eq!(
        report.checker("B").unwrap().summaries,
        vec![PRECONDITIONS_NOT_SATISFIED.to_string()]
    );
}

#[test]
fn future_rule_is_skipped_on_older_schema() {
    let c = passing("C").with_applicable_version(">=2.0.0");
    let registry = Registry::from_descriptors([c]).unwrap();

    let report = Orchestrator::new(registry).run(&RoadNetwork::opendrive("1.9.0"), Some("1.9.0"));

    assert_eq!(report.status_of("C"), Some(CheckerStatus::Skipped));
}

#[test]
fn failing_rule_does_not_change_other_outcomes() {
    let network = RoadNetwork::opendrive("1.6").with_road("1", 0.2, &["driving"]);

    let baseline = Orchestrator::new(full_registry()).run_document(&network).unwrap();

    let mut registry = Registry::from_descriptors([failing("D", "lane section list is empty")]).unwrap();
    for descriptor in basic_checkers() {
        registry.register(descriptor).unwrap();
    }
    registry.register(road_min_length(1.0)).unwrap();
    registry.register(lane_type_none()).unwrap();
    let with_failure = Orchestrator::new(registry).run_document(&network).unwrap();

    let d = with_failure.checker("D").unwrap();
    assert_eq!(d.status, CheckerStatus::Error);
    assert!(d.summaries[0].contains("lane section list is empty"));

    for checker in &baseline.checkers {
        assert_eq!(with_failure.status_of(&checker.id), Some(checker.status), "{}", checker.id);
    }
    assert_eq!(with_failure.issues.len(), baseline.issues.len());
}

#[test]
fn panicking_rule_is_contained() {
    let panics = CheckerDescriptor::new(
        "P",
        "panics",
        "openmsl.net:xodr:1.4.0:test.panics",
        |doc: &RoadNetwork, _: &mut IssueSink| {
            let _ = &doc.roads[99];
            Ok(())
        },
    );
    let registry = Registry::from_descriptors([panics, passing("after")]).unwrap();

    let report = Orchestrator::new(registry).run(&RoadNetwork::opendrive("1.6"), Some("1.6"));

    assert_eq!(report.status_of("P"), Some(CheckerStatus::Error));
    assert!(report.checker("P").unwrap().summaries[0].starts_with("Error: "));
    assert_eq!(report.status_of("after"), Some(CheckerStatus::Completed));
}

#[test]
fn unreadable_document_aborts_the_run() {
    let network = RoadNetwork::opendrive("1.6").unreadable();
    let err = Orchestrator::new(full_registry()).run_document(&network).unwrap_err();
    assert!(matches!(err, QcError::Document(_)));
}

#[test]
fn every_checker_ends_terminal() {
    let network = RoadNetwork::opendrive("1.3").with_road("1", 0.1, &["none"]);
    let mut registry = full_registry();
    registry.register(failing("broken", "boom")).unwrap();
    registry
        .register(passing("bad_expr").with_applicable_version("[1.x, )"))
        .unwrap();
    registry
        .register(passing("needs_broken").with_preconditions(["broken"]))
        .unwrap();

    let report = Orchestrator::new(registry).run_document(&network).unwrap();

    assert_eq!(report.summary().pending, 0);
    assert!(report.checkers.iter().all(|c| c.status != CheckerStatus::Pending));
    assert_eq!(report.status_of("bad_expr"), Some(CheckerStatus::Error));
    assert_eq!(report.status_of("needs_broken"), Some(CheckerStatus::Skipped));
    // Outside the explicit applicable range.
    assert_eq!(report.status_of(MIN_LENGTH_ID), Some(CheckerStatus::Skipped));
    // No applicable range, so the 1.4.0 definition setting applies.
    assert_eq!(report.status_of(LANE_TYPE_NONE_ID), Some(CheckerStatus::Skipped));
}

#[test]
fn disabled_checkers_are_still_reported() {
    let settings = RunSettings {
        disabled: HashSet::from([MIN_LENGTH_ID.to_string()]),
        ..RunSettings::default()
    };
    let network = RoadNetwork::opendrive("1.6").with_road("1", 0.1, &["driving"]);

    let report = Orchestrator::new(full_registry())
        .with_settings(settings)
        .run_document(&network)
        .unwrap();

    assert_eq!(report.status_of(MIN_LENGTH_ID), Some(CheckerStatus::Skipped));
    assert_eq!(report.issues_for(MIN_LENGTH_ID).count(), 0);
}
