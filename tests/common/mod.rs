//! Common test utilities shared across integration tests.
//!
//! Provides an in-memory road network standing in for a parsed OpenDRIVE
//! file, plus a few domain checkers modelled on the real rule set.

#![allow(dead_code)]

use xodr_qc::checker::CheckerDescriptor;
use xodr_qc::checks::basic_preconditions;
use xodr_qc::error::{QcError, Result};
use xodr_qc::{Document, IssueSink, Severity};

pub const MIN_LENGTH_ID: &str = "check_openmsl_xodr_road_min_length";
pub const MIN_LENGTH_UID: &str = "openmsl.net:xodr:1.4.0:road.min_length";
pub const LANE_TYPE_NONE_ID: &str = "check_openmsl_xodr_road_lane_type_none";
pub const LANE_TYPE_NONE_UID: &str = "openmsl.net:xodr:1.4.0:road.semantic.lane_type.none";

#[derive(Debug, Clone)]
pub struct Road {
    pub id: String,
    pub length: f64,
    pub start: (f64, f64),
    pub lane_types: Vec<String>,
}

/// A parsed road network.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    pub root: Option<String>,
    pub headers: usize,
    pub version: Option<String>,
    pub roads: Vec<Road>,
    pub unreadable: bool,
}

impl RoadNetwork {
    pub fn opendrive(version: &str) -> Self {
        Self {
            root: Some("OpenDRIVE".to_string()),
            headers: 1,
            version: Some(version.to_string()),
            roads: Vec::new(),
            unreadable: false,
        }
    }

    pub fn with_road(mut self, id: &str, length: f64, lane_types: &[&str]) -> Self {
        let offset = self.roads.iter().map(|r| r.length).sum::<f64>();
        self.roads.push(Road {
            id: id.to_string(),
            length,
            start: (offset, 0.0),
            lane_types: lane_types.iter().map(|t| (*t).to_string()).collect(),
        });
        self
    }

    pub fn without_header(mut self) -> Self {
        self.headers = 0;
        self.version = None;
        self
    }

    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }
}

impl Document for RoadNetwork {
    fn schema_version(&self) -> Result<Option<String>> {
        if self.unreadable {
            return Err(QcError::Document("cannot read header".to_string()));
        }
        Ok(self.version.clone())
    }

    fn root_tag(&self) -> Option<&str> {
        self.root.as_deref()
    }

    fn child_count(&self, tag: &str) -> usize {
        match tag {
            "header" => self.headers,
            "road" => self.roads.len(),
            _ => 0,
        }
    }
}

/// Roads shorter than `min` metres are reported as warnings.
pub fn road_min_length(min: f64) -> CheckerDescriptor<RoadNetwork> {
    CheckerDescriptor::new(
        MIN_LENGTH_ID,
        "Road length shall be at least the configured minimum",
        MIN_LENGTH_UID,
        move |doc: &RoadNetwork, sink: &mut IssueSink| {
            for (idx, road) in doc.roads.iter().enumerate() {
                if road.length >= min {
                    continue;
                }
                let description = format!("road {} is only {} m long", road.id, road.length);
                let issue =
                    sink.raise_issue(MIN_LENGTH_ID, MIN_LENGTH_UID, Severity::Warning, &description)?;
                sink.attach_document_location(
                    issue,
                    format!("/OpenDRIVE/road[{}]", idx + 1),
                    &description,
                )?;
                sink.attach_spatial_location(issue, road.start.0, road.start.1, 0.0, description)?;
            }
            Ok(())
        },
    )
    .with_preconditions(basic_preconditions())
    .with_applicable_version("[1.4.0, )")
}

/// Lanes of type `none` are reported as warnings.
pub fn lane_type_none() -> CheckerDescriptor<RoadNetwork> {
    CheckerDescriptor::new(
        LANE_TYPE_NONE_ID,
        "Lane Type shall not be None",
        LANE_TYPE_NONE_UID,
        |doc: &RoadNetwork, sink: &mut IssueSink| {
            for (road_idx, road) in doc.roads.iter().enumerate() {
                for (lane_idx, lane_type) in road.lane_types.iter().enumerate() {
                    if lane_type != "none" {
                        continue;
                    }
                    let description = format!("road {} has invalid lanetype none, lane={lane_idx}", road.id);
                    let issue = sink.raise_issue(
                        LANE_TYPE_NONE_ID,
                        LANE_TYPE_NONE_UID,
                        Severity::Warning,
                        &description,
                    )?;
                    sink.attach_document_location(
                        issue,
                        format!("/OpenDRIVE/road[{}]/lanes/lane[{}]", road_idx + 1, lane_idx + 1),
                        description,
                    )?;
                }
            }
            Ok(())
        },
    )
    .with_preconditions(basic_preconditions())
}

/// A checker whose implementation always fails with `message`.
pub fn failing(id: &str, message: &'static str) -> CheckerDescriptor<RoadNetwork> {
    CheckerDescriptor::new(
        id,
        "Always fails",
        "openmsl.net:xodr:1.4.0:test.failing",
        move |_: &RoadNetwork, _: &mut IssueSink| Err(anyhow::anyhow!(message)),
    )
}

/// A checker that reports nothing.
pub fn passing(id: &str) -> CheckerDescriptor<RoadNetwork> {
    CheckerDescriptor::new(
        id,
        "Always passes",
        "openmsl.net:xodr:1.4.0:test.passing",
        |_: &RoadNetwork, _: &mut IssueSink| Ok(()),
    )
}
