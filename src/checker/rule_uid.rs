//! Structured rule identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QcError, Result};

/// A rule identifier of the form `namespace:domain:definitionSetting:name`,
/// e.g. `openmsl.net:xodr:1.4.0:road.semantic.lane_type.none`.
///
/// The definition setting is the schema version at which the rule became
/// enforceable. It is kept as text here and validated when the rule is gated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleUid {
    pub namespace: String,
    pub domain: String,
    pub definition_setting: String,
    pub name: String,
}

impl RuleUid {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.splitn(4, ':').map(str::trim);
        let mut next = || {
            parts
                .next()
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .ok_or_else(|| QcError::InvalidRuleUid(input.to_string()))
        };

        Ok(Self {
            namespace: next()?,
            domain: next()?,
            definition_setting: next()?,
            name: next()?,
        })
    }
}

impl FromStr for RuleUid {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RuleUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.namespace, self.domain, self.definition_setting, self.name
        )
    }
}
