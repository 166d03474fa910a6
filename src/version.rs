//! Dotted-numeric version parsing and applicability expressions.
//!
//! An applicability expression is one of:
//!
//! - empty, matching every version,
//! - an operator followed by a version: `>=1.4.0`, `>1.4`, `<=1.8.0`, `<1.5`, `==1.6.0`,
//! - an interval with inclusive `[ ]` or exclusive `( )` bounds where either end
//!   may be left open: `[1.4.0, 1.8.0)`, `[1.4.0, )`, `(, 1.6]`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{QcError, Result};

/// A dotted-numeric version such as `1.4.0`.
///
/// Versions compare component by component from the left. When one version is
/// a prefix of the other the longer one is greater, so `2.0 < 2.0.0` and
/// `1.4.0 < 1.4.0.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version string; every component must be a plain decimal number.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QcError::InvalidVersion(input.to_string()));
        }

        let parts = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(QcError::InvalidVersion(input.to_string()));
                }
                part.parse::<u64>()
                    .map_err(|_| QcError::InvalidVersion(input.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { parts })
    }

    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.parts
    }
}

impl FromStr for Version {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// Comparison operator of a single-sided expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
}

impl Op {
    // Two-character operators first so `>=` is not read as `>` followed by `=1.0`.
    const PREFIXES: [(&'static str, Self); 5] = [
        (">=", Self::Ge),
        ("<=", Self::Le),
        ("==", Self::Eq),
        (">", Self::Gt),
        ("<", Self::Lt),
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Eq => "==",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Ge => ordering != Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
            Self::Le => ordering != Ordering::Greater,
            Self::Lt => ordering == Ordering::Less,
            Self::Eq => ordering == Ordering::Equal,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of an interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

/// A parsed applicability expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionExpr {
    /// Empty expression, matches everything.
    Any,
    Compare { op: Op, version: Version },
    Range {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
}

impl VersionExpr {
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Ok(Self::Any);
        }

        if trimmed.starts_with('[') || trimmed.starts_with('(') {
            return parse_interval(expr, trimmed);
        }

        for (prefix, op) in Op::PREFIXES {
            if let Some(rest) = trimmed.strip_prefix(prefix) {
                let version = parse_expr_version(expr, rest)?;
                return Ok(Self::Compare { op, version });
            }
        }

        Err(invalid(
            expr,
            "expected an operator (>=, >, <=, <, ==) or an interval",
        ))
    }

    /// Whether `version` lies inside this expression.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Compare { op, version: target } => op.holds(version.cmp(target)),
            Self::Range { lower, upper } => {
                let above = lower.as_ref().is_none_or(|bound| {
                    if bound.inclusive {
                        version >= &bound.version
                    } else {
                        version > &bound.version
                    }
                });
                let below = upper.as_ref().is_none_or(|bound| {
                    if bound.inclusive {
                        version <= &bound.version
                    } else {
                        version < &bound.version
                    }
                });
                above && below
            }
        }
    }

    /// Whether this expression constrains a minimum version.
    #[must_use]
    pub const fn has_lower_bound(&self) -> bool {
        match self {
            Self::Any => false,
            Self::Compare { op, .. } => matches!(op, Op::Ge | Op::Gt | Op::Eq),
            Self::Range { lower, .. } => lower.is_some(),
        }
    }
}

impl FromStr for VersionExpr {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::Compare { op, version } => write!(f, "{op}{version}"),
            Self::Range { lower, upper } => {
                match lower {
                    Some(bound) if bound.inclusive => write!(f, "[{}, ", bound.version)?,
                    Some(bound) => write!(f, "({}, ", bound.version)?,
                    None => f.write_str("(, ")?,
                }
                match upper {
                    Some(bound) if bound.inclusive => write!(f, "{}]", bound.version),
                    Some(bound) => write!(f, "{})", bound.version),
                    None => f.write_str(")"),
                }
            }
        }
    }
}

fn invalid(expr: &str, reason: impl Into<String>) -> QcError {
    QcError::InvalidVersionExpression {
        expr: expr.to_string(),
        reason: reason.into(),
    }
}

fn parse_expr_version(expr: &str, raw: &str) -> Result<Version> {
    let raw = raw.trim();
    Version::parse(raw).map_err(|_| invalid(expr, format!("'{raw}' is not a valid version")))
}

fn parse_interval(expr: &str, trimmed: &str) -> Result<VersionExpr> {
    let lower_inclusive = trimmed.starts_with('[');
    let upper_inclusive = match trimmed.chars().last() {
        Some(']') if trimmed.len() > 1 => true,
        Some(')') if trimmed.len() > 1 => false,
        _ => return Err(invalid(expr, "interval must end with ']' or ')'")),
    };

    // Both delimiters are single-byte ASCII.
    let inner = &trimmed[1..trimmed.len() - 1];
    let (lo, hi) = inner
        .split_once(',')
        .ok_or_else(|| invalid(expr, "interval must contain exactly one ','"))?;
    if hi.contains(',') {
        return Err(invalid(expr, "interval must contain exactly one ','"));
    }

    let lower = parse_bound(expr, lo, lower_inclusive)?;
    let upper = parse_bound(expr, hi, upper_inclusive)?;

    if let (Some(lower), Some(upper)) = (&lower, &upper) {
        if lower.version > upper.version {
            return Err(invalid(expr, "lower bound is greater than upper bound"));
        }
    }

    Ok(VersionExpr::Range { lower, upper })
}

fn parse_bound(expr: &str, raw: &str, inclusive: bool) -> Result<Option<Bound>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let version = parse_expr_version(expr, raw)?;
    Ok(Some(Bound { version, inclusive }))
}

/// Compare two version strings.
pub fn compare(v1: &str, v2: &str) -> Result<Ordering> {
    Ok(Version::parse(v1)?.cmp(&Version::parse(v2)?))
}

/// Whether `version` satisfies the applicability expression `expr`.
pub fn satisfies(version: &str, expr: &str) -> Result<bool> {
    let expr = VersionExpr::parse(expr)?;
    let version = Version::parse(version)?;
    Ok(expr.matches(&version))
}

/// Whether `expr` constrains a minimum version.
pub fn has_lower_bound(expr: &str) -> Result<bool> {
    Ok(VersionExpr::parse(expr)?.has_lower_bound())
}

#[must_use]
pub fn is_valid_expression(expr: &str) -> bool {
    VersionExpr::parse(expr).is_ok()
}
