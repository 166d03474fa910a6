//! Checker descriptors: static metadata plus the rule implementation.

use std::collections::BTreeSet;
use std::fmt;

use crate::sink::IssueSink;

/// A rule implementation.
///
/// Implementations read the document and report findings through the sink.
/// Returning `Err` (or panicking) marks the checker as errored; it never
/// affects other checkers in the run.
pub trait Check<D: ?Sized> {
    fn check(&self, document: &D, sink: &mut IssueSink) -> anyhow::Result<()>;
}

impl<D, F> Check<D> for F
where
    D: ?Sized,
    F: Fn(&D, &mut IssueSink) -> anyhow::Result<()>,
{
    fn check(&self, document: &D, sink: &mut IssueSink) -> anyhow::Result<()> {
        self(document, sink)
    }
}

/// A boxed rule implementation for dynamic dispatch
pub type BoxedCheck<D> = Box<dyn Check<D>>;

/// Identity, gating metadata and implementation of one checker.
pub struct CheckerDescriptor<D: ?Sized> {
    id: String,
    description: String,
    rule_uid: String,
    preconditions: BTreeSet<String>,
    applicable_version: String,
    version_required: bool,
    check: BoxedCheck<D>,
}

impl<D: ?Sized> CheckerDescriptor<D> {
    /// Create a descriptor from a closure.
    pub fn new<F>(
        id: impl Into<String>,
        description: impl Into<String>,
        rule_uid: impl Into<String>,
        run: F,
    ) -> Self
    where
        F: Fn(&D, &mut IssueSink) -> anyhow::Result<()> + 'static,
    {
        Self::from_check(id, description, rule_uid, run)
    }

    /// Create a descriptor from any [`Check`] implementation.
    pub fn from_check(
        id: impl Into<String>,
        description: impl Into<String>,
        rule_uid: impl Into<String>,
        check: impl Check<D> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            rule_uid: rule_uid.into(),
            preconditions: BTreeSet::new(),
            applicable_version: String::new(),
            version_required: true,
            check: Box::new(check),
        }
    }

    /// Checkers that must complete without issues before this one runs.
    #[must_use]
    pub fn with_preconditions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preconditions.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Schema versions this checker applies to, e.g. `[1.4.0, )`.
    #[must_use]
    pub fn with_applicable_version(mut self, expr: impl Into<String>) -> Self {
        self.applicable_version = expr.into();
        self
    }

    /// Run regardless of the document's schema version.
    #[must_use]
    pub const fn without_version_check(mut self) -> Self {
        self.version_required = false;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn rule_uid(&self) -> &str {
        &self.rule_uid
    }

    #[must_use]
    pub const fn preconditions(&self) -> &BTreeSet<String> {
        &self.preconditions
    }

    #[must_use]
    pub fn applicable_version(&self) -> &str {
        &self.applicable_version
    }

    #[must_use]
    pub const fn version_required(&self) -> bool {
        self.version_required
    }

    /// Invoke the rule implementation.
    pub fn run(&self, document: &D, sink: &mut IssueSink) -> anyhow::Result<()> {
        self.check.check(document, sink)
    }
}

impl<D: ?Sized> fmt::Debug for CheckerDescriptor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckerDescriptor")
            .field("id", &self.id)
            .field("rule_uid", &self.rule_uid)
            .field("preconditions", &self.preconditions)
            .field("applicable_version", &self.applicable_version)
            .field("version_required", &self.version_required)
            .finish_non_exhaustive()
    }
}
