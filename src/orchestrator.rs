//! Checker orchestration.
//!
//! For every descriptor, in registration order:
//!
//! 1. register the checker and its rule UID,
//! 2. skip it when disabled by configuration,
//! 3. skip it when a precondition did not complete cleanly,
//! 4. gate it on the document's schema version (invalid expressions are errors),
//! 5. run it inside a fault boundary: a returned error or a panic ends the
//!    checker in `Error` and the run continues with the next checker.
//!
//! Every checker ends in exactly one of `Skipped`, `Completed` or `Error`.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error, info, warn};

use crate::checker::{CheckerDescriptor, Registry, RuleUid};
use crate::config::DEFAULT_BUNDLE_NAME;
use crate::document::Document;
use crate::error::Result;
use crate::report::RunReport;
use crate::sink::{CheckerStatus, IssueSink};
use crate::version::{Version, VersionExpr};

pub const PRECONDITIONS_NOT_SATISFIED: &str = "Preconditions are not satisfied. Skip the check.";
pub const DISABLED_BY_CONFIG: &str = "Checker is disabled by configuration.";
pub const SKIPPED_BY_CHECKER: &str = "The checker skipped itself without giving a reason.";

/// Settings for one orchestration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub bundle_name: String,
    pub bundle_version: String,
    /// Checker ids that are registered but never run.
    pub disabled: HashSet<String>,
    /// Apply schema-version gating to descriptors that request it.
    pub version_gating: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            bundle_name: DEFAULT_BUNDLE_NAME.to_string(),
            bundle_version: env!("CARGO_PKG_VERSION").to_string(),
            disabled: HashSet::new(),
            version_gating: true,
        }
    }
}

/// Outcome of the gating steps for one checker.
enum Gate {
    Run,
    Skip(String),
    Fail(String),
}

/// Drives validation passes over an ordered registry.
pub struct Orchestrator<D: ?Sized> {
    registry: Registry<D>,
    settings: RunSettings,
}

impl<D: ?Sized> Orchestrator<D> {
    #[must_use]
    pub fn new(registry: Registry<D>) -> Self {
        Self {
            registry,
            settings: RunSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry<D> {
        &self.registry
    }

    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run every checker against `document` using an already resolved schema version.
    pub fn run(&self, document: &D, schema_version: Option<&str>) -> RunReport {
        info!(
            checkers = self.registry.len(),
            schema_version = schema_version.unwrap_or("unknown"),
            "Starting checks"
        );

        let mut sink = IssueSink::new();
        for descriptor in self.registry.iter() {
            self.execute(descriptor, document, schema_version, &mut sink);
        }

        let mut report = sink.into_report(schema_version.map(str::to_string));
        report.bundle_name.clone_from(&self.settings.bundle_name);
        report.bundle_version.clone_from(&self.settings.bundle_version);

        let summary = report.summary();
        info!(
            completed = summary.completed,
            skipped = summary.skipped,
            errored = summary.errored,
            issues = summary.total_issues(),
            "Checks done"
        );
        report
    }

    fn execute(
        &self,
        descriptor: &CheckerDescriptor<D>,
        document: &D,
        schema_version: Option<&str>,
        sink: &mut IssueSink,
    ) {
        let id = descriptor.id();
        sink.register_checker(id, descriptor.description());
        let registered = sink.register_rule(id, descriptor.rule_uid());
        debug_assert!(registered.is_ok(), "checker {id} was just registered");

        match self.gate(descriptor, schema_version, sink) {
            Gate::Run => {}
            Gate::Skip(reason) => {
                info!(checker = id, "{reason}");
                finish(sink, id, CheckerStatus::Skipped, reason);
                return;
            }
            Gate::Fail(reason) => {
                warn!(checker = id, "{reason}");
                finish(sink, id, CheckerStatus::Error, reason);
                return;
            }
        }

        debug!(checker = id, "Running checker");
        let activated = sink.activate(id);
        debug_assert!(activated.is_ok(), "checker {id} was just registered");
        let outcome = catch_unwind(AssertUnwindSafe(|| descriptor.run(document, sink)));
        sink.deactivate();

        let fault = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(format!("{err:#}")),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        if let Some(message) = fault {
            error!(checker = id, error = %message, "An error occurred in checker");
            let recorded = sink.record_fault(id, &message);
            debug_assert!(recorded.is_ok(), "checker {id} was just registered");
            return;
        }

        // The rule may have skipped itself.
        match sink.status(id) {
            Some(CheckerStatus::Pending) => {
                let completed = sink.finalize(id, CheckerStatus::Completed);
                debug_assert!(completed.is_ok(), "checker {id} was still pending");
            }
            Some(CheckerStatus::Skipped) if sink.summaries(id).is_empty() => {
                info!(checker = id, "{SKIPPED_BY_CHECKER}");
                let noted = sink.push_summary(id, SKIPPED_BY_CHECKER);
                debug_assert!(noted.is_ok(), "checker {id} was just registered");
            }
            _ => {}
        }
        debug!(
            checker = id,
            issues = sink.issue_count(id),
            status = ?sink.status(id),
            "Checker finished"
        );
    }

    fn gate(
        &self,
        descriptor: &CheckerDescriptor<D>,
        schema_version: Option<&str>,
        sink: &IssueSink,
    ) -> Gate {
        let id = descriptor.id();
        if self.settings.disabled.contains(id) {
            debug!(checker = id, "Checker is disabled");
            return Gate::Skip(DISABLED_BY_CONFIG.to_string());
        }

        for precondition in descriptor.preconditions() {
            if !self.registry.contains(precondition) {
                warn!(
                    checker = descriptor.id(),
                    precondition = precondition.as_str(),
                    "Precondition refers to an unregistered checker"
                );
            }
        }
        let unmet = descriptor
            .preconditions()
            .iter()
            .find(|precondition| !sink.all_preconditions_satisfied([precondition.as_str()]));
        if let Some(precondition) = unmet {
            debug!(
                checker = id,
                precondition = precondition.as_str(),
                status = ?sink.status(precondition),
                issues = sink.issue_count(precondition),
                "Precondition not satisfied"
            );
            return Gate::Skip(PRECONDITIONS_NOT_SATISFIED.to_string());
        }
        debug!(
            checker = id,
            preconditions = descriptor.preconditions().len(),
            "Preconditions satisfied"
        );

        if !(self.settings.version_gating && descriptor.version_required()) {
            debug!(checker = id, "Version gate not applied");
            return Gate::Run;
        }

        let gate = check_version(descriptor, schema_version);
        if matches!(gate, Gate::Run) {
            debug!(
                checker = id,
                schema_version = schema_version.unwrap_or("unknown"),
                applicable_version = descriptor.applicable_version(),
                "Version gate passed"
            );
        }
        gate
    }
}

/// Applicable-version and definition-setting gate.
fn check_version<D: ?Sized>(descriptor: &CheckerDescriptor<D>, schema_version: Option<&str>) -> Gate {
    let applicable_raw = descriptor.applicable_version();
    let Ok(applicable) = VersionExpr::parse(applicable_raw) else {
        return Gate::Fail(format!(
            "The applicable version {applicable_raw} is not valid. Skip the check."
        ));
    };

    let Ok(rule_uid) = RuleUid::parse(descriptor.rule_uid()) else {
        return Gate::Fail(format!(
            "The rule uid {} is not valid. Skip the check.",
            descriptor.rule_uid()
        ));
    };
    let definition_expr = format!(">={}", rule_uid.definition_setting);
    let Ok(definition_setting) = VersionExpr::parse(&definition_expr) else {
        return Gate::Fail(format!(
            "The definition setting {} is not valid. Skip the check.",
            rule_uid.definition_setting
        ));
    };

    let Some(raw_version) = schema_version else {
        return Gate::Skip(
            "The schema version of the document is unknown. Skip the check.".to_string(),
        );
    };
    let Ok(version) = Version::parse(raw_version) else {
        return Gate::Skip(format!(
            "The schema version {raw_version} of the document is not a valid version. Skip the check."
        ));
    };

    if !applicable.matches(&version) {
        return Gate::Skip(format!(
            "Version {raw_version} is not valid according to the applicable version {applicable_raw}. Skip the check."
        ));
    }

    // Without an explicit minimum, a rule never applies to documents older
    // than the version it was defined in.
    if !applicable.has_lower_bound() && !definition_setting.matches(&version) {
        return Gate::Skip(format!(
            "Version {raw_version} is not valid according to definition setting {definition_expr}. Skip the check."
        ));
    }

    Gate::Run
}

impl<D: Document + ?Sized> Orchestrator<D> {
    /// Resolve the document's schema version, then run every checker.
    ///
    /// Only a failure to read the document aborts the run.
    pub fn run_document(&self, document: &D) -> Result<RunReport> {
        let schema_version = document.schema_version()?;
        Ok(self.run(document, schema_version.as_deref()))
    }
}

/// Run `registry` once with default settings.
pub fn run<D: ?Sized>(registry: Registry<D>, document: &D, schema_version: Option<&str>) -> RunReport {
    Orchestrator::new(registry).run(document, schema_version)
}

fn finish(sink: &mut IssueSink, id: &str, status: CheckerStatus, summary: String) {
    let finalized = sink.finalize(id, status);
    debug_assert!(finalized.is_ok(), "checker {id} was gated while pending");
    let noted = sink.push_summary(id, summary);
    debug_assert!(noted.is_ok(), "checker {id} was just registered");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "checker panicked".to_string()
    }
}
