//! Reconciliation outcomes

use std::fmt;

/// What one `ensure` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
    /// Already in the desired state, or the provider reported a duplicate
    AlreadyExists,
    /// The parent service or project is absent; nothing was mutated
    DependencyMissing(MissingDependency),
    Failed(Failure),
}

impl ReconcileOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        ReconcileOutcome::Failed(Failure {
            reason: reason.into(),
            fallback_url: None,
        })
    }

    pub fn failed_with_fallback(reason: impl Into<String>, fallback_url: impl Into<String>) -> Self {
        ReconcileOutcome::Failed(Failure {
            reason: reason.into(),
            fallback_url: Some(fallback_url.into()),
        })
    }

    /// True for the outcomes that leave the resource in place
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::Created | ReconcileOutcome::Updated | ReconcileOutcome::AlreadyExists
        )
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Created => write!(f, "created"),
            ReconcileOutcome::Updated => write!(f, "updated"),
            ReconcileOutcome::AlreadyExists => write!(f, "already exists"),
            ReconcileOutcome::DependencyMissing(missing) => {
                write!(f, "{} '{}' not found", missing.kind, missing.name)
            }
            ReconcileOutcome::Failed(failure) => write!(f, "failed: {}", failure.reason),
        }
    }
}

/// Parent resource kinds a binding depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    WorkerService,
    PagesProject,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::WorkerService => write!(f, "Worker service"),
            DependencyKind::PagesProject => write!(f, "Pages project"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub kind: DependencyKind,
    pub name: String,
    /// Identifiers that do exist, for the operator to pick from
    pub available: Vec<String>,
    /// Dashboard page for configuring the binding by hand
    pub fallback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub reason: String,
    pub fallback_url: Option<String>,
}

/// Per-run outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub created: usize,
    pub updated: usize,
    pub already_exists: usize,
    pub dependency_missing: usize,
    pub failed: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Created => self.created += 1,
            ReconcileOutcome::Updated => self.updated += 1,
            ReconcileOutcome::AlreadyExists => self.already_exists += 1,
            ReconcileOutcome::DependencyMissing(_) => self.dependency_missing += 1,
            ReconcileOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ReconcileOutcome>) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            tally.record(outcome);
        }
        tally
    }
}
