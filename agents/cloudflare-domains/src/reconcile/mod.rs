//! Idempotent reconciliation of DNS records and custom-domain bindings

mod descriptor;
mod outcome;
mod reconciler;

pub use descriptor::{DnsRecordSpec, PagesDomainSpec, ResourceDescriptor, WorkerDomainSpec, AUTO_TTL};
pub use outcome::{DependencyKind, Failure, MissingDependency, OutcomeTally, ReconcileOutcome};
pub use reconciler::{
    Reconciler, DUPLICATE_DNS_RECORD, DUPLICATE_PAGES_DOMAIN, DUPLICATE_WORKER_DOMAIN,
};
