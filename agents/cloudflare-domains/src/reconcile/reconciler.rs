//! Reconciler
//!
//! Brings one resource to its desired state with a read, then at most one
//! create or update. Every path ends in a [`ReconcileOutcome`]; nothing is
//! retried.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::descriptor::{DnsRecordSpec, PagesDomainSpec, ResourceDescriptor, WorkerDomainSpec};
use super::outcome::{DependencyKind, MissingDependency, ReconcileOutcome};
use crate::cloudflare::{
    ApiReply, CloudflareApi, CloudflareTransport, DnsRecord, PagesDomain, PagesDomainRequest,
    PagesProject, WorkerDomain, WorkerDomainRequest, WorkerService, WORKER_DOMAIN_ROUTES,
};
use crate::dashboard;
use crate::error::TransportError;

/// Provider error code: identical DNS record already exists
pub const DUPLICATE_DNS_RECORD: i64 = 81057;
/// Provider error code: hostname already attached to the Worker
pub const DUPLICATE_WORKER_DOMAIN: i64 = 10038;
/// Provider error code: domain already bound to the Pages project
pub const DUPLICATE_PAGES_DOMAIN: i64 = 8000003;

pub struct Reconciler<T> {
    api: CloudflareApi<T>,
}

impl<T: CloudflareTransport> Reconciler<T> {
    pub fn new(api: CloudflareApi<T>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &CloudflareApi<T> {
        &self.api
    }

    /// Make the remote resource match `descriptor`
    pub async fn ensure(&self, descriptor: &ResourceDescriptor) -> ReconcileOutcome {
        if let Err(e) = descriptor.validate() {
            warn!(resource = %descriptor, error = %e, "Refusing to reconcile invalid descriptor");
            return ReconcileOutcome::failed(e.to_string());
        }

        debug!(resource = %descriptor, "Reconciling");
        let outcome = match descriptor {
            ResourceDescriptor::DnsRecord(spec) => self.ensure_dns_record(spec).await,
            ResourceDescriptor::WorkerDomain(spec) => self.ensure_worker_domain(spec).await,
            ResourceDescriptor::PagesDomain(spec) => self.ensure_pages_domain(spec).await,
        };

        match &outcome {
            ReconcileOutcome::Failed(failure) => {
                warn!(resource = %descriptor, reason = %failure.reason, "Reconciliation failed")
            }
            ReconcileOutcome::DependencyMissing(missing) => warn!(
                resource = %descriptor,
                dependency = %missing.name,
                available = ?missing.available,
                "Dependency not found"
            ),
            _ => info!(resource = %descriptor, outcome = %outcome, "Reconciled"),
        }

        outcome
    }

    /// Reconcile each descriptor in order. A failure never stops later steps.
    pub async fn ensure_all(&self, descriptors: &[ResourceDescriptor]) -> Vec<ReconcileOutcome> {
        let mut outcomes = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            outcomes.push(self.ensure(descriptor).await);
        }
        outcomes
    }

    async fn ensure_dns_record(&self, spec: &DnsRecordSpec) -> ReconcileOutcome {
        let existing: Vec<DnsRecord> = match read_result(
            self.api
                .list_dns_records(Some((spec.record_type, &spec.name)))
                .await,
            "DNS records",
        ) {
            Ok(records) => records,
            Err(outcome) => return outcome,
        };

        let request = spec.to_request();

        match existing.into_iter().next() {
            Some(record) if spec.matches(&record) => {
                debug!(record_id = %record.id, "DNS record unchanged");
                ReconcileOutcome::AlreadyExists
            }
            Some(record) => {
                info!(record_id = %record.id, from = %record.content, to = %spec.content, "Updating DNS record");
                match self.api.update_dns_record(&record.id, &request).await {
                    Ok(reply) if reply.is_success() => ReconcileOutcome::Updated,
                    Ok(reply) => ReconcileOutcome::failed(reply.reason()),
                    Err(e) => ReconcileOutcome::failed(e.to_string()),
                }
            }
            None => {
                info!(name = %spec.name, content = %spec.content, "Creating DNS record");
                match self.api.create_dns_record(&request).await {
                    Ok(reply) if reply.is_success() => ReconcileOutcome::Created,
                    Ok(reply) if reply.has_error_code(DUPLICATE_DNS_RECORD) => {
                        ReconcileOutcome::AlreadyExists
                    }
                    Ok(reply) => ReconcileOutcome::failed(reply.reason()),
                    Err(e) => ReconcileOutcome::failed(e.to_string()),
                }
            }
        }
    }

    async fn ensure_worker_domain(&self, spec: &WorkerDomainSpec) -> ReconcileOutcome {
        let account_id = self.api.account_id();

        let services: Vec<WorkerService> =
            match read_result(self.api.list_worker_services().await, "Workers services") {
                Ok(services) => services,
                Err(outcome) => return outcome,
            };

        let Some(service_id) = resolve_worker_service(&services, &spec.service) else {
            return ReconcileOutcome::DependencyMissing(MissingDependency {
                kind: DependencyKind::WorkerService,
                name: spec.service.clone(),
                available: services.into_iter().map(|s| s.id).collect(),
                fallback_url: dashboard::worker_triggers(account_id, &spec.service),
            });
        };
        info!(service = %service_id, "Found Worker service");

        let rebinding = match self.current_worker_binding(&spec.hostname).await {
            Some(bound) if bound.service == service_id && bound.environment == spec.environment => {
                return ReconcileOutcome::AlreadyExists;
            }
            Some(bound) => {
                info!(current = %bound.service, "Hostname is attached to another Worker; rebinding");
                true
            }
            None => false,
        };

        let request = WorkerDomainRequest {
            hostname: spec.hostname.clone(),
            service: service_id.clone(),
            environment: spec.environment.clone(),
        };
        let fallback = dashboard::worker_triggers(account_id, &service_id);

        self.bind_worker_domain(&request, rebinding, fallback).await
    }

    /// Existing attachment for `hostname`, if it can be read.
    ///
    /// A failed read is not fatal: the bind attempts below are themselves
    /// duplicate-safe.
    async fn current_worker_binding(&self, hostname: &str) -> Option<WorkerDomain> {
        match read_result::<Vec<WorkerDomain>>(
            self.api.list_worker_domains(Some(hostname)).await,
            "Workers domains",
        ) {
            Ok(domains) => domains
                .into_iter()
                .find(|d| d.hostname.eq_ignore_ascii_case(hostname)),
            Err(outcome) => {
                debug!(%outcome, "Could not read current Worker domains");
                None
            }
        }
    }

    /// Try each known endpoint shape in order until one accepts the binding
    /// or reports it as already present.
    async fn bind_worker_domain(
        &self,
        request: &WorkerDomainRequest,
        rebinding: bool,
        fallback: String,
    ) -> ReconcileOutcome {
        let mut last_reason = String::from("no Workers domain endpoint accepted the binding");

        for route in WORKER_DOMAIN_ROUTES {
            match self.api.create_worker_domain(route, request).await {
                Ok(reply) if reply.is_success() => {
                    return if rebinding {
                        ReconcileOutcome::Updated
                    } else {
                        ReconcileOutcome::Created
                    };
                }
                Ok(reply) if reply.has_error_code(DUPLICATE_WORKER_DOMAIN) => {
                    return ReconcileOutcome::AlreadyExists;
                }
                Ok(reply) => {
                    debug!(?route, reason = %reply.reason(), "Workers domain endpoint rejected binding");
                    last_reason = reply.reason();
                }
                Err(e) => {
                    debug!(?route, error = %e, "Workers domain endpoint unreachable");
                    last_reason = e.to_string();
                }
            }
        }

        ReconcileOutcome::failed_with_fallback(last_reason, fallback)
    }

    async fn ensure_pages_domain(&self, spec: &PagesDomainSpec) -> ReconcileOutcome {
        let account_id = self.api.account_id();
        let fallback = dashboard::pages_domains(account_id, &spec.project);

        let projects: Vec<PagesProject> =
            match read_result(self.api.list_pages_projects().await, "Pages projects") {
                Ok(projects) => projects,
                Err(outcome) => return outcome,
            };

        if !projects.iter().any(|p| p.name == spec.project) {
            return ReconcileOutcome::DependencyMissing(MissingDependency {
                kind: DependencyKind::PagesProject,
                name: spec.project.clone(),
                available: projects.into_iter().map(|p| p.name).collect(),
                fallback_url: fallback,
            });
        }

        match read_result::<Vec<PagesDomain>>(
            self.api.list_pages_domains(&spec.project).await,
            "Pages domains",
        ) {
            Ok(domains) if domains.iter().any(|d| d.hostname().eq_ignore_ascii_case(&spec.domain)) => {
                return ReconcileOutcome::AlreadyExists;
            }
            Ok(_) => {}
            Err(outcome) => debug!(%outcome, "Could not read current Pages domains"),
        }

        let request = PagesDomainRequest {
            name: spec.domain.clone(),
        };

        info!(project = %spec.project, domain = %spec.domain, "Adding Pages custom domain");
        match self.api.create_pages_domain(&spec.project, &request).await {
            Ok(reply) if reply.is_success() => ReconcileOutcome::Created,
            Ok(reply) if reply.has_error_code(DUPLICATE_PAGES_DOMAIN) => {
                ReconcileOutcome::AlreadyExists
            }
            Ok(reply) if reply.has_error_message("invalid TLD") => {
                ReconcileOutcome::failed_with_fallback(
                    format!(
                        "domain validation issue; the domain may need to be verified in the dashboard first ({})",
                        reply.reason()
                    ),
                    fallback,
                )
            }
            Ok(reply) => ReconcileOutcome::failed_with_fallback(reply.reason(), fallback),
            Err(e) => ReconcileOutcome::failed_with_fallback(e.to_string(), fallback),
        }
    }
}

/// Exact id first, then the first id containing the requested name
fn resolve_worker_service(services: &[WorkerService], wanted: &str) -> Option<String> {
    services
        .iter()
        .find(|s| s.id == wanted)
        .or_else(|| services.iter().find(|s| s.id.contains(wanted)))
        .map(|s| s.id.clone())
}

/// Decode a successful listing, or turn any failure into `Failed`
fn read_result<R>(
    reply: Result<ApiReply, TransportError>,
    what: &str,
) -> Result<R, ReconcileOutcome>
where
    R: DeserializeOwned + Default,
{
    let reply = reply
        .map_err(|e| ReconcileOutcome::failed(format!("failed to fetch {}: {}", what, e)))?;

    if !reply.is_success() {
        return Err(ReconcileOutcome::failed(format!(
            "failed to fetch {}: {}",
            what,
            reply.reason()
        )));
    }

    reply
        .result()
        .map_err(|e| ReconcileOutcome::failed(format!("failed to fetch {}: {}", what, e)))
}
