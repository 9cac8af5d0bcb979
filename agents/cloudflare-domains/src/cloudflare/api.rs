//! Typed endpoint calls scoped to one account and zone

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::transport::{ApiReply, CloudflareTransport};
use super::types::{DnsRecordRequest, DnsRecordType, PagesDomainRequest, WorkerDomainRequest};
use crate::config::Credentials;
use crate::error::TransportError;

/// Endpoint shapes for attaching a hostname to a Worker.
///
/// The provider has moved this endpoint between releases, so callers try
/// each shape in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerDomainRoute {
    /// `/workers/services/{service}/environments/{env}/domains`
    EnvironmentScoped,
    /// `/workers/domains`
    AccountScoped,
}

pub const WORKER_DOMAIN_ROUTES: [WorkerDomainRoute; 2] = [
    WorkerDomainRoute::EnvironmentScoped,
    WorkerDomainRoute::AccountScoped,
];

/// Cloudflare endpoints used by this crate
pub struct CloudflareApi<T> {
    transport: T,
    account_id: String,
    zone_id: String,
}

impl<T: CloudflareTransport> CloudflareApi<T> {
    pub fn new(transport: T, credentials: &Credentials) -> Self {
        Self {
            transport,
            account_id: credentials.account_id.clone(),
            zone_id: credentials.zone_id.clone(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub async fn get_zone(&self) -> Result<ApiReply, TransportError> {
        self.get(&format!("/zones/{}", self.zone_id)).await
    }

    /// List zone records, optionally narrowed to one (type, name) key
    pub async fn list_dns_records(
        &self,
        filter: Option<(DnsRecordType, &str)>,
    ) -> Result<ApiReply, TransportError> {
        let path = match filter {
            Some((record_type, name)) => format!(
                "/zones/{}/dns_records?type={}&name={}",
                self.zone_id,
                record_type,
                urlencoding::encode(name)
            ),
            None => format!("/zones/{}/dns_records?per_page=1000", self.zone_id),
        };
        self.get(&path).await
    }

    pub async fn create_dns_record(
        &self,
        request: &DnsRecordRequest,
    ) -> Result<ApiReply, TransportError> {
        let path = format!("/zones/{}/dns_records", self.zone_id);
        self.send_json(Method::POST, &path, request).await
    }

    pub async fn update_dns_record(
        &self,
        record_id: &str,
        request: &DnsRecordRequest,
    ) -> Result<ApiReply, TransportError> {
        let path = format!("/zones/{}/dns_records/{}", self.zone_id, record_id);
        self.send_json(Method::PUT, &path, request).await
    }

    pub async fn list_ssl_verification(&self) -> Result<ApiReply, TransportError> {
        self.get(&format!("/zones/{}/ssl/verification", self.zone_id))
            .await
    }

    pub async fn list_worker_services(&self) -> Result<ApiReply, TransportError> {
        self.get(&format!("/accounts/{}/workers/services", self.account_id))
            .await
    }

    pub async fn list_worker_domains(
        &self,
        hostname: Option<&str>,
    ) -> Result<ApiReply, TransportError> {
        let mut path = format!("/accounts/{}/workers/domains", self.account_id);
        if let Some(hostname) = hostname {
            path.push_str(&format!("?hostname={}", urlencoding::encode(hostname)));
        }
        self.get(&path).await
    }

    pub async fn create_worker_domain(
        &self,
        route: WorkerDomainRoute,
        request: &WorkerDomainRequest,
    ) -> Result<ApiReply, TransportError> {
        let path = match route {
            WorkerDomainRoute::EnvironmentScoped => format!(
                "/accounts/{}/workers/services/{}/environments/{}/domains",
                self.account_id, request.service, request.environment
            ),
            WorkerDomainRoute::AccountScoped => {
                format!("/accounts/{}/workers/domains", self.account_id)
            }
        };
        self.send_json(Method::POST, &path, request).await
    }

    pub async fn list_pages_projects(&self) -> Result<ApiReply, TransportError> {
        self.get(&format!("/accounts/{}/pages/projects", self.account_id))
            .await
    }

    pub async fn list_pages_domains(&self, project: &str) -> Result<ApiReply, TransportError> {
        self.get(&format!(
            "/accounts/{}/pages/projects/{}/domains",
            self.account_id, project
        ))
        .await
    }

    pub async fn create_pages_domain(
        &self,
        project: &str,
        request: &PagesDomainRequest,
    ) -> Result<ApiReply, TransportError> {
        let path = format!(
            "/accounts/{}/pages/projects/{}/domains",
            self.account_id, project
        );
        self.send_json(Method::POST, &path, request).await
    }

    async fn get(&self, path: &str) -> Result<ApiReply, TransportError> {
        self.transport.send(Method::GET, path, None).await
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<ApiReply, TransportError> {
        let body: Value =
            serde_json::to_value(body).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.transport.send(method, path, Some(body)).await
    }
}
