//! Read-only verification of the site's Cloudflare configuration
//!
//! Every check renders as a [`CheckSection`] of status lines. Nothing here
//! issues a mutating request.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cloudflare::{
    ApiReply, CloudflareApi, CloudflareTransport, DnsRecord, DnsRecordType, PagesDomain,
    SslVerification, WorkerDomain, WorkerService, Zone,
};
use crate::config::SiteConfig;
use crate::dashboard;
use crate::error::TransportError;

/// Timeout for each endpoint probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pages error codes that usually mean the project does not exist
const PAGES_PROJECT_MISSING_CODES: [i64; 2] = [10000, 8000007];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    /// Waiting on the provider, e.g. certificate issuance
    Pending,
    /// Detail line under a check
    Info,
}

impl CheckStatus {
    fn marker(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅",
            CheckStatus::Warn => "⚠️ ",
            CheckStatus::Fail => "❌",
            CheckStatus::Pending => "⏳",
            CheckStatus::Info => "  ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLine {
    pub status: CheckStatus,
    pub message: String,
}

/// A titled group of check results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSection {
    pub title: String,
    pub lines: Vec<CheckLine>,
}

impl CheckSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, status: CheckStatus, message: impl Into<String>) {
        self.lines.push(CheckLine {
            status,
            message: message.into(),
        });
    }

    pub fn pass(&mut self, message: impl Into<String>) {
        self.push(CheckStatus::Pass, message)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(CheckStatus::Warn, message)
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.push(CheckStatus::Fail, message)
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(CheckStatus::Info, message)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.lines.iter().filter(|l| l.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(CheckStatus::Fail) > 0
    }
}

impl fmt::Display for CheckSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", self.title)?;
        writeln!(f, "{}", "-".repeat(60))?;
        for line in &self.lines {
            writeln!(f, "{} {}", line.status.marker(), line.message)?;
        }
        Ok(())
    }
}

/// Runs the read-only checks for one site
pub struct Verifier<T> {
    api: CloudflareApi<T>,
    site: SiteConfig,
}

impl<T: CloudflareTransport> Verifier<T> {
    pub fn new(api: CloudflareApi<T>, site: SiteConfig) -> Self {
        Self { api, site }
    }

    pub fn api(&self) -> &CloudflareApi<T> {
        &self.api
    }

    /// DNS, Workers domain, Pages domain and SSL checks, in that order
    pub async fn run_all(&self) -> Vec<CheckSection> {
        vec![
            self.check_dns_records().await,
            self.check_worker_domain().await,
            self.check_pages_domain().await,
            self.check_ssl().await,
        ]
    }

    pub async fn check_dns_records(&self) -> CheckSection {
        let mut section = CheckSection::new("📋 Checking DNS Records...");

        let records: Vec<DnsRecord> =
            match fetch(self.api.list_dns_records(None).await) {
                Ok(records) => records,
                Err(reason) => {
                    section.fail(format!("Failed to fetch DNS records: {}", reason));
                    return section;
                }
            };

        check_cname(&mut section, &records, &self.site.domain, ".pages.dev", "Pages");
        check_cname(
            &mut section,
            &records,
            &self.site.api_subdomain,
            ".workers.dev",
            "Workers",
        );

        section
    }

    pub async fn check_worker_domain(&self) -> CheckSection {
        let mut section = CheckSection::new("🔧 Checking Workers Custom Domain...");
        let hostname = &self.site.api_subdomain;

        let domains: Vec<WorkerDomain> = match fetch(self.api.list_worker_domains(None).await) {
            Ok(domains) => domains,
            Err(reason) => {
                section.fail(format!("Failed to fetch Workers domains: {}", reason));
                return section;
            }
        };

        let Some(domain) = domains
            .iter()
            .find(|d| d.hostname.eq_ignore_ascii_case(hostname))
        else {
            section.fail(format!("Custom domain {} not found for Workers", hostname));
            section.info(format!(
                "Available domains: {}",
                list_or_none(domains.iter().map(|d| d.hostname.as_str()))
            ));
            return section;
        };

        section.pass(format!("Custom domain configured: {}", hostname));
        section.info(format!("Service: {}", domain.service));
        section.info(format!("Environment: {}", domain.environment));
        section.info(format!(
            "Zone ID: {}",
            domain.zone_id.as_deref().unwrap_or("unknown")
        ));

        if self.site.is_site_worker(&domain.service) {
            section.pass("Service name matches expected worker");
        } else {
            section.warn(format!(
                "Service name '{}' doesn't match expected '{}'",
                domain.service, self.site.worker_service
            ));
        }

        section
    }

    pub async fn check_pages_domain(&self) -> CheckSection {
        let mut section = CheckSection::new("🌐 Checking Pages Custom Domain...");
        let project = &self.site.pages_project;

        let reply = match self.api.list_pages_domains(project).await {
            Ok(reply) => reply,
            Err(e) => {
                section.fail(format!("Failed to fetch Pages domains: {}", e));
                return section;
            }
        };

        if !reply.is_success() {
            section.fail(format!("Failed to fetch Pages domains: {}", reply.reason()));
            if PAGES_PROJECT_MISSING_CODES
                .iter()
                .any(|code| reply.has_error_code(*code))
            {
                section.warn(format!("Pages project '{}' may not exist", project));
            }
            return section;
        }

        let domains: Vec<PagesDomain> = match reply.result() {
            Ok(domains) => domains,
            Err(e) => {
                section.fail(format!("Failed to fetch Pages domains: {}", e));
                return section;
            }
        };

        let Some(domain) = domains
            .iter()
            .find(|d| d.hostname().eq_ignore_ascii_case(&self.site.domain))
        else {
            section.fail(format!(
                "Custom domain {} not found for Pages project",
                self.site.domain
            ));
            section.info(format!(
                "Available domains: {}",
                list_or_none(domains.iter().map(|d| d.hostname()))
            ));
            return section;
        };

        let status = domain.status.as_deref().unwrap_or("unknown");
        section.pass(format!("Custom domain configured: {}", domain.hostname()));
        section.info(format!("Status: {}", status));

        match status {
            "active" => section.pass("Domain is active and ready"),
            "pending" => section.push(
                CheckStatus::Pending,
                "Domain is pending (SSL certificate provisioning)",
            ),
            other => section.warn(format!("Domain status: {}", other)),
        }

        section
    }

    pub async fn check_ssl(&self) -> CheckSection {
        let mut section = CheckSection::new("🔒 Checking SSL/TLS Status...");

        let entries: Vec<SslVerification> =
            match fetch(self.api.list_ssl_verification().await) {
                Ok(entries) => entries,
                Err(reason) => {
                    section.warn(format!("Could not fetch SSL verification status: {}", reason));
                    return section;
                }
            };

        let site_entries: Vec<&SslVerification> = entries
            .iter()
            .filter(|e| within_domain(&e.hostname, &self.site.domain))
            .collect();

        if site_entries.is_empty() {
            section.info(format!(
                "No certificate verification entries for {}",
                self.site.domain
            ));
        }

        for entry in site_entries {
            let status = entry.certificate_status.as_deref().unwrap_or("unknown");
            section.info(format!("{}: {}", entry.hostname, status));
            if status == "active" {
                section.pass("SSL certificate is active");
            } else {
                section.warn(format!("SSL status: {}", status));
            }
        }

        section
    }

    /// Zone name and activation status
    pub async fn inspect_zone(&self) -> CheckSection {
        let mut section = CheckSection::new("🗺️  Zone");

        let reply = match self.api.get_zone().await {
            Ok(reply) => reply,
            Err(e) => {
                section.fail(format!("Zone check failed: {}", e));
                return section;
            }
        };
        if !reply.is_success() {
            section.fail(format!("Zone check failed: {}", reply.reason()));
            return section;
        }

        match reply.result_object::<Zone>() {
            Ok(zone) => section.pass(format!(
                "Zone: {} (Status: {})",
                zone.name,
                zone.status.as_deref().unwrap_or("unknown")
            )),
            Err(e) => section.fail(format!("Zone check failed: {}", e)),
        }

        section
    }

    /// Every Worker service on the account with its default script
    pub async fn inspect_worker_services(&self) -> CheckSection {
        let mut section = CheckSection::new("⚙️  Workers Services");

        let services: Vec<WorkerService> = match fetch(self.api.list_worker_services().await) {
            Ok(services) => services,
            Err(reason) => {
                section.fail(format!("Workers check failed: {}", reason));
                return section;
            }
        };

        for service in &services {
            let script = service
                .default_environment
                .as_ref()
                .and_then(|env| env.script_name.as_deref())
                .unwrap_or("none");
            section.info(format!("- {} (default_environment: {})", service.id, script));
        }

        if services.iter().any(|s| self.site.is_site_worker(&s.id)) {
            section.pass(format!("Found service for {}", self.site.worker_service));
        } else {
            section.warn(format!(
                "No service matching '{}' on this account",
                self.site.worker_service
            ));
        }

        section
    }

    /// Dashboard pages for manual inspection
    pub fn dashboard_links(&self) -> CheckSection {
        let account_id = self.api.account_id();
        let mut section = CheckSection::new("📊 Dashboard Links:");
        section.info(format!(
            "Workers: {}",
            dashboard::worker_service(account_id, &self.site.worker_service)
        ));
        section.info(format!(
            "Pages:   {}",
            dashboard::pages_project(account_id, &self.site.pages_project)
        ));
        section.info(format!("DNS:     {}", dashboard::dns_records(account_id)));
        section
    }
}

fn check_cname(
    section: &mut CheckSection,
    records: &[DnsRecord],
    name: &str,
    target_suffix: &str,
    target_label: &str,
) {
    let Some(record) = records
        .iter()
        .find(|r| r.record_type == DnsRecordType::CNAME && r.name.eq_ignore_ascii_case(name))
    else {
        section.fail(format!("{} CNAME not found", name));
        return;
    };

    section.pass(format!("{} CNAME: {}", name, record.content));
    section.info(format!("Proxied: {}", record.proxied));

    if record.content.trim_end_matches('.').ends_with(target_suffix) {
        section.pass(format!("Points to {}", target_label));
    } else {
        section.warn(format!(
            "Should point to {} ({})",
            target_label, target_suffix
        ));
    }
}

fn fetch<R>(reply: Result<ApiReply, TransportError>) -> Result<R, String>
where
    R: DeserializeOwned + Default,
{
    let reply = reply.map_err(|e| e.to_string())?;
    if !reply.is_success() {
        return Err(reply.reason());
    }
    reply.result().map_err(|e| e.to_string())
}

/// `hostname` is `domain` itself or one of its subdomains
fn within_domain(hostname: &str, domain: &str) -> bool {
    let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    hostname == domain || hostname.ends_with(&format!(".{}", domain))
}

fn list_or_none<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// `(label, url)` pairs probed for a site
pub fn probe_targets(site: &SiteConfig) -> Vec<(String, String)> {
    vec![
        (site.domain.clone(), format!("https://{}", site.domain)),
        (
            format!("{}/health", site.api_subdomain),
            format!("https://{}/health", site.api_subdomain),
        ),
    ]
}

/// HTTP reachability of the site's public endpoints.
///
/// Certificate validation is off: certificates may still be provisioning
/// when this runs.
pub async fn probe_endpoints(site: &SiteConfig) -> Result<CheckSection> {
    let client = Client::builder()
        .timeout(PROBE_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .build()
        .context("Failed to create probe client")?;

    Ok(probe(&client, &probe_targets(site)).await)
}

async fn probe(client: &Client, targets: &[(String, String)]) -> CheckSection {
    let mut section = CheckSection::new("🌍 Testing Endpoints...");

    for (label, url) in targets {
        debug!(%url, "Probing endpoint");
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                section.pass(format!("{}: HTTP {}", label, response.status().as_u16()));
            }
            Ok(response) => section.fail(format!("{}: HTTP {}", label, response.status().as_u16())),
            Err(e) => section.fail(format!("{}: {}", label, e)),
        }
    }

    section
}
