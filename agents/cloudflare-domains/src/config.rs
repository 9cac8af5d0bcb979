//! Credentials and site configuration
//!
//! Credentials come from the environment and are never persisted.
//! `SiteConfig` is the single source of the domain names and service
//! identifiers every tool works against.

use std::env;
use std::fmt;

use crate::cloudflare::DnsRecordType;
use crate::error::ConfigError;
use crate::reconcile::{
    DnsRecordSpec, PagesDomainSpec, ResourceDescriptor, WorkerDomainSpec,
};

pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";
pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const ZONE_ID_VAR: &str = "CLOUDFLARE_ZONE_ID";

pub const DEFAULT_DOMAIN: &str = "micropaywall.app";
pub const DEFAULT_API_SUBDOMAIN: &str = "api.micropaywall.app";
pub const DEFAULT_PAGES_PROJECT: &str = "micropaywall";
pub const DEFAULT_WORKER_SERVICE: &str = "micropaywall-api-production";
pub const DEFAULT_WORKER_ENVIRONMENT: &str = "production";

/// TTL written on records the site plan manages.
pub const SITE_RECORD_TTL: u32 = 120;

/// API credentials for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_token: String,
    pub account_id: String,
    pub zone_id: String,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup. Empty values count as
    /// missing. Variables are checked in token, account, zone order.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar(name))
        };

        Ok(Self {
            api_token: require(API_TOKEN_VAR)?,
            account_id: require(ACCOUNT_ID_VAR)?,
            zone_id: require(ZONE_ID_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

/// Names of the property being configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Apex domain served by Pages
    pub domain: String,
    /// API hostname served by the Worker
    pub api_subdomain: String,
    pub pages_project: String,
    pub worker_service: String,
    pub worker_environment: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            api_subdomain: DEFAULT_API_SUBDOMAIN.to_string(),
            pages_project: DEFAULT_PAGES_PROJECT.to_string(),
            worker_service: DEFAULT_WORKER_SERVICE.to_string(),
            worker_environment: DEFAULT_WORKER_ENVIRONMENT.to_string(),
        }
    }
}

impl SiteConfig {
    /// `<project>.pages.dev`
    pub fn pages_target(&self) -> String {
        format!("{}.pages.dev", self.pages_project)
    }

    /// `<service>.<account>.workers.dev`
    pub fn worker_target(&self, account_id: &str) -> String {
        format!("{}.{}.workers.dev", self.worker_service, account_id)
    }

    /// True when a bound service name refers to this site's worker.
    ///
    /// Deployed services may carry an environment suffix, so either name
    /// containing the other counts.
    pub fn is_site_worker(&self, service: &str) -> bool {
        !service.is_empty()
            && (service.contains(&self.worker_service) || self.worker_service.contains(service))
    }

    /// Resources to reconcile, in the order they are applied.
    ///
    /// The API CNAME is a fallback route to workers.dev; the Worker custom
    /// domain binding takes over once attached.
    pub fn plan(&self, account_id: &str) -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor::DnsRecord(
                DnsRecordSpec::new(DnsRecordType::CNAME, &self.domain, self.pages_target())
                    .ttl(SITE_RECORD_TTL)
                    .proxied(true),
            ),
            ResourceDescriptor::DnsRecord(
                DnsRecordSpec::new(
                    DnsRecordType::CNAME,
                    &self.api_subdomain,
                    self.worker_target(account_id),
                )
                .ttl(SITE_RECORD_TTL)
                .proxied(true),
            ),
            ResourceDescriptor::WorkerDomain(WorkerDomainSpec::new(
                &self.api_subdomain,
                &self.worker_service,
                &self.worker_environment,
            )),
            ResourceDescriptor::PagesDomain(PagesDomainSpec::new(
                &self.pages_project,
                &self.domain,
            )),
        ]
    }
}
