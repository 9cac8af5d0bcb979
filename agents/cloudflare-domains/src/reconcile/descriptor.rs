//! Desired-state descriptors for the resources the reconciler manages

use std::fmt;

use crate::cloudflare::{DnsRecord, DnsRecordRequest, DnsRecordType};
use crate::error::DescriptorError;

/// TTL value Cloudflare treats as "automatic"
pub const AUTO_TTL: u32 = 1;

/// A resource to bring into its desired state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceDescriptor {
    DnsRecord(DnsRecordSpec),
    WorkerDomain(WorkerDomainSpec),
    PagesDomain(PagesDomainSpec),
}

impl ResourceDescriptor {
    /// Check the identity key before any request is made
    pub fn validate(&self) -> Result<(), DescriptorError> {
        match self {
            ResourceDescriptor::DnsRecord(spec) => {
                if spec.record_type == DnsRecordType::Other {
                    return Err(DescriptorError::UnmanagedType(spec.record_type.to_string()));
                }
                require("name", &spec.name)?;
                require("content", &spec.content)?;
                if spec.ttl != AUTO_TTL && !(30..=86_400).contains(&spec.ttl) {
                    return Err(DescriptorError::InvalidTtl(spec.ttl));
                }
                Ok(())
            }
            ResourceDescriptor::WorkerDomain(spec) => {
                require("hostname", &spec.hostname)?;
                require("service", &spec.service)?;
                require("environment", &spec.environment)
            }
            ResourceDescriptor::PagesDomain(spec) => {
                require("project", &spec.project)?;
                require("domain", &spec.domain)
            }
        }
    }

    /// Short label used as the prefix of status lines
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceDescriptor::DnsRecord(_) => "DNS",
            ResourceDescriptor::WorkerDomain(_) => "Workers",
            ResourceDescriptor::PagesDomain(_) => "Pages",
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceDescriptor::DnsRecord(spec) => {
                write!(f, "{} {} -> {}", spec.record_type, spec.name, spec.content)
            }
            ResourceDescriptor::WorkerDomain(spec) => write!(
                f,
                "custom domain {} -> {} ({})",
                spec.hostname, spec.service, spec.environment
            ),
            ResourceDescriptor::PagesDomain(spec) => {
                write!(f, "custom domain {} -> project {}", spec.domain, spec.project)
            }
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), DescriptorError> {
    if value.trim().is_empty() {
        Err(DescriptorError::EmptyField(field))
    } else {
        Ok(())
    }
}

/// Desired DNS record. Identity key is (type, name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordSpec {
    pub record_type: DnsRecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl DnsRecordSpec {
    /// New record with automatic TTL, not proxied
    pub fn new(
        record_type: DnsRecordType,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: AUTO_TTL,
            proxied: false,
        }
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Whether an existing record already has the desired state.
    ///
    /// Proxied records always report an automatic TTL, so TTL only counts
    /// for DNS-only records.
    pub fn matches(&self, record: &DnsRecord) -> bool {
        let content_matches = normalize_content(&record.content) == normalize_content(&self.content);
        let ttl_matches = self.proxied || record.ttl == self.ttl;
        content_matches && record.proxied == self.proxied && ttl_matches
    }

    pub fn to_request(&self) -> DnsRecordRequest {
        DnsRecordRequest {
            record_type: self.record_type,
            name: self.name.clone(),
            content: self.content.clone(),
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }
}

fn normalize_content(content: &str) -> String {
    content.trim().trim_end_matches('.').to_lowercase()
}

/// Desired Worker custom domain. Identity key is the hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerDomainSpec {
    pub hostname: String,
    /// Service id, or a fragment of one
    pub service: String,
    pub environment: String,
}

impl WorkerDomainSpec {
    pub fn new(
        hostname: impl Into<String>,
        service: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            service: service.into(),
            environment: environment.into(),
        }
    }
}

/// Desired Pages custom domain. Identity key is (project, domain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesDomainSpec {
    pub project: String,
    pub domain: String,
}

impl PagesDomainSpec {
    pub fn new(project: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            domain: domain.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, ttl: u32, proxied: bool) -> DnsRecord {
        DnsRecord {
            id: "rec-1".to_string(),
            name: "micropaywall.app".to_string(),
            record_type: DnsRecordType::CNAME,
            content: content.to_string(),
            ttl,
            proxied,
        }
    }

    #[test]
    fn test_proxied_match_ignores_ttl_and_trailing_dot() {
        let spec = DnsRecordSpec::new(DnsRecordType::CNAME, "micropaywall.app", "micropaywall.pages.dev")
            .ttl(120)
            .proxied(true);

        assert!(spec.matches(&record("Micropaywall.pages.dev.", 1, true)));
        assert!(!spec.matches(&record("micropaywall.pages.dev", 1, false)));
        assert!(!spec.matches(&record("other.pages.dev", 1, true)));
    }

    #[test]
    fn test_dns_only_match_compares_ttl() {
        let spec = DnsRecordSpec::new(DnsRecordType::CNAME, "micropaywall.app", "micropaywall.pages.dev")
            .ttl(300);

        assert!(spec.matches(&record("micropaywall.pages.dev", 300, false)));
        assert!(!spec.matches(&record("micropaywall.pages.dev", 120, false)));
    }

    #[test]
    fn test_validation_rejects_empty_identity() {
        let dns = ResourceDescriptor::DnsRecord(DnsRecordSpec::new(DnsRecordType::A, " ", "1.2.3.4"));
        assert_eq!(dns.validate(), Err(DescriptorError::EmptyField("name")));

        let worker = ResourceDescriptor::WorkerDomain(WorkerDomainSpec::new("api.micropaywall.app", "", "production"));
        assert_eq!(worker.validate(), Err(DescriptorError::EmptyField("service")));

        let pages = ResourceDescriptor::PagesDomain(PagesDomainSpec::new("micropaywall", ""));
        assert_eq!(pages.validate(), Err(DescriptorError::EmptyField("domain")));
    }

    #[test]
    fn test_validation_rejects_out_of_range_ttl() {
        let dns = ResourceDescriptor::DnsRecord(
            DnsRecordSpec::new(DnsRecordType::A, "micropaywall.app", "1.2.3.4").ttl(5),
        );
        assert_eq!(dns.validate(), Err(DescriptorError::InvalidTtl(5)));

        let auto = ResourceDescriptor::DnsRecord(
            DnsRecordSpec::new(DnsRecordType::A, "micropaywall.app", "1.2.3.4"),
        );
        assert!(auto.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_unmanaged_record_type() {
        let dns = ResourceDescriptor::DnsRecord(DnsRecordSpec::new(
            DnsRecordType::Other,
            "x.micropaywall.app",
            "0 5 5060 sip.example.com",
        ));
        assert_eq!(
            dns.validate(),
            Err(DescriptorError::UnmanagedType("OTHER".to_string()))
        );
    }

    #[test]
    fn test_display() {
        let dns = ResourceDescriptor::DnsRecord(DnsRecordSpec::new(
            DnsRecordType::CNAME,
            "micropaywall.app",
            "micropaywall.pages.dev",
        ));
        assert_eq!(dns.to_string(), "CNAME micropaywall.app -> micropaywall.pages.dev");
        assert_eq!(dns.kind(), "DNS");
    }
}
