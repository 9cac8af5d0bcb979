//! Cloudflare API payload types
//!
//! Only the fields the reconciler and verifier read are modelled; unknown
//! fields are ignored on decode.

use serde::{Deserialize, Serialize};

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    #[allow(clippy::upper_case_acronyms)]
    AAAA,
    #[allow(clippy::upper_case_acronyms)]
    CNAME,
    #[allow(clippy::upper_case_acronyms)]
    TXT,
    MX,
    NS,
    /// Any type this crate does not manage (SRV, CAA, ...)
    #[serde(other)]
    Other,
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DnsRecordType::A => write!(f, "A"),
            DnsRecordType::AAAA => write!(f, "AAAA"),
            DnsRecordType::CNAME => write!(f, "CNAME"),
            DnsRecordType::TXT => write!(f, "TXT"),
            DnsRecordType::MX => write!(f, "MX"),
            DnsRecordType::NS => write!(f, "NS"),
            DnsRecordType::Other => write!(f, "OTHER"),
        }
    }
}

/// A DNS record from Cloudflare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub content: String,
    #[serde(default = "auto_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

fn auto_ttl() -> u32 {
    1
}

/// Body for creating or replacing a DNS record
#[derive(Debug, Clone, Serialize)]
pub struct DnsRecordRequest {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

/// A Workers service (script) in the account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerService {
    pub id: String,
    #[serde(default)]
    pub default_environment: Option<WorkerEnvironment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerEnvironment {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub script_name: Option<String>,
}

/// A hostname attached to a Worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDomain {
    #[serde(default)]
    pub id: Option<String>,
    pub hostname: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub zone_id: Option<String>,
}

/// Body for attaching a hostname to a Worker
#[derive(Debug, Clone, Serialize)]
pub struct WorkerDomainRequest {
    pub hostname: String,
    pub service: String,
    pub environment: String,
}

/// A Pages project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesProject {
    pub name: String,
    #[serde(default)]
    pub subdomain: Option<String>,
}

/// A custom domain on a Pages project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesDomain {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Older responses name the hostname `domain`; some carry both keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PagesDomain {
    /// The bound hostname, whichever key it arrived under
    pub fn hostname(&self) -> &str {
        match &self.domain {
            Some(domain) if self.name.is_empty() => domain,
            _ => &self.name,
        }
    }
}

/// Body for adding a custom domain to a Pages project
#[derive(Debug, Clone, Serialize)]
pub struct PagesDomainRequest {
    pub name: String,
}

/// A zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Certificate verification state for one hostname in the zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslVerification {
    pub hostname: String,
    #[serde(alias = "status", default)]
    pub certificate_status: Option<String>,
}

/// One entry of the `errors` array in a Cloudflare response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
