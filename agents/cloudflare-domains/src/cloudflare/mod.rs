//! Cloudflare v4 REST API access
//!
//! `CloudflareTransport` is the seam: `CloudflareClient` speaks HTTP,
//! `CloudflareApi` builds the account- and zone-scoped endpoint calls on
//! top of any transport.

mod api;
mod client;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{CloudflareApi, WorkerDomainRoute, WORKER_DOMAIN_ROUTES};
pub use client::{CloudflareClient, CLOUDFLARE_API_BASE};
pub use transport::{ApiReply, CloudflareTransport, ReplyBody};
pub use types::{
    ApiMessage, DnsRecord, DnsRecordRequest, DnsRecordType, PagesDomain, PagesDomainRequest,
    PagesProject, SslVerification, WorkerDomain, WorkerDomainRequest, WorkerEnvironment,
    WorkerService, Zone,
};
