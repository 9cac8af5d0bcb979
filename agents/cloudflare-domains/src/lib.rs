//! Cloudflare Domains
//!
//! Configures and verifies the DNS records and custom-domain bindings of a
//! site split across a Workers API and a Pages frontend. All writes go
//! through the idempotent [`Reconciler`].

pub mod cli;
pub mod cloudflare;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod verify;

pub use cloudflare::{CloudflareApi, CloudflareClient, CloudflareTransport};
pub use config::{Credentials, SiteConfig};
pub use error::{ConfigError, DescriptorError, TransportError};
pub use reconcile::{OutcomeTally, ReconcileOutcome, Reconciler, ResourceDescriptor};
pub use verify::Verifier;
