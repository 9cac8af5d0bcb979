//! Command-line arguments shared by the binaries

use std::fmt;

use clap::Args;

use crate::config::{
    Credentials, SiteConfig, ACCOUNT_ID_VAR, API_TOKEN_VAR, DEFAULT_API_SUBDOMAIN,
    DEFAULT_DOMAIN, DEFAULT_PAGES_PROJECT, DEFAULT_WORKER_ENVIRONMENT, DEFAULT_WORKER_SERVICE,
    ZONE_ID_VAR,
};
use crate::error::ConfigError;
use crate::logging;

/// Cloudflare credentials, normally supplied through the environment
#[derive(Args, Clone, Default)]
pub struct CredentialArgs {
    /// Cloudflare API token
    #[arg(long, env = API_TOKEN_VAR, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Cloudflare account ID
    #[arg(long, env = ACCOUNT_ID_VAR)]
    pub account_id: Option<String>,

    /// Zone ID of the site's domain
    #[arg(long, env = ZONE_ID_VAR)]
    pub zone_id: Option<String>,
}

impl CredentialArgs {
    /// Validate the supplied values. Empty values count as missing.
    pub fn resolve(&self) -> Result<Credentials, ConfigError> {
        Credentials::from_lookup(|name| match name {
            API_TOKEN_VAR => self.api_token.clone(),
            ACCOUNT_ID_VAR => self.account_id.clone(),
            ZONE_ID_VAR => self.zone_id.clone(),
            _ => None,
        })
    }

    /// Resolve, or print the error and exit with status 1
    pub fn resolve_or_exit(&self) -> Credentials {
        match self.resolve() {
            Ok(credentials) => credentials,
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                std::process::exit(1);
            }
        }
    }
}

impl fmt::Debug for CredentialArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialArgs")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

/// Site overrides. Every flag defaults to the production site.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Apex domain served by Pages
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// API hostname served by the Worker
    #[arg(long, default_value = DEFAULT_API_SUBDOMAIN)]
    pub api_subdomain: String,

    /// Pages project name
    #[arg(long, default_value = DEFAULT_PAGES_PROJECT)]
    pub pages_project: String,

    /// Worker service id (a fragment of the id also matches)
    #[arg(long, default_value = DEFAULT_WORKER_SERVICE)]
    pub worker_service: String,

    /// Worker environment to bind
    #[arg(long, default_value = DEFAULT_WORKER_ENVIRONMENT)]
    pub worker_environment: String,
}

impl From<SiteArgs> for SiteConfig {
    fn from(args: SiteArgs) -> Self {
        Self {
            domain: args.domain,
            api_subdomain: args.api_subdomain,
            pages_project: args.pages_project,
            worker_service: args.worker_service,
            worker_environment: args.worker_environment,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct LogArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl LogArgs {
    pub fn init(&self) -> anyhow::Result<()> {
        logging::init(self.verbose, self.log_json)
    }
}
