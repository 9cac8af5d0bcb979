//! Configure Domains
//!
//! Ensures the site's DNS records and Workers/Pages custom domains exist.
//! Safe to re-run: resources already in place are reported, not recreated.
//!
//! # Usage
//! ```bash
//! export CLOUDFLARE_API_TOKEN=... CLOUDFLARE_ACCOUNT_ID=... CLOUDFLARE_ZONE_ID=...
//! configure-domains
//! configure-domains --worker-service micropaywall-api-staging -v
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cloudflare_domains::cli::{CredentialArgs, LogArgs, SiteArgs};
use cloudflare_domains::report::outcome_lines;
use cloudflare_domains::{
    CloudflareApi, CloudflareClient, OutcomeTally, Reconciler, SiteConfig,
};

#[derive(Parser, Debug)]
#[command(name = "configure-domains", version)]
#[command(about = "Configure Cloudflare DNS and custom domains for the site", long_about = None)]
struct Cli {
    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.log.init()?;

    let credentials = cli.credentials.resolve_or_exit();
    let site = SiteConfig::from(cli.site);

    let client = CloudflareClient::new(credentials.api_token.clone())?;
    let reconciler = Reconciler::new(CloudflareApi::new(client, &credentials));

    println!("=== Cloudflare Domain Configuration ===");
    println!("Account ID: {}", credentials.account_id);
    println!("Zone ID:    {}", credentials.zone_id);
    println!("Domain:     {}", site.domain);
    println!("API Domain: {}", site.api_subdomain);
    println!();

    info!(domain = %site.domain, api = %site.api_subdomain, "🚀 Configuring domains");

    let plan = site.plan(&credentials.account_id);
    let mut tally = OutcomeTally::default();

    for descriptor in &plan {
        let outcome = reconciler.ensure(descriptor).await;
        for line in outcome_lines(descriptor, &outcome) {
            println!("{}", line);
        }
        tally.record(&outcome);
    }

    info!(
        created = tally.created,
        updated = tally.updated,
        unchanged = tally.already_exists,
        missing = tally.dependency_missing,
        errors = tally.failed,
        "Configuration complete"
    );

    println!();
    println!("=== Configuration complete ===");
    println!("Run verify-domains to check DNS, bindings and certificate status.");

    Ok(())
}
