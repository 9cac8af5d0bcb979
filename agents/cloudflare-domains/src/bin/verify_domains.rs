//! Verify Domains
//!
//! Read-only report of the site's DNS records, custom-domain bindings,
//! certificate status and endpoint reachability.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use cloudflare_domains::cli::{CredentialArgs, LogArgs, SiteArgs};
use cloudflare_domains::verify::probe_endpoints;
use cloudflare_domains::{CloudflareApi, CloudflareClient, SiteConfig, Verifier};

#[derive(Parser, Debug)]
#[command(name = "verify-domains", version)]
#[command(about = "Verify Cloudflare DNS and custom domain configuration", long_about = None)]
struct Cli {
    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    log: LogArgs,

    /// Skip the HTTP probes of the public endpoints
    #[arg(long)]
    skip_probes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.log.init()?;

    let credentials = cli.credentials.resolve_or_exit();
    let site = SiteConfig::from(cli.site);

    let client = CloudflareClient::new(credentials.api_token.clone())?;
    let verifier = Verifier::new(CloudflareApi::new(client, &credentials), site.clone());

    println!("{}", "=".repeat(60));
    println!("🔍 Cloudflare Configuration Verification");
    println!("{}", "=".repeat(60));
    println!("Account ID: {}", credentials.account_id);
    println!("Zone ID:    {}", credentials.zone_id);
    println!("Domain:     {}", site.domain);
    println!("API Domain: {}", site.api_subdomain);

    let mut sections = verifier.run_all().await;

    if cli.skip_probes {
        info!("Skipping endpoint probes");
    } else {
        match probe_endpoints(&site).await {
            Ok(section) => sections.push(section),
            Err(e) => warn!(error = %e, "Endpoint probes unavailable"),
        }
    }

    for section in &sections {
        print!("{}", section);
    }

    let failing = sections.iter().filter(|s| s.has_failures()).count();
    info!(sections = sections.len(), failing, "Verification complete");

    println!("\n{}", "=".repeat(60));
    println!("✅ Verification complete!");
    println!("{}", "=".repeat(60));
    print!("{}", verifier.dashboard_links());

    Ok(())
}
