//! Check Zone
//!
//! Prints the zone's name and status and the account's Worker services.
//! Useful for confirming the worker service id before configuring domains.

use anyhow::Result;
use clap::Parser;

use cloudflare_domains::cli::{CredentialArgs, LogArgs, SiteArgs};
use cloudflare_domains::{CloudflareApi, CloudflareClient, SiteConfig, Verifier};

#[derive(Parser, Debug)]
#[command(name = "check-zone", version)]
#[command(about = "Show zone status and Worker services", long_about = None)]
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

    let client = CloudflareClient::new(credentials.api_token.clone())?;
    let verifier = Verifier::new(
        CloudflareApi::new(client, &credentials),
        SiteConfig::from(cli.site),
    );

    print!("{}", verifier.inspect_zone().await);
    print!("{}", verifier.inspect_worker_services().await);

    Ok(())
}
