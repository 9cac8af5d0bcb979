//! Cloudflare dashboard links for manual follow-up

const DASHBOARD_BASE: &str = "https://dash.cloudflare.com";

/// Triggers tab of a Worker service, where custom domains are attached
pub fn worker_triggers(account_id: &str, service: &str) -> String {
    format!("{}/settings/triggers", worker_service(account_id, service))
}

pub fn worker_service(account_id: &str, service: &str) -> String {
    format!(
        "{}/{}/workers/services/view/{}",
        DASHBOARD_BASE, account_id, service
    )
}

/// Custom domains tab of a Pages project
pub fn pages_domains(account_id: &str, project: &str) -> String {
    format!("{}/domains", pages_project(account_id, project))
}

pub fn pages_project(account_id: &str, project: &str) -> String {
    format!("{}/{}/pages/view/{}", DASHBOARD_BASE, account_id, project)
}

pub fn dns_records(account_id: &str) -> String {
    format!("{}/{}/dns/records", DASHBOARD_BASE, account_id)
}
