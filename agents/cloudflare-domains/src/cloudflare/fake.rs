//! In-memory Cloudflare API for tests
//!
//! Keeps just enough state to answer the endpoints this crate calls, and
//! records every request so tests can assert on traffic.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

use super::transport::{ApiReply, CloudflareTransport};
use super::types::{
    DnsRecord, DnsRecordType, PagesDomain, SslVerification, WorkerDomain, Zone,
};
use crate::config::Credentials;
use crate::error::TransportError;

pub(crate) const ACCOUNT_ID: &str = "acct-1";
pub(crate) const ZONE_ID: &str = "zone-1";

pub(crate) fn credentials() -> Credentials {
    Credentials {
        api_token: "test-token".to_string(),
        account_id: ACCOUNT_ID.to_string(),
        zone_id: ZONE_ID.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(ApiReply),
    Transport(TransportError),
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub zone: Option<Zone>,
    pub dns_records: Vec<DnsRecord>,
    pub worker_services: Vec<String>,
    pub worker_domains: Vec<WorkerDomain>,
    pub pages_projects: Vec<String>,
    /// (project, domain)
    pub pages_domains: Vec<(String, PagesDomain)>,
    pub ssl: Vec<SslVerification>,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeCloudflare {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<RecordedCall>>,
    scripted: Mutex<Vec<(String, String, Scripted)>>,
}

impl FakeCloudflare {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, name: &str, status: &str) -> Self {
        self.state().zone = Some(Zone {
            id: ZONE_ID.to_string(),
            name: name.to_string(),
            status: Some(status.to_string()),
        });
        self
    }

    pub fn with_dns_record(
        self,
        record_type: DnsRecordType,
        name: &str,
        content: &str,
        proxied: bool,
    ) -> Self {
        {
            let mut state = self.state();
            let id = state.next_id("rec");
            state.dns_records.push(DnsRecord {
                id,
                name: name.to_string(),
                record_type,
                content: content.to_string(),
                ttl: 1,
                proxied,
            });
        }
        self
    }

    pub fn with_worker_service(self, id: &str) -> Self {
        self.state().worker_services.push(id.to_string());
        self
    }

    pub fn with_worker_domain(self, hostname: &str, service: &str, environment: &str) -> Self {
        {
            let mut state = self.state();
            let id = state.next_id("wd");
            state.worker_domains.push(WorkerDomain {
                id: Some(id),
                hostname: hostname.to_string(),
                service: service.to_string(),
                environment: environment.to_string(),
                zone_id: Some(ZONE_ID.to_string()),
            });
        }
        self
    }

    pub fn with_pages_project(self, name: &str) -> Self {
        self.state().pages_projects.push(name.to_string());
        self
    }

    pub fn with_pages_domain(self, project: &str, domain: &str, status: &str) -> Self {
        self.state().pages_domains.push((
            project.to_string(),
            PagesDomain {
                id: None,
                name: domain.to_string(),
                domain: None,
                status: Some(status.to_string()),
            },
        ));
        self
    }

    pub fn with_ssl(self, hostname: &str, status: &str) -> Self {
        self.state().ssl.push(SslVerification {
            hostname: hostname.to_string(),
            certificate_status: Some(status.to_string()),
        });
        self
    }

    /// Answer every `method path` (query ignored) with a fixed reply.
    pub fn script(self, method: Method, path: &str, reply: ApiReply) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), Scripted::Reply(reply)));
        self
    }

    /// Fail every `method path` (query ignored) at the transport level.
    pub fn script_transport_failure(self, method: Method, path: &str) -> Self {
        let error = TransportError::Request {
            path: path.to_string(),
            message: "connection refused".to_string(),
        };
        self.scripted
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), Scripted::Transport(error)));
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method != Method::GET)
            .collect()
    }

    /// Calls to `method path`, ignoring any query string
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.method == method && split_query(&call.path).0 == path)
            .count()
    }

    fn scripted_for(&self, method: &Method, route: &str) -> Option<Scripted> {
        self.scripted
            .lock()
            .unwrap()
            .iter()
            .find(|(m, p, _)| m == method.as_str() && p == route)
            .map(|(_, _, scripted)| scripted.clone())
    }

    fn route(&self, method: &Method, path: &str, body: Option<&Value>) -> ApiReply {
        let (route, query) = split_query(path);
        let segments: Vec<&str> = route.trim_start_matches('/').split('/').collect();
        let mut state = self.state();

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["zones", _]) => match &state.zone {
                Some(zone) => ok(json!(zone)),
                None => rejected(404, 1001, "Invalid zone identifier"),
            },
            ("GET", ["zones", _, "dns_records"]) => {
                let record_type = query_param(query, "type");
                let name = query_param(query, "name");
                let records: Vec<&DnsRecord> = state
                    .dns_records
                    .iter()
                    .filter(|r| record_type.as_deref().map_or(true, |t| r.record_type.to_string() == t))
                    .filter(|r| name.as_deref().map_or(true, |n| r.name == n))
                    .collect();
                ok(json!(records))
            }
            ("POST", ["zones", _, "dns_records"]) => {
                let body = body.cloned().unwrap_or_default();
                let record_type: DnsRecordType =
                    serde_json::from_value(body["type"].clone()).unwrap_or(DnsRecordType::Other);
                let name = str_field(&body, "name");
                if state
                    .dns_records
                    .iter()
                    .any(|r| r.record_type == record_type && r.name == name)
                {
                    return rejected(400, 81057, "Record already exists.");
                }
                let record = DnsRecord {
                    id: state.next_id("rec"),
                    name,
                    record_type,
                    content: str_field(&body, "content"),
                    ttl: body["ttl"].as_u64().unwrap_or(1) as u32,
                    proxied: body["proxied"].as_bool().unwrap_or(false),
                };
                state.dns_records.push(record.clone());
                ok(json!(record))
            }
            ("PUT", ["zones", _, "dns_records", id]) => {
                let body = body.cloned().unwrap_or_default();
                match state.dns_records.iter_mut().find(|r| r.id == *id) {
                    Some(record) => {
                        record.content = str_field(&body, "content");
                        record.ttl = body["ttl"].as_u64().unwrap_or(1) as u32;
                        record.proxied = body["proxied"].as_bool().unwrap_or(false);
                        ok(json!(record))
                    }
                    None => rejected(404, 81044, "Record does not exist."),
                }
            }
            ("GET", ["zones", _, "ssl", "verification"]) => ok(json!(state.ssl)),
            ("GET", ["accounts", _, "workers", "services"]) => {
                let services: Vec<Value> = state
                    .worker_services
                    .iter()
                    .map(|id| {
                        json!({
                            "id": id,
                            "default_environment": {"environment": "production", "script_name": id}
                        })
                    })
                    .collect();
                ok(json!(services))
            }
            ("GET", ["accounts", _, "workers", "domains"]) => {
                let hostname = query_param(query, "hostname");
                let domains: Vec<&WorkerDomain> = state
                    .worker_domains
                    .iter()
                    .filter(|d| hostname.as_deref().map_or(true, |h| d.hostname == h))
                    .collect();
                ok(json!(domains))
            }
            ("POST", ["accounts", _, "workers", "domains"])
            | ("POST", ["accounts", _, "workers", "services", _, "environments", _, "domains"]) => {
                let body = body.cloned().unwrap_or_default();
                let hostname = str_field(&body, "hostname");
                let service = str_field(&body, "service");
                let environment = str_field(&body, "environment");
                if !state.worker_services.contains(&service) {
                    return rejected(404, 10007, "This Worker does not exist on your account.");
                }
                let position = state.worker_domains.iter().position(|d| d.hostname == hostname);
                match position {
                    Some(index) if state.worker_domains[index].service == service => {
                        rejected(409, 10038, "This hostname is already attached to this Worker.")
                    }
                    Some(index) => {
                        let existing = &mut state.worker_domains[index];
                        existing.service = service;
                        existing.environment = environment;
                        ok(json!(existing))
                    }
                    None => {
                        let domain = WorkerDomain {
                            id: Some(state.next_id("wd")),
                            hostname,
                            service,
                            environment,
                            zone_id: Some(ZONE_ID.to_string()),
                        };
                        state.worker_domains.push(domain.clone());
                        ok(json!(domain))
                    }
                }
            }
            ("GET", ["accounts", _, "pages", "projects"]) => {
                let projects: Vec<Value> = state
                    .pages_projects
                    .iter()
                    .map(|name| json!({"name": name, "subdomain": format!("{}.pages.dev", name)}))
                    .collect();
                ok(json!(projects))
            }
            ("GET", ["accounts", _, "pages", "projects", project, "domains"]) => {
                if !state.pages_projects.iter().any(|p| p == *project) {
                    return rejected(404, 8000007, "Project not found.");
                }
                let domains: Vec<&PagesDomain> = state
                    .pages_domains
                    .iter()
                    .filter(|(p, _)| p == *project)
                    .map(|(_, d)| d)
                    .collect();
                ok(json!(domains))
            }
            ("POST", ["accounts", _, "pages", "projects", project, "domains"]) => {
                let project = project.to_string();
                if !state.pages_projects.contains(&project) {
                    return rejected(404, 8000007, "Project not found.");
                }
                let body = body.cloned().unwrap_or_default();
                let name = str_field(&body, "name");
                if state
                    .pages_domains
                    .iter()
                    .any(|(p, d)| *p == project && d.hostname() == name)
                {
                    return rejected(400, 8000003, "Domain already bound to project.");
                }
                let domain = PagesDomain {
                    id: Some(state.next_id("pd")),
                    name,
                    domain: None,
                    status: Some("pending".to_string()),
                };
                state.pages_domains.push((project, domain.clone()));
                ok(json!(domain))
            }
            _ => rejected(404, 7003, "No route for that URI"),
        }
    }
}

#[async_trait]
impl CloudflareTransport for FakeCloudflare {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiReply, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.clone(),
            path: path.to_string(),
            body: body.clone(),
        });

        let (route, _) = split_query(path);
        match self.scripted_for(&method, route) {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Transport(error)) => Err(error),
            None => Ok(self.route(&method, path, body.as_ref())),
        }
    }
}

pub(crate) fn ok(result: Value) -> ApiReply {
    ApiReply::json(
        200,
        json!({"success": true, "errors": [], "messages": [], "result": result}),
    )
}

pub(crate) fn rejected(status: u16, code: i64, message: &str) -> ApiReply {
    ApiReply::json(
        status,
        json!({
            "success": false,
            "errors": [{"code": code, "message": message}],
            "messages": [],
            "result": null
        }),
    )
}

fn split_query(path: &str) -> (&str, &str) {
    path.split_once('?').unwrap_or((path, ""))
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(|v| v.into_owned())
}

fn str_field(body: &Value, key: &str) -> String {
    body[key].as_str().unwrap_or_default().to_string()
}
