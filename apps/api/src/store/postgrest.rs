//! REST store client. Talks to the hosted database through its PostgREST
//! surface (`<SUPABASE_URL>/rest/v1/<table>`), authenticating every request
//! with the project key.
//!
//! No retries: a failed round-trip surfaces as a `StoreError` and the caller
//! decides what the phone call hears.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::{JobFilter, JobStore, StoreError, WorkerStore};
use crate::models::{Job, JobStatus, NewJob, Worker};

const REST_PATH: &str = "rest/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const WORKER_COLUMNS: &str = "phone_number,skill,location,language";
const JOB_COLUMNS: &str = "id,job_type,location,workers_needed,contact_number,status,created_at";

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(project_url: &str, api_key: String) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/{}", project_url.trim_end_matches('/'), REST_PATH),
            api_key,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Sends the request and decodes a JSON body, mapping non-2xx replies to
    /// `StoreError::Api` with the server's message when it sent one.
    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, StoreError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Ok(response.json().await?)
    }
}

fn api_error(status: StatusCode, body: String) -> StoreError {
    let message = serde_json::from_str::<PostgrestError>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

/// PostgREST `ilike` filter value matching `term` anywhere in the column.
/// The value is double-quoted so commas and parentheses stay literal; LIKE
/// wildcards and backslashes from free text are dropped.
fn ilike_contains(term: &str) -> String {
    let literal: String = term
        .chars()
        .filter(|c| !matches!(c, '*' | '%' | '_' | '\\'))
        .collect();
    let quoted = literal.trim().replace('"', "\\\"");
    format!("ilike.\"*{quoted}*\"")
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

// Request builders, one per store operation. Kept apart from sending so the
// wire format can be checked without a server.
impl PostgrestStore {
    fn find_worker_request(&self, phone: &str) -> RequestBuilder {
        self.request(Method::GET, "workers").query(&[
            ("select", WORKER_COLUMNS.to_string()),
            ("phone_number", eq(phone)),
            ("limit", "1".to_string()),
        ])
    }

    fn insert_worker_request(&self, worker: &Worker) -> RequestBuilder {
        self.request(Method::POST, "workers")
            .header("Prefer", "return=minimal")
            .json(worker)
    }

    fn delete_worker_request(&self, phone: &str) -> RequestBuilder {
        self.request(Method::DELETE, "workers")
            .header("Prefer", "return=representation")
            .query(&[("select", WORKER_COLUMNS.to_string()), ("phone_number", eq(phone))])
    }

    fn insert_job_request(&self, job: &NewJob) -> RequestBuilder {
        self.request(Method::POST, "jobs")
            .header("Prefer", "return=representation")
            .query(&[("select", JOB_COLUMNS)])
            .json(&[job])
    }

    fn search_jobs_request(&self, filter: &JobFilter) -> RequestBuilder {
        self.request(Method::GET, "jobs").query(&[
            ("select", JOB_COLUMNS.to_string()),
            ("job_type", ilike_contains(&filter.job_type_contains)),
            ("location", ilike_contains(&filter.location_contains)),
            ("status", eq(filter.status.as_str())),
            ("order", "id.asc".to_string()),
        ])
    }

    fn list_open_jobs_request(&self) -> RequestBuilder {
        self.request(Method::GET, "jobs").query(&[
            ("select", JOB_COLUMNS.to_string()),
            ("status", eq(JobStatus::Open.as_str())),
            ("order", "id.asc".to_string()),
        ])
    }
}

#[async_trait]
impl WorkerStore for PostgrestStore {
    async fn find_worker(&self, phone: &str) -> Result<Option<Worker>, StoreError> {
        let rows: Vec<Worker> = Self::send_json(self.find_worker_request(phone)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError> {
        let response = self.insert_worker_request(worker).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }
        debug!("Inserted worker row for {}", worker.phone_number);
        Ok(())
    }

    async fn delete_worker(&self, phone: &str) -> Result<u64, StoreError> {
        let removed: Vec<Worker> = Self::send_json(self.delete_worker_request(phone)).await?;
        Ok(removed.len() as u64)
    }
}

#[async_trait]
impl JobStore for PostgrestStore {
    async fn insert_job(&self, job: &NewJob) -> Result<Job, StoreError> {
        let rows: Vec<Job> = Self::send_json(self.insert_job_request(job)).await?;
        rows.into_iter().next().ok_or(StoreError::MissingRow("jobs"))
    }

    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        Self::send_json(self.search_jobs_request(filter)).await
    }

    async fn list_open_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Self::send_json(self.list_open_jobs_request()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PostgrestStore {
        PostgrestStore::new("https://example.supabase.co", "anon-key".to_string()).unwrap()
    }

    fn query(request: &reqwest::Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn param(request: &reqwest::Request, name: &str) -> Option<String> {
        query(request).into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    fn header<'a>(request: &'a reqwest::Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn json_body(request: &reqwest::Request) -> serde_json::Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).expect("buffered body");
        serde_json::from_slice(bytes).expect("json body")
    }

    fn worker() -> Worker {
        Worker {
            phone_number: "+919800000001".to_string(),
            skill: "Plumber".to_string(),
            location: "Pune".to_string(),
            language: "en-US".to_string(),
        }
    }

    #[test]
    fn test_ilike_contains_wraps_term() {
        assert_eq!(ilike_contains("Plumber"), r#"ilike."*Plumber*""#);
    }

    #[test]
    fn test_ilike_contains_strips_wildcards() {
        assert_eq!(ilike_contains("Pl*um%ber_"), r#"ilike."*Plumber*""#);
        assert_eq!(ilike_contains(r"back\slash"), r#"ilike."*backslash*""#);
    }

    #[test]
    fn test_ilike_contains_keeps_commas_and_parentheses() {
        assert_eq!(
            ilike_contains("Pune, Maharashtra"),
            r#"ilike."*Pune, Maharashtra*""#
        );
        assert_eq!(ilike_contains("Nagpur (East)"), r#"ilike."*Nagpur (East)*""#);
    }

    #[test]
    fn test_ilike_contains_escapes_quotes() {
        assert_eq!(ilike_contains(r#"6" pipe"#), r#"ilike."*6\" pipe*""#);
    }

    #[test]
    fn test_every_request_carries_key_headers() {
        let store = store();
        let requests = [
            store.find_worker_request("+919800000001"),
            store.insert_worker_request(&worker()),
            store.delete_worker_request("+919800000001"),
            store.list_open_jobs_request(),
        ];
        for builder in requests {
            let request = builder.build().unwrap();
            assert_eq!(header(&request, "apikey"), Some("anon-key"));
            assert_eq!(header(&request, "authorization"), Some("Bearer anon-key"));
        }
    }

    #[test]
    fn test_find_worker_request() {
        let request = store().find_worker_request("+919800000001").build().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/workers");
        assert_eq!(
            query(&request),
            vec![
                ("select".to_string(), WORKER_COLUMNS.to_string()),
                ("phone_number".to_string(), "eq.+919800000001".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_insert_worker_request_asks_for_no_body() {
        let request = store().insert_worker_request(&worker()).build().unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().path(), "/rest/v1/workers");
        assert_eq!(header(&request, "prefer"), Some("return=minimal"));

        let body = json_body(&request);
        assert_eq!(body["phone_number"], "+919800000001");
        assert_eq!(body["language"], "en-US");
    }

    #[test]
    fn test_delete_worker_request_returns_removed_rows() {
        let request = store().delete_worker_request("+919800000001").build().unwrap();
        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(request.url().path(), "/rest/v1/workers");
        assert_eq!(header(&request, "prefer"), Some("return=representation"));
        assert_eq!(
            param(&request, "phone_number").as_deref(),
            Some("eq.+919800000001")
        );
    }

    #[test]
    fn test_insert_job_request_returns_created_row() {
        let job = NewJob {
            job_type: "Painter".to_string(),
            location: "Nagpur".to_string(),
            workers_needed: 2,
            contact_number: "9876543210".to_string(),
            status: "open".to_string(),
        };
        let request = store().insert_job_request(&job).build().unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().path(), "/rest/v1/jobs");
        assert_eq!(header(&request, "prefer"), Some("return=representation"));
        assert_eq!(param(&request, "select").as_deref(), Some(JOB_COLUMNS));

        let body = json_body(&request);
        assert_eq!(body[0]["job_type"], "Painter");
        assert_eq!(body[0]["status"], "open");
    }

    #[test]
    fn test_search_jobs_request_filters_open_rows_oldest_first() {
        let filter = JobFilter::open("Plumber", "Pune, Maharashtra");
        let request = store().search_jobs_request(&filter).build().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/jobs");
        assert_eq!(
            param(&request, "job_type").as_deref(),
            Some(r#"ilike."*Plumber*""#)
        );
        assert_eq!(
            param(&request, "location").as_deref(),
            Some(r#"ilike."*Pune, Maharashtra*""#)
        );
        assert_eq!(param(&request, "status").as_deref(), Some("eq.open"));
        assert_eq!(param(&request, "order").as_deref(), Some("id.asc"));
    }

    #[test]
    fn test_list_open_jobs_request() {
        let request = store().list_open_jobs_request().build().unwrap();
        assert_eq!(request.url().path(), "/rest/v1/jobs");
        assert_eq!(param(&request, "status").as_deref(), Some("eq.open"));
        assert_eq!(param(&request, "order").as_deref(), Some("id.asc"));
        assert_eq!(param(&request, "select").as_deref(), Some(JOB_COLUMNS));
    }

    #[test]
    fn test_api_error_prefers_server_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":"23502","message":"null value in column"}"#.to_string(),
        );
        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "null value in column");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_base_url_normalises_trailing_slash() {
        let store = PostgrestStore::new("https://example.supabase.co/", "key".to_string()).unwrap();
        assert_eq!(store.base_url, "https://example.supabase.co/rest/v1");
    }
}
