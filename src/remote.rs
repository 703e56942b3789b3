//! HTTP client for the reporting service: report fetch and single-record
//! insert. The caller supplies the bearer token on every call.

use crate::batch::{InsertPayload, Submitter};
use crate::error::{EngineError, EngineResult};
use crate::model::ReportKind;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const INSERT_PATH: &str = "/api/deductions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportQuery {
    #[serde(skip)]
    pub kind: ReportKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ReportQuery {
    pub fn new(kind: ReportKind, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            kind,
            start_date,
            end_date,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.region = Some(region).filter(|r| !r.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: String::new(),
            client,
        })
    }

    /// Token used by the [`Submitter`] impl, which has no token parameter.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Any transport error or non-success status becomes
    /// [`EngineError::Fetch`].
    pub async fn fetch_report(&self, token: &str, query: &ReportQuery) -> EngineResult<Value> {
        if query.end_date < query.start_date {
            return Err(EngineError::validation(
                "end_date",
                format!("{} is before {}", query.end_date, query.start_date),
            ));
        }
        let url = format!("{}{}", self.base_url, query.kind.endpoint());
        tracing::debug!(report = %query.kind, url = %url, "fetching report");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|err| EngineError::fetch(query.kind, format!("request failed: {err}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::fetch(
                query.kind,
                format!("remote error ({status}): {body}"),
            ));
        }
        resp.json()
            .await
            .map_err(|err| EngineError::fetch(query.kind, format!("invalid JSON body: {err}")))
    }

    /// A non-success HTTP status is still returned as a body when it parses,
    /// so the status field decides; otherwise it is a submission error.
    pub async fn insert(&self, token: &str, payload: &InsertPayload) -> EngineResult<Value> {
        let url = format!("{}{}", self.base_url, INSERT_PATH);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                EngineError::submission(&payload.employee_id, format!("request failed: {err}"))
            })?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<Value>(&body) {
            Ok(value) if value.is_object() => Ok(value),
            _ if status.is_success() => Ok(Value::Null),
            _ => Err(EngineError::submission(
                &payload.employee_id,
                format!("remote error ({status}): {body}"),
            )),
        }
    }
}

#[async_trait]
impl Submitter for RemoteClient {
    async fn submit(&self, payload: &InsertPayload) -> EngineResult<Value> {
        self.insert(&self.token, payload).await
    }
}
