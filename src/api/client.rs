use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDate;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;

use super::types::*;
use super::ScheduleBackend;
use crate::config::Config;

/// Failure of a single store request. `NotFound` is recognized separately so
/// the controller can refetch instead of retrying a stale mutation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("store credentials are not configured")]
    Unconfigured,
    #[error("entity not found on the store")]
    NotFound,
    #[error("store request failed: {status} - {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// HTTP client for the scheduling store.
pub struct ScheduleClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl ScheduleClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let token = config.api_token.as_ref().ok_or(ApiError::Unconfigured)?;

        let auth_string = format!("{}:{}", config.email, token);
        let auth_header = format!("Basic {}", STANDARD.encode(auth_string));

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            auth_header,
        })
    }

    async fn check<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::check(response).await
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        Self::check(response).await
    }

    async fn put<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        Self::check(response).await
    }

    async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .delete(&url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ScheduleBackend for ScheduleClient {
    async fn list_entries(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
        member_ids: Option<&[String]>,
    ) -> Result<Vec<ScheduleEntry>, ApiError> {
        let mut endpoint = format!(
            "/entries?windowStart={}&windowEnd={}",
            window_start.format("%Y-%m-%d"),
            window_end.format("%Y-%m-%d")
        );
        if let Some(ids) = member_ids {
            endpoint.push_str(&format!("&memberIds={}", ids.join(",")));
        }
        let response: EntryListResponse = self.get(&endpoint).await?;
        Ok(response.entries)
    }

    async fn create_entry(&self, draft: &CreateEntryRequest) -> Result<ScheduleEntry, ApiError> {
        self.post("/entries", draft).await
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        patch: &EntryPatch,
    ) -> Result<ScheduleEntry, ApiError> {
        let endpoint = format!("/entries/{}", entry_id);
        self.put(&endpoint, patch).await
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/entries/{}", entry_id);
        self.delete(&endpoint).await
    }

    async fn list_roster(&self) -> Result<Vec<TeamMember>, ApiError> {
        let response: RosterResponse = self.get("/team/members").await?;
        Ok(response.members)
    }

    async fn list_time_off_requests(
        &self,
        status: Option<TimeOffStatus>,
    ) -> Result<Vec<TimeOffRequest>, ApiError> {
        let endpoint = match status {
            Some(TimeOffStatus::Pending) => "/time-off?status=pending",
            Some(TimeOffStatus::Approved) => "/time-off?status=approved",
            Some(TimeOffStatus::Rejected) => "/time-off?status=rejected",
            None => "/time-off",
        };
        let response: TimeOffListResponse = self.get(endpoint).await?;
        Ok(response.requests)
    }

    async fn submit_time_off(
        &self,
        draft: &SubmitTimeOffRequest,
    ) -> Result<TimeOffRequest, ApiError> {
        self.post("/time-off", draft).await
    }

    async fn decide_time_off(
        &self,
        request_id: &str,
        decision: TimeOffDecision,
    ) -> Result<TimeOffRequest, ApiError> {
        let endpoint = format!("/time-off/{}/decision", request_id);
        let body = serde_json::json!({ "decision": decision });
        self.post(&endpoint, &body).await
    }

    async fn get_sync_status(&self) -> Result<SyncStatus, ApiError> {
        self.get("/sync/status").await
    }

    async fn fetch_source_events(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<SourceEvent>, ApiError> {
        let endpoint = format!(
            "/sync/events?windowStart={}&windowEnd={}",
            window_start.format("%Y-%m-%d"),
            window_end.format("%Y-%m-%d")
        );
        let response: SourceEventListResponse = self.get(&endpoint).await?;
        Ok(response.events)
    }
}
