//! HTTP client for the dashboard API.
//!
//! Lists are fetched in full so the caller can search, sort and paginate
//! them locally with [`crate::pipeline::view_pipeline`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    metrics::DashboardMetrics,
    models::{CarWithStatus, ContractDetail, Customer},
    response::ApiResponse,
};

const FETCH_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("response had no data")]
    EmptyBody,

    #[error("not logged in")]
    NotAuthenticated,
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Exchange credentials for a bearer token and keep it for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = decode(response).await?.data.ok_or(ClientError::EmptyBody)?;
        self.token = Some(login.token.clone());
        Ok(login)
    }

    pub async fn list_cars(&self) -> ClientResult<Vec<CarWithStatus>> {
        self.fetch_all("/api/cars").await
    }

    pub async fn list_contracts(&self) -> ClientResult<Vec<ContractDetail>> {
        self.fetch_all("/api/contracts").await
    }

    pub async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        self.fetch_all("/api/customers").await
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardMetrics> {
        self.get::<DashboardMetrics, ()>("/api/dashboard", None)
            .await?
            .data
            .ok_or(ClientError::EmptyBody)
    }

    /// Walk every page of a list endpoint.
    async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let query = [("page", page), ("per_page", FETCH_PAGE_SIZE)];
            let response = self.get::<Vec<T>, _>(path, Some(&query)).await?;
            let total_pages = response
                .meta
                .as_ref()
                .and_then(|meta| meta.total_pages)
                .unwrap_or(1);
            items.extend(response.data.unwrap_or_default());
            if page >= total_pages {
                break;
            }
            page += 1;
        }
        tracing::debug!(path, count = items.len(), "fetched list");
        Ok(items)
    }

    async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> ClientResult<ApiResponse<T>> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token);
        if let Some(query) = query {
            request = request.query(query);
        }
        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<ApiResponse<T>> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ApiResponse<serde_json::Value>>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
        return Err(ClientError::Status { status, message });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn requires_login_before_fetching() {
        let client = ApiClient::new("http://localhost:3000").unwrap();
        let err = client.list_cars().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }
}
