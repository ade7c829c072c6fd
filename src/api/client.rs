use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{ApiError, Result};
use super::models::{
    filename_from_disposition, AuthStatus, BatchDeleteResult, Credentials, FavoriteState,
    FileBlob, Health, HistoryPage, HistoryQuery, Stats,
};
use super::HistoryApi;

/// reqwest-backed client. The cookie store carries the server session
/// cookie set by `/api/login`.
pub struct HttpHistoryClient {
    client: Client,
    base_url: Url,
}

impl HttpHistoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        decode_json(check_status(resp).await?).await
    }
}

/// Parse the base URL and make sure relative joins append rather than replace.
fn normalize_base(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!(%status, %body, "Server returned an error");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl HistoryApi for HttpHistoryClient {
    async fn health(&self) -> Result<Health> {
        self.get_json("health").await
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        self.get_json("api/check-auth").await
    }

    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: Credentials) -> Result<()> {
        let url = self.endpoint("api/login")?;
        debug!(%url, "POST");
        let resp = self.client.post(url).json(&credentials).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let url = self.endpoint("api/logout")?;
        let resp = self.client.post(url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_history(&self, query: HistoryQuery) -> Result<HistoryPage> {
        let url = self.endpoint("api/history")?;
        let pairs = query.to_query_pairs();
        debug!(%url, ?pairs, "GET");
        let resp = self.client.get(url).query(&pairs).send().await?;
        decode_json(check_status(resp).await?).await
    }

    async fn toggle_favorite(&self, id: i64) -> Result<FavoriteState> {
        let url = self.endpoint(&format!("api/history/{id}/favorite"))?;
        let resp = self.client.post(url).send().await?;
        decode_json(check_status(resp).await?).await
    }

    async fn delete_record(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("api/history/{id}"))?;
        let resp = self.client.delete(url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn batch_delete(&self, ids: Vec<i64>) -> Result<BatchDeleteResult> {
        let url = self.endpoint("api/history/batch-delete")?;
        let resp = self.client.post(url).json(&ids).send().await?;
        let resp = check_status(resp).await?;
        // The count is informational; an unexpected body still means success.
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn fetch_file(&self, id: i64) -> Result<FileBlob> {
        let url = self.endpoint(&format!("api/file/{id}"))?;
        let resp = check_status(self.client.get(url).send().await?).await?;
        let filename = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);
        let bytes = resp.bytes().await?.to_vec();
        debug!(len = bytes.len(), ?filename, "file fetched");
        Ok(FileBlob { bytes, filename })
    }

    async fn stats(&self) -> Result<Stats> {
        self.get_json("api/stats").await
    }
}
