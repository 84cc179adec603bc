use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::BillId,
    error::ApiError,
    protocol::{BillPayload, RawBill, UploadedFile},
};
use tracing::{info, warn};

use crate::error::StoreError;

/// Receipt file handed to the store's upload channel.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub email: String,
}

#[async_trait]
pub trait BillStore: Send + Sync {
    async fn list(&self) -> Result<Vec<RawBill>, StoreError>;
    async fn update(&self, id: &BillId, payload: &BillPayload) -> Result<RawBill, StoreError>;
    async fn create(&self, payload: &BillPayload) -> Result<RawBill, StoreError>;
    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedFile, StoreError>;
}

/// [`BillStore`] backed by the store's HTTP API.
pub struct HttpBillStore {
    http: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpBillStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .unwrap_or_else(|_| ApiError::for_status(status.as_u16()))
                .message;
            warn!(status = status.as_u16(), %message, "store: request rejected");
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BillStore for HttpBillStore {
    async fn list(&self) -> Result<Vec<RawBill>, StoreError> {
        let response = self.request(Method::GET, "/bills").send().await?;
        let records: Vec<Value> = Self::read_json(response).await?;
        let received = records.len();
        let bills: Vec<RawBill> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(bill) => Some(bill),
                Err(err) => {
                    warn!(index, error = %err, "store: skipping unreadable bill record");
                    None
                }
            })
            .collect();
        info!(count = bills.len(), received, "store: bills listed");
        Ok(bills)
    }

    async fn update(&self, id: &BillId, payload: &BillPayload) -> Result<RawBill, StoreError> {
        let response = self
            .request(Method::PATCH, &format!("/bills/{id}"))
            .json(payload)
            .send()
            .await?;
        let bill: RawBill = Self::read_json(response).await?;
        info!(bill_id = %bill.id, "store: bill updated");
        Ok(bill)
    }

    async fn create(&self, payload: &BillPayload) -> Result<RawBill, StoreError> {
        let response = self
            .request(Method::POST, "/bills")
            .json(payload)
            .send()
            .await?;
        let bill: RawBill = Self::read_json(response).await?;
        info!(bill_id = %bill.id, "store: bill created");
        Ok(bill)
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedFile, StoreError> {
        let mime_type = upload
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&mime_type)?;
        let form = Form::new().part("file", part).text("email", upload.email);

        let response = self
            .request(Method::POST, "/bills/upload")
            .multipart(form)
            .send()
            .await?;
        let mut uploaded: UploadedFile = Self::read_json(response).await?;
        if uploaded.file_name.is_empty() {
            uploaded.file_name = upload.file_name;
        }
        info!(
            bill_id = %uploaded.key,
            file_name = %uploaded.file_name,
            "store: receipt uploaded"
        );
        Ok(uploaded)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
