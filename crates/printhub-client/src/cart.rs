//! Cart endpoints
//!
//! Upload sends every file as a repeated `files` part plus one `metadata`
//! part holding the JSON array of priced configurations, in the same
//! order. On success the cart is refetched so the caller sees the
//! server-assigned item ids.

use crate::types::{ApiEnvelope, CartItem};
use crate::{ApiClient, ClientError};
use printhub_core::config::PricedConfig;
use reqwest::multipart::{Form, Part};

/// One file payload for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ApiClient {
    pub async fn fetch_cart_items(&self) -> Result<Vec<CartItem>, ClientError> {
        let response = self.http.get(self.url("/cart")).send().await?;
        let envelope: ApiEnvelope<Vec<CartItem>> = Self::check(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Upload files with their print configurations, then return the
    /// refreshed cart.
    pub async fn upload_files(
        &self,
        files: &[UploadFile],
        configs: &[PricedConfig],
    ) -> Result<Vec<CartItem>, ClientError> {
        if files.is_empty() {
            return Err(ClientError::Validation("No files to upload".into()));
        }
        if files.len() != configs.len() {
            return Err(ClientError::Validation(format!(
                "{} files but {} configurations",
                files.len(),
                configs.len()
            )));
        }

        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            form = form.part("files", part);
        }
        form = form.text("metadata", serde_json::to_string(configs)?);

        let response = self.http.post(self.url("/upload")).multipart(form).send().await?;
        Self::check(response).await?;
        tracing::info!(files = files.len(), "uploaded files to cart");

        self.fetch_cart_items().await
    }

    pub async fn remove_cart_item(&self, item_id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/cart/{}", item_id)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEAD_URL: &str = "http://127.0.0.1:9";

    fn upload(name: &str) -> UploadFile {
        UploadFile {
            name: name.into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_empty_upload_rejected_before_any_request() {
        let client = ApiClient::new(DEAD_URL);
        let err = client.upload_files(&[], &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_mismatched_metadata_rejected_before_any_request() {
        let client = ApiClient::new(DEAD_URL);
        let err = client
            .upload_files(&[upload("a.pdf"), upload("b.pdf")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_as_http_error() {
        let client = ApiClient::new(DEAD_URL);
        let err = client.fetch_cart_items().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
