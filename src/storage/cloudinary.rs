//! Cloudinary upload API client.
//!
//! Requests are signed with SHA-256 (`signature_algorithm=sha256`); the
//! Cloudinary account must have SHA-256 signatures enabled.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{ObjectStorage, StorageError, StoredObject, UploadObject};
use crate::config::CloudinaryCredentials;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const INCOMING_TRANSFORMATION: &str = "f_auto,q_auto";

pub struct CloudinaryStorage {
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStorage {
    pub fn new(credentials: &CloudinaryCredentials, timeout: Duration) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            cloud_name: credentials.cloud_name.clone(),
            api_key: credentials.api_key.clone(),
            api_secret: credentials.api_secret.clone(),
            http_client,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.cloud_name, action)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// `sha256("k1=v1&k2=v2..." + secret)` over the params sorted by key, hex.
pub(crate) fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload(&self, object: UploadObject) -> Result<StoredObject, StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("folder", object.folder.clone());
        params.insert("overwrite", "true".to_string());
        params.insert("public_id", object.public_id.clone());
        params.insert("timestamp", timestamp);
        params.insert("transformation", INCOMING_TRANSFORMATION.to_string());
        let signature = sign(&params, self.api_secret.expose_secret());

        let mut form = Form::new().part(
            "file",
            Part::bytes(object.bytes).file_name(object.file_name.clone()),
        );
        for (key, value) in params {
            form = form.text(key, value);
        }
        form = form
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::check(response).await?.json().await?;

        tracing::debug!(public_id = %uploaded.public_id, "image uploaded to cloudinary");
        Ok(StoredObject {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", timestamp.clone());
        let signature = sign(&params, self.api_secret.expose_secret());

        let form = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];
        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;
        let destroyed: DestroyResponse = Self::check(response).await?.json().await?;

        // "not found" means there is nothing left to clean up
        if destroyed.result != "ok" && destroyed.result != "not found" {
            return Err(StorageError::Rejected {
                status: 200,
                body: destroyed.result,
            });
        }
        Ok(())
    }
}
