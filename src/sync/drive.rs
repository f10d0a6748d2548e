//! # Google Drive Transport
//!
//! Blob transport over the Google Drive v3 REST API, using raw HTTP (no
//! SDK). The backup object lives exclusively in the hidden `appDataFolder`
//! space, so this client can never touch the user's own files.
//!
//! Error mapping keeps transport failures actionable without leaking vault
//! state: 401/403 surface as rejected credentials, 429 as rate limiting,
//! anything else as a generic network failure with the status attached.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::transport::{BlobTransport, TokenProvider};
use super::SyncPayload;

const DRIVE_FILES: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD: &str = "https://www.googleapis.com/upload/drive/v3/files";
const MULTIPART_BOUNDARY: &str = "journly-sync-boundary";

/// Name of the backup object in the appDataFolder
pub const BACKUP_OBJECT_NAME: &str = "journly-backup.json";

#[derive(serde::Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(serde::Deserialize)]
struct FileRef {
    id: String,
}

/// Google Drive appDataFolder blob transport
pub struct DriveTransport {
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl DriveTransport {
    /// Create a transport drawing bearer tokens from the given provider
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens,
        }
    }

    fn token(&self) -> Result<String> {
        self.tokens.bearer_token().ok_or_else(|| {
            Error::CredentialsRejected("no backup session; sign in to the backup provider".into())
        })
    }
}

fn require_success(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::CredentialsRejected(
            format!("{}: backup credentials were rejected; sign in again", context),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited(format!(
            "{}: backup provider is throttling requests; try again later",
            context
        ))),
        status => Err(Error::NetworkFailed(format!(
            "{} failed with status {}",
            context, status
        ))),
    }
}

#[async_trait]
impl BlobTransport for DriveTransport {
    async fn find_backup_object(&self) -> Result<Option<String>> {
        let query = format!("name='{}'", BACKUP_OBJECT_NAME);
        let response = self
            .client
            .get(DRIVE_FILES)
            .query(&[
                ("spaces", "appDataFolder"),
                ("q", query.as_str()),
                ("fields", "files(id)"),
            ])
            .bearer_auth(self.token()?)
            .send()
            .await?;

        let response = require_success(response, "backup lookup")?;
        let listing: FileListing = response.json().await?;

        Ok(listing.files.into_iter().next().map(|file| file.id))
    }

    async fn upload(&self, payload: &SyncPayload) -> Result<()> {
        let existing = self.find_backup_object().await?;
        let body = serde_json::to_string(payload)?;

        // New objects need name + parent metadata; updates keep theirs.
        let metadata = match existing {
            Some(_) => "{}".to_string(),
            None => serde_json::json!({
                "name": BACKUP_OBJECT_NAME,
                "parents": ["appDataFolder"],
            })
            .to_string(),
        };

        let multipart = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: application/json\r\n\r\n\
             {body}\r\n\
             --{boundary}--",
            boundary = MULTIPART_BOUNDARY,
            metadata = metadata,
            body = body,
        );

        let request = match existing {
            Some(id) => self
                .client
                .patch(format!("{}/{}?uploadType=multipart", DRIVE_UPLOAD, id)),
            None => self
                .client
                .post(format!("{}?uploadType=multipart", DRIVE_UPLOAD)),
        };

        let response = request
            .bearer_auth(self.token()?)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(multipart)
            .send()
            .await?;

        require_success(response, "backup upload")?;
        Ok(())
    }

    async fn download(&self, object_id: &str) -> Result<SyncPayload> {
        let response = self
            .client
            .get(format!("{}/{}", DRIVE_FILES, object_id))
            .query(&[("alt", "media")])
            .bearer_auth(self.token()?)
            .send()
            .await?;

        let response = require_success(response, "backup download")?;
        Ok(response.json().await?)
    }
}
