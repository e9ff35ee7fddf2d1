//! HTTP client for the Immich API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::types::{
    AddAssetsRequest, AlbumResponse, AssetUpload, CreateAlbumRequest, CreateAlbumResponse,
    UploadedAsset, UserResponse, find_album,
};
use super::{ImmichError, MediaLibrary};
use crate::cache::{CacheConfig, TypedCache};

const API_KEY_HEADER: &str = "x-api-key";
const DEVICE_ID: &str = "TELEGRAM-BOT";

/// Client for one Immich server, authenticated with an API key.
pub struct ImmichClient {
    http: Client,
    base_url: String,
    api_key: String,
    /// Album name → album id.
    album_ids: TypedCache<String, String>,
    /// Serializes find-or-create so a media burst creates one album, not several.
    album_lock: Mutex<()>,
}

impl ImmichClient {
    pub fn new(base_url: &Url, api_key: &str, timeout: Duration) -> Result<Self, ImmichError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            album_ids: TypedCache::new("immich_album_ids", CacheConfig::remote_ids()),
            album_lock: Mutex::new(()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Check the URL and API key. Returns the email of the key's owner.
    pub async fn ping(&self) -> Result<String, ImmichError> {
        let response = self
            .http
            .get(self.endpoint("users/me"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        // A body we cannot read still means the key works.
        let email = response
            .json::<UserResponse>()
            .await
            .map(|user| user.email)
            .unwrap_or_default();
        Ok(email)
    }

    async fn list_albums(&self) -> Result<Vec<AlbumResponse>, ImmichError> {
        let response = self
            .http
            .get(self.endpoint("albums"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn create_album(&self, name: &str) -> Result<String, ImmichError> {
        info!("Creating album '{}'", name);
        let response = self
            .http
            .post(self.endpoint("albums"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&CreateAlbumRequest { album_name: name })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let created: CreateAlbumResponse = response.json().await?;
        Ok(created.id)
    }
}

#[async_trait]
impl MediaLibrary for ImmichClient {
    async fn find_or_create_album(&self, name: &str) -> Result<String, ImmichError> {
        if let Some(id) = self.album_ids.get(&name.to_string()) {
            return Ok(id);
        }

        let _guard = self.album_lock.lock().await;
        if let Some(id) = self.album_ids.get(&name.to_string()) {
            return Ok(id);
        }

        // A failed listing falls through to creation.
        let existing = match self.list_albums().await {
            Ok(albums) => find_album(&albums, name).map(|album| album.id.clone()),
            Err(e) => {
                debug!("Listing albums failed, will try to create '{}': {}", name, e);
                None
            }
        };

        let id = match existing {
            Some(id) => id,
            None => self.create_album(name).await?,
        };

        self.album_ids.insert(name.to_string(), id.clone());
        Ok(id)
    }

    async fn upload_asset(&self, upload: AssetUpload) -> Result<UploadedAsset, ImmichError> {
        let timestamp = upload.created_at.to_rfc3339();
        let part = Part::bytes(upload.bytes).file_name(upload.file_name);

        let form = Form::new()
            .part("assetData", part)
            .text("deviceAssetId", upload.device_asset_id)
            .text("deviceId", DEVICE_ID)
            .text("fileCreatedAt", timestamp.clone())
            .text("fileModifiedAt", timestamp)
            .text("isFavorite", "false");

        let response = self
            .http
            .post(self.endpoint("assets"))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        // Immich may answer a duplicate with an empty body.
        Ok(response
            .json::<UploadedAsset>()
            .await
            .unwrap_or(UploadedAsset {
                id: String::new(),
                duplicate: true,
            }))
    }

    async fn add_asset_to_album(&self, album_id: &str, asset_id: &str) -> Result<(), ImmichError> {
        if asset_id.is_empty() {
            return Err(ImmichError::MissingAssetId);
        }

        let response = self
            .http
            .put(self.endpoint(&format!("albums/{album_id}/assets")))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&AddAssetsRequest { ids: [asset_id] })
            .send()
            .await?;
        ensure_success(response).await?;

        debug!("Asset {} added to album {}", asset_id, album_id);
        Ok(())
    }
}

/// Turn a non-2xx response into [`ImmichError::Api`] carrying the body.
async fn ensure_success(response: Response) -> Result<Response, ImmichError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<body read error>".into());
    Err(ImmichError::Api {
        status: status.as_u16(),
        message,
    })
}
