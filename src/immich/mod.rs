//! Immich media server integration.
//!
//! - `client` - reqwest-based API client
//! - `types` - request/response payloads

mod client;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::ImmichClient;
pub use types::{AssetUpload, UploadedAsset};

#[derive(Debug, Error)]
pub enum ImmichError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Immich API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("asset id is empty, cannot add it to an album")]
    MissingAssetId,
}

/// The album/asset operations the bridge needs from a media server.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Id of the album called `name`, creating it when missing.
    async fn find_or_create_album(&self, name: &str) -> Result<String, ImmichError>;

    async fn upload_asset(&self, upload: AssetUpload) -> Result<UploadedAsset, ImmichError>;

    async fn add_asset_to_album(&self, album_id: &str, asset_id: &str) -> Result<(), ImmichError>;
}
