//! Immich API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: String,
    pub album_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest<'a> {
    pub album_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateAlbumResponse {
    pub id: String,
}

/// Result of `POST /api/assets`.
///
/// `id` may be empty when Immich reports a duplicate without a body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub duplicate: bool,
}

#[derive(Debug, Serialize)]
pub struct AddAssetsRequest<'a> {
    pub ids: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub email: String,
}

/// One asset to upload.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    /// Dedup key Immich uses to detect re-uploads.
    pub device_asset_id: String,
}

/// Find an album by exact name.
pub fn find_album<'a>(albums: &'a [AlbumResponse], name: &str) -> Option<&'a AlbumResponse> {
    albums.iter().find(|album| album.album_name == name)
}
