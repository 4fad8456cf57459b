//! Image upload service.
//!
//! Treated as an external collaborator: bytes go in, a URL comes out, and
//! the caller's operation never fails because of it. The shipped
//! implementation is the unconfigured stub, which returns a deterministic
//! placeholder URL.

use async_trait::async_trait;
use uuid::Uuid;

/// Stores raw image bytes and returns a URL.
#[async_trait]
pub trait UploadService: Send + Sync {
    /// Stores `bytes` under a folder hint and returns the public URL.
    ///
    /// Never fails: an unconfigured or broken backend returns a
    /// placeholder URL instead.
    async fn store(&self, bytes: &[u8], folder: &str) -> String;
}

/// Upload stub used when no image backend is configured.
pub struct UnconfiguredUploader {
    base_url: String,
}

impl UnconfiguredUploader {
    /// Creates an uploader that mints placeholder URLs under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl UploadService for UnconfiguredUploader {
    async fn store(&self, bytes: &[u8], folder: &str) -> String {
        tracing::debug!(
            size = bytes.len(),
            folder,
            "upload service unconfigured, returning placeholder URL"
        );
        format!(
            "{}/{}/{}.jpg",
            self.base_url.trim_end_matches('/'),
            folder,
            Uuid::new_v4()
        )
    }
}
