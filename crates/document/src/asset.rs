//! Contract for fetching binary assets a document points at.
//!
//! Documents only hold an opaque [`AssetRef`]. Fetching the bytes is network
//! work that belongs to the host application, which supplies an
//! [`AssetFetcher`]. Dropping the returned future cancels the fetch.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque key of a remote asset, such as a pill image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The document has nothing to fetch.
    #[error("document carries no asset reference")]
    NoReference,

    #[error("asset {0} not found")]
    NotFound(AssetRef),

    /// Transport or backend failure, described by the fetcher.
    #[error("failed to fetch asset {asset}: {message}")]
    Fetch { asset: AssetRef, message: String },
}

/// Loads assets on behalf of documents.
///
/// `bypass_cache` asks the fetcher to skip any cache it keeps and go to the
/// source.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_asset(&self, asset: &AssetRef, bypass_cache: bool) -> Result<Asset, AssetError>;
}
