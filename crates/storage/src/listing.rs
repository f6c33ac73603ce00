//! Prefix listing over object storage.

use std::sync::Arc;

use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use hls_common::{HlsError, HlsResult};
use object_store::azure::{AzureConfigKey, MicrosoftAzureBuilder};
use object_store::path::Path;
use object_store::ObjectStore;

use crate::credential::SasToken;

/// Lists object names under a string prefix.
///
/// Every call starts a fresh listing. The stream is lazy and finite, and
/// yields only names that start with `prefix` byte for byte.
pub trait BlobLister: Send + Sync {
    fn list_blobs<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, HlsResult<String>>;
}

impl<T: BlobLister + ?Sized> BlobLister for Arc<T> {
    fn list_blobs<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, HlsResult<String>> {
        (**self).list_blobs(prefix)
    }
}

/// [`BlobLister`] over any `object_store` backend.
///
/// `object_store` lists whole path segments, so a listing starts just
/// before the prefix and filters by name. Stores that list in
/// lexicographic order (Azure Blob, S3, the in-memory store) can also stop
/// at the first name past the prefix; enable that with
/// [`with_sorted_listing`](Self::with_sorted_listing).
#[derive(Debug, Clone)]
pub struct ObjectStoreLister {
    store: Arc<dyn ObjectStore>,
    sorted: bool,
}

impl ObjectStoreLister {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            sorted: false,
        }
    }

    /// Stop listing at the first name that sorts past the prefix.
    pub fn with_sorted_listing(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Azure Blob container authorised by a SAS token.
    pub fn azure(account: &str, container: &str, token: &SasToken) -> HlsResult<Self> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_container_name(container)
            .with_config(AzureConfigKey::SasKey, token.query())
            .build()
            .map_err(|e| HlsError::Unavailable(format!("Failed to create Azure client: {}", e)))?;

        Ok(Self::new(Arc::new(store)).with_sorted_listing(true))
    }
}

/// Directory part of a key prefix: `S30/HLS.S30.T12TVM.2019001` lists `S30`.
fn list_root(prefix: &str) -> Option<&str> {
    prefix
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}

/// Exclusive listing offset: the prefix minus its last character, which
/// every name starting with the prefix sorts after.
fn list_offset(prefix: &str) -> Option<Path> {
    let mut chars = prefix.chars();
    chars.next_back()?;
    let offset = chars.as_str();
    (!offset.is_empty()).then(|| Path::from(offset))
}

/// Keep names starting with `prefix`. With `sorted`, end the stream at the
/// first name greater than `prefix` that does not start with it.
fn narrow_to_prefix<'a, S>(
    names: S,
    prefix: &'a str,
    sorted: bool,
) -> BoxStream<'a, HlsResult<String>>
where
    S: Stream<Item = HlsResult<String>> + Send + 'a,
{
    let names = if sorted {
        names
            .try_take_while(move |name| {
                future::ready(Ok(name.as_str() <= prefix || name.starts_with(prefix)))
            })
            .boxed()
    } else {
        names.boxed()
    };

    names
        .try_filter(move |name| future::ready(name.starts_with(prefix)))
        .boxed()
}

impl BlobLister for ObjectStoreLister {
    fn list_blobs<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, HlsResult<String>> {
        let root = list_root(prefix).map(Path::from);
        let listing = match list_offset(prefix) {
            Some(offset) => self.store.list_with_offset(root.as_ref(), &offset),
            None => self.store.list(root.as_ref()),
        };

        let names = listing
            .map_err(|e| HlsError::Unavailable(format!("List failed: {}", e)))
            .map_ok(|meta| meta.location.to_string());

        narrow_to_prefix(names, prefix, self.sorted)
    }
}
