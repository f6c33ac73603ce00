//! Signed object URLs.

use serde::{Deserialize, Serialize};

use hls_common::ObjectKey;

/// `<account_url><container>/<key>?<token>`.
///
/// The parts are concatenated as given. No `/` is added after the account
/// URL, so it normally ends with one. A token that already starts with `?`
/// is not given a second one.
///
/// ```
/// use storage::object_url;
///
/// let url = object_url(
///     "https://hlssa.blob.core.windows.net/",
///     "hls",
///     "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif",
///     "sv=2021&sig=abc",
/// );
/// assert_eq!(
///     url,
///     "https://hlssa.blob.core.windows.net/hls/S30/HLS.S30.T12TVM.2019001.v1.4_01.tif?sv=2021&sig=abc"
/// );
/// ```
pub fn object_url(account_url: &str, container: &str, key: &str, token: &str) -> String {
    format!(
        "{}{}/{}?{}",
        account_url,
        container,
        key,
        token.trim_start_matches('?')
    )
}

/// Account and container of an HLS deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub account_url: String,
    pub container: String,
}

impl StorageLocation {
    pub fn new(account_url: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            account_url: account_url.into(),
            container: container.into(),
        }
    }

    pub fn url_for(&self, key: &str, token: &str) -> String {
        object_url(&self.account_url, &self.container, key, token)
    }

    pub fn url_for_key(&self, key: &ObjectKey, token: &str) -> String {
        self.url_for(&key.to_string(), token)
    }
}
