//! Azure Blob "List Blobs" over plain HTTP.
//!
//! Issues `GET <account><container>?restype=container&comp=list&prefix=...`
//! with the SAS token appended, and follows `NextMarker` until the service
//! stops returning one.

use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use hls_common::{HlsError, HlsResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{Client, Url};
use tracing::debug;

use crate::credential::SasToken;
use crate::http::{build_client, redact, status_error, transport_error, REQUEST_TIMEOUT};
use crate::listing::BlobLister;

/// One page of a List Blobs response.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

/// Parse a List Blobs `EnumerationResults` document.
///
/// An empty `<NextMarker/>` means the listing is complete.
pub fn parse_list_response(xml: &str) -> HlsResult<ListPage> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut page = ListPage::default();
    let mut in_blob = false;
    let mut in_name = false;
    let mut in_marker = false;

    let malformed = |e: quick_xml::Error| HlsError::Unavailable(format!("Malformed listing: {}", e));

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"Blob" => in_blob = true,
                b"Name" if in_blob => in_name = true,
                b"NextMarker" => in_marker = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_name => {
                page.names.push(t.unescape().map_err(malformed)?.into_owned());
            }
            Ok(Event::Text(t)) if in_marker => {
                let marker = t.unescape().map_err(malformed)?;
                if !marker.is_empty() {
                    page.next_marker = Some(marker.into_owned());
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"Blob" => in_blob = false,
                b"Name" => in_name = false,
                b"NextMarker" => in_marker = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HlsError::Unavailable(format!(
                    "Malformed listing at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

enum PageState {
    First,
    Next(String),
    Done,
}

/// [`BlobLister`] that talks to the Blob service REST API directly.
pub struct AzureBlobLister {
    client: Client,
    account_url: String,
    container: String,
    token: SasToken,
}

impl AzureBlobLister {
    pub fn new(account_url: &str, container: &str, token: SasToken) -> HlsResult<Self> {
        Self::with_timeout(account_url, container, token, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        account_url: &str,
        container: &str,
        token: SasToken,
        timeout: Duration,
    ) -> HlsResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            account_url: account_url.to_string(),
            container: container.to_string(),
            token,
        })
    }

    fn list_url(&self, prefix: &str, marker: Option<&str>) -> HlsResult<Url> {
        let base = format!("{}{}", self.account_url, self.container);
        let mut url = Url::parse(&base).map_err(|e| HlsError::InvalidArgument {
            param: "storage.account_url".to_string(),
            message: format!("'{}' is not a valid URL: {}", base, e),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("restype", "container")
                .append_pair("comp", "list")
                .append_pair("prefix", prefix);
            if let Some(marker) = marker {
                query.append_pair("marker", marker);
            }
        }

        // The SAS token is already percent-encoded
        let sas = self.token.query();
        if !sas.is_empty() {
            let query = format!("{}&{}", url.query().unwrap_or_default(), sas);
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    async fn fetch_page(&self, prefix: &str, marker: Option<&str>) -> HlsResult<ListPage> {
        let url = self.list_url(prefix, marker)?;
        debug!(url = %redact(url.as_str()), has_marker = marker.is_some(), "Listing blobs");

        let response = self
            .client
            .get(url)
            .header("x-ms-version", "2021-08-06")
            .send()
            .await
            .map_err(|e| transport_error(e, "List request failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "List request rejected"));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, "Failed to read listing"))?;
        parse_list_response(&body)
    }
}

impl BlobLister for AzureBlobLister {
    fn list_blobs<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, HlsResult<String>> {
        stream::try_unfold(PageState::First, move |state| async move {
            let marker = match state {
                PageState::Done => return Ok::<_, HlsError>(None),
                PageState::First => None,
                PageState::Next(marker) => Some(marker),
            };

            let page = self.fetch_page(prefix, marker.as_deref()).await?;
            let next = match page.next_marker {
                Some(marker) => PageState::Next(marker),
                None => PageState::Done,
            };

            // The service already filters by prefix; keep the contract exact
            let names = page
                .names
                .into_iter()
                .filter(move |name| name.starts_with(prefix))
                .map(Ok::<_, HlsError>);
            Ok(Some((stream::iter(names), next)))
        })
        .try_flatten()
        .boxed()
    }
}
