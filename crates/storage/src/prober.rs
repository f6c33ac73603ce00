//! Availability probing: which objects exist for an acquisition, and which
//! is the first acquisition on or after a given day.
//!
//! A probe is one prefix listing. Probes run sequentially and stop at the
//! first error; retrying is left to the caller.

use futures::stream::{BoxStream, TryStreamExt};
use hls_common::{BandSuffix, HlsResult, KeyPrefix, ObjectKey};
use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::listing::BlobLister;

/// Objects found for one acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acquisition {
    pub prefix: KeyPrefix,
    /// Object names in listing order.
    pub keys: Vec<String>,
}

impl Acquisition {
    /// First key carrying the given band.
    pub fn key_for_band(&self, band: &BandSuffix) -> Option<&str> {
        self.keys
            .iter()
            .find(|key| {
                ObjectKey::parse(key)
                    .map(|parsed| parsed.band.as_ref() == Some(band))
                    .unwrap_or(false)
            })
            .map(String::as_str)
    }
}

/// Prefix probing over a [`BlobLister`].
pub struct AvailabilityProber<L> {
    lister: L,
}

impl<L: BlobLister> AvailabilityProber<L> {
    pub fn new(lister: L) -> Self {
        Self { lister }
    }

    pub fn lister(&self) -> &L {
        &self.lister
    }

    /// Lazy stream of every object name starting with `prefix`.
    ///
    /// Each call lists afresh; an empty stream means nothing matched.
    pub fn list_matching<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, HlsResult<String>> {
        counter!("hls_list_requests_total").increment(1);
        debug!(prefix, "Listing prefix");
        self.lister.list_blobs(prefix)
    }

    /// Drain [`list_matching`](Self::list_matching) into a vector.
    pub async fn collect_matching(&self, prefix: &str) -> HlsResult<Vec<String>> {
        self.list_matching(prefix).try_collect().await
    }

    /// Probe `start`'s date, then each following day, until a prefix lists
    /// at least one object.
    ///
    /// At most `max_days` prefixes are probed and the search never leaves
    /// the start year. Returns `None` when every probe came back empty.
    #[instrument(skip(self, start), fields(start = %start))]
    pub async fn find_nearest(
        &self,
        start: &KeyPrefix,
        max_days: u32,
    ) -> HlsResult<Option<Acquisition>> {
        let mut date = Some(start.date);
        let mut probed = 0u32;

        while let Some(day) = date {
            if probed >= max_days {
                break;
            }
            probed += 1;
            counter!("hls_probe_days_total").increment(1);

            let prefix = start.with_date(day);
            let keys = self.collect_matching(&prefix.to_string()).await?;
            if !keys.is_empty() {
                info!(prefix = %prefix, objects = keys.len(), probed, "Found acquisition");
                return Ok(Some(Acquisition { prefix, keys }));
            }

            date = day.next_day();
        }

        info!(probed, "No acquisition found");
        Ok(None)
    }
}
