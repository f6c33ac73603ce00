//! External collaborators of the HLS tile finder.
//!
//! Provides unified interfaces for:
//! - SAS credentials and the token endpoint that issues them
//! - Loading the tiling system table from a URL or file
//! - Listing object keys by prefix (Azure Blob REST or any `object_store` backend)
//! - Probing for available acquisitions, stepping day by day
//! - Forming object URLs and downloading objects

pub mod azure;
pub mod credential;
pub mod download;
pub mod grid_source;
mod http;
pub mod listing;
pub mod prober;
pub mod url;

pub use azure::AzureBlobLister;
pub use credential::{
    CredentialProvider, PlanetaryComputerTokenProvider, SasToken, StaticTokenProvider,
};
pub use download::download_object;
pub use grid_source::{load_grid, GridSource};
pub use http::{build_client, REQUEST_TIMEOUT};
pub use listing::{BlobLister, ObjectStoreLister};
pub use prober::{Acquisition, AvailabilityProber};
pub use url::{object_url, StorageLocation};
