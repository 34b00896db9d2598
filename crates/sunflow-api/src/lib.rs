// sunflow-api: wire-level clients for the Deye cloud API and plain-text feeds.
//
// Two independent fetch surfaces live here:
// - `cloud`: token acquisition (with in-memory caching) and device-data
//   retrieval against the vendor's regional developer API.
// - `text`: a bare GET against a pre-formatted tab-delimited feed.
//
// This crate speaks wire formats only. Normalization into the canonical
// reading model happens in `sunflow-core`.

pub mod cloud;
pub mod error;
pub mod region;
pub mod text;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cloud::models::{DataItem, DeviceData, DeviceLatestResponse, TokenResponse};
pub use cloud::{CloudClient, CloudCredentials};
pub use error::Error;
pub use region::Region;
pub use text::TextClient;
pub use transport::TransportConfig;
