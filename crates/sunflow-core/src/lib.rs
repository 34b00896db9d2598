// sunflow-core: canonical data layer between sunflow-api and consumers.
//
// Owns the reading model, both wire-format normalizers, the bounded
// retry controller, and the polling coordinator that ties them together.

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod retry;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_POLL_INTERVAL, FetchSource, PollerConfig};
pub use coordinator::{Coordinator, PollEvent};
pub use error::CoreError;
pub use model::{DEVICE_ONLINE_ID, LAST_UPDATE_ID, Reading, ReadingKind, Snapshot, Value};
pub use retry::{RetryPolicy, run_with_retry};
pub use store::SnapshotStore;
pub use stream::SnapshotStream;

// Re-export the API types consumers need to build a configuration.
pub use sunflow_api::{CloudCredentials, Region};
