// ── Canonical domain model ──

pub mod kind;
pub mod reading;

pub use kind::ReadingKind;
pub use reading::{DEVICE_ONLINE_ID, LAST_UPDATE_ID, Reading, Snapshot, Value};
