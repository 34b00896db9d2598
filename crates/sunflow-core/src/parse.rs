// ── Tab-delimited feed parser ──
//
// Turns the text-endpoint payload (`name\tvalue[\tunit]` lines) into a
// Snapshot. Malformed lines are skipped, not errors: a partially
// garbled feed still yields whatever parsed cleanly.

use tracing::trace;

use crate::model::{Reading, Snapshot};
use crate::normalize::{coerce_value, normalize_key};

/// Parse a raw multi-line feed into a Snapshot.
///
/// Per line: trim, skip if blank, split on tabs, discard empty
/// fragments, require name + value (unit optional). Lines with fewer
/// than two fragments are silently dropped. Empty or fully-malformed
/// input produces an empty Snapshot, never an error. No synthetic
/// readings are added in this mode.
pub fn parse_text_feed(raw: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            trace!(line, "skipping line without name and value");
            continue;
        }

        let name = parts[0].trim();
        let value = coerce_value(parts[1].trim());
        let unit = parts
            .get(2)
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_owned);

        snapshot.insert(Reading {
            id: normalize_key(name),
            display_name: name.to_owned(),
            value,
            unit,
        });
    }

    snapshot
}
