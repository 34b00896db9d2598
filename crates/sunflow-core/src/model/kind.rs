// ── Reading classification ──
//
// Infers a physical quantity from a reading's unit and name. Display
// layers use this for grouping and labeling; nothing in the polling
// path depends on it.

use serde::Serialize;

/// The physical quantity a reading measures, inferred from unit/name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReadingKind {
    Power,
    Voltage,
    Current,
    Frequency,
    Energy,
    Battery,
    Temperature,
    Generic,
}

impl ReadingKind {
    /// Classify by unit first, falling back to name substrings.
    ///
    /// The unit tables cover what inverter firmwares actually report;
    /// the name fallback catches unitless readings like `GridPower`.
    pub fn classify(display_name: &str, unit: Option<&str>) -> Self {
        let unit = unit.unwrap_or("").trim();
        let lname = display_name.to_lowercase();

        if matches!(unit, "W" | "kW" | "MW") || lname.contains("power") {
            return Self::Power;
        }
        if matches!(unit, "V" | "kV") || lname.contains("voltage") {
            return Self::Voltage;
        }
        if matches!(unit, "A" | "mA") || lname.contains("current") {
            return Self::Current;
        }
        if matches!(unit, "Hz" | "kHz") || lname.contains("frequency") {
            return Self::Frequency;
        }
        if matches!(unit, "Wh" | "kWh" | "MWh")
            || lname.contains("energy")
            || lname.contains("production")
        {
            return Self::Energy;
        }
        if unit == "%" || matches!(lname.as_str(), "soc" | "bmssoc") {
            return Self::Battery;
        }
        if matches!(unit, "°C" | "°F" | "C" | "F") || lname.contains("temp") {
            return Self::Temperature;
        }
        Self::Generic
    }

    /// Whether this quantity accumulates monotonically (lifetime energy
    /// counters) rather than fluctuating as a point measurement.
    pub fn is_cumulative(self) -> bool {
        self == Self::Energy
    }
}
