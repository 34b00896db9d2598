// ── Key normalization and value coercion ──
//
// Both wire formats funnel through these two functions, so every
// reading in a snapshot obeys the same id and typing rules. Both are
// pure and total: malformed input degrades, it never errors.

use crate::model::Value;

/// Derive a canonical id from a human-readable reading name.
///
/// Trims, lowercases, maps space `/` `-` `(` `)` to `_`, and collapses
/// runs of underscores. Idempotent. Distinct names may collide
/// (`"PV1 Power"` and `"PV1-Power"` both map to `pv1_power`); snapshot
/// insertion is last-write-wins in source order.
pub fn normalize_key(raw: &str) -> String {
    let mut id = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            ' ' | '/' | '-' | '(' | ')' | '_' => {
                if !id.ends_with('_') {
                    id.push('_');
                }
            }
            other => id.extend(other.to_lowercase()),
        }
    }
    id
}

/// Coerce raw text into a typed [`Value`].
///
/// Sentinels (`nan`, `inf`, `-inf`, `null`, case-insensitive) become
/// `Null`. A `.` or exponent marker selects float parsing, otherwise
/// integer. Anything unparseable keeps the original text verbatim.
pub fn coerce_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    if matches!(lower.as_str(), "nan" | "inf" | "-inf" | "null") {
        return Value::Null;
    }

    if trimmed.contains('.') || lower.contains('e') {
        match trimmed.parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Text(raw.to_owned()),
        }
    } else {
        match trimmed.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Text(raw.to_owned()),
        }
    }
}

/// Coerce a JSON value from the cloud API.
///
/// Numbers pass through unchanged (the API is trusted to have typed
/// them); strings go through the same lexical rules as the text feed.
pub fn coerce_json(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        serde_json::Value::String(s) => coerce_value(s),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{coerce_json, coerce_value, normalize_key};
    use crate::model::Value;

    #[test]
    fn normalize_maps_separators_to_underscores() {
        assert_eq!(normalize_key("Grid Power"), "grid_power");
        assert_eq!(normalize_key("PV1/Voltage"), "pv1_voltage");
        assert_eq!(normalize_key("Battery-SOC"), "battery_soc");
        assert_eq!(normalize_key("Temp (Heatsink)"), "temp_heatsink_");
    }

    #[test]
    fn normalize_collapses_runs_and_trims() {
        assert_eq!(normalize_key("  Total - (Daily)  Energy "), "total_daily_energy");
        assert_eq!(normalize_key("a__b___c"), "a_b_c");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Grid Power", "  PV1 / (A) - B ", "already_normal", "Ünïcode Näme"] {
            let once = normalize_key(raw);
            assert_eq!(normalize_key(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_never_emits_double_underscores() {
        for raw in ["a  b", "a _ b", "a-(b)/c", "((x))"] {
            let id = normalize_key(raw);
            assert!(!id.contains("__"), "double underscore in {id:?}");
            assert_eq!(id.trim(), id);
        }
    }

    #[test]
    fn coerce_integer_and_float_forms() {
        assert_eq!(coerce_value("12"), Value::Int(12));
        assert_eq!(coerce_value("-7"), Value::Int(-7));
        assert_eq!(coerce_value("12.5"), Value::Float(12.5));
        assert_eq!(coerce_value("1e3"), Value::Float(1000.0));
        assert_eq!(coerce_value("2.5E2"), Value::Float(250.0));
    }

    #[test]
    fn coerce_sentinels_to_null() {
        for raw in ["nan", "NaN", "inf", "-inf", "null", "NULL"] {
            assert_eq!(coerce_value(raw), Value::Null, "sentinel {raw:?}");
        }
    }

    #[test]
    fn coerce_falls_back_to_text_verbatim() {
        assert_eq!(coerce_value("abc"), Value::Text("abc".into()));
        // Contains 'e', fails float parse, keeps the original text.
        assert_eq!(coerce_value("offline"), Value::Text("offline".into()));
        assert_eq!(coerce_value("1.2.3"), Value::Text("1.2.3".into()));
        assert_eq!(coerce_value(""), Value::Text(String::new()));
    }

    #[test]
    fn coerce_json_passes_numbers_through() {
        assert_eq!(coerce_json(&json!(85)), Value::Int(85));
        assert_eq!(coerce_json(&json!(49.98)), Value::Float(49.98));
        assert_eq!(coerce_json(&json!(null)), Value::Null);
        assert_eq!(coerce_json(&json!(true)), Value::Bool(true));
    }

    #[test]
    fn coerce_json_strings_use_lexical_rules() {
        assert_eq!(coerce_json(&json!("1500")), Value::Int(1500));
        assert_eq!(coerce_json(&json!("49.98")), Value::Float(49.98));
        assert_eq!(coerce_json(&json!("nan")), Value::Null);
        assert_eq!(coerce_json(&json!("Grid")), Value::Text("Grid".into()));
    }
}
