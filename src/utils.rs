// ABOUTME: Small shared helpers for parsing untrusted model-supplied values
// ABOUTME: Houses the lenient numeric coercion used on AI JSON fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Utility helpers shared across modules.

use serde_json::Value;

/// Coerce an untrusted JSON value to a finite `f64`, defaulting to 0.0.
///
/// Language models intermittently return numeric fields as strings
/// (`"25"` instead of `25`). This accepts numbers, numeric strings
/// (trimmed), and booleans; everything else - and any non-finite result -
/// coerces to 0.0.
#[must_use]
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Serde adapter for [`coerce_f64`], usable with `deserialize_with`.
pub mod lenient_f64 {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Deserialize a number-or-string field into `f64` with fallback 0.0
    ///
    /// # Errors
    ///
    /// Only fails when the underlying value cannot be read at all; any
    /// readable value coerces.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(super::coerce_f64(&value))
    }
}
