//! Value normalization for data points read from `/user/var/{address}`
//!
//! The controller reports numbers as scaled integers in the element text
//! (`150` with `scaleFactor="10"` and `decPlaces="1"` means `15.0`) and a
//! preformatted `strValue` attribute for everything else.

use crate::document::{parse_document, XmlElement};
use crate::error::{MeinEtaError, Result};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Units whose readings are converted to numbers
pub const FLOAT_UNITS: &[&str] = &[
    "%", "A", "Hz", "Ohm", "Pa", "U/min", "V", "W", "W/m²", "bar", "kW", "kWh", "kg", "l",
    "l/min", "mV", "m²", "s", "°C",
];

/// Check whether readings in `unit` are interpreted numerically
pub fn is_float_unit(unit: &str) -> bool {
    FLOAT_UNITS.contains(&unit)
}

/// One `value` record as served by the controller
///
/// Numeric attributes are kept as raw text; interpretation happens in
/// [`DataPoint::normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPoint {
    pub unit: Option<String>,
    pub text: Option<String>,
    pub scale_factor: Option<String>,
    pub dec_places: Option<String>,
    pub str_value: Option<String>,
}

/// Reading after normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// Scaled and rounded physical quantity
    Numeric(f64),
    /// Preformatted text from the device, possibly absent
    Text(Option<String>),
}

/// Normalized reading together with its unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedValue {
    pub value: SensorValue,
    pub unit: Option<String>,
}

impl NormalizedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            SensorValue::Numeric(v) => Some(v),
            SensorValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            SensorValue::Text(text) => text.as_deref(),
            SensorValue::Numeric(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.value, SensorValue::Numeric(_))
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            SensorValue::Numeric(v) => write!(f, "{v}")?,
            SensorValue::Text(Some(text)) => write!(f, "{text}")?,
            SensorValue::Text(None) => write!(f, "-")?,
        }
        match &self.unit {
            Some(unit) if !unit.is_empty() => write!(f, " {unit}"),
            _ => Ok(()),
        }
    }
}

impl DataPoint {
    /// Read the record from a `value` element
    pub fn from_element(element: &XmlElement) -> Self {
        let attr = |name: &str| element.attr(name).map(str::to_string);
        Self {
            unit: attr("unit"),
            text: element.text.clone(),
            scale_factor: attr("scaleFactor"),
            dec_places: attr("decPlaces"),
            str_value: attr("strValue"),
        }
    }

    /// Extract the data point from a `/user/var` response body
    ///
    /// Expects `eta/value`; the first `value` element is used.
    pub fn from_document(body: &str) -> Result<Self> {
        let root = parse_document(body)
            .map_err(|e| MeinEtaError::parsing(format!("Failed to parse data: {e}"), body))?;

        if root.name != "eta" {
            return Err(MeinEtaError::parsing(
                format!("Failed to parse data: unexpected root <{}>", root.name),
                body,
            ));
        }

        root.child("value")
            .map(Self::from_element)
            .ok_or_else(|| MeinEtaError::parsing("Failed to parse data: missing <value>", body))
    }

    /// Interpret the record; never fails
    ///
    /// Readings in a [`FLOAT_UNITS`] unit become `text / scaleFactor`
    /// rounded to `decPlaces` digits. Any other unit, a missing text or a
    /// malformed numeric field yields the `strValue` fallback.
    pub fn normalize(&self) -> NormalizedValue {
        let value = match self.numeric_value() {
            Some(v) => SensorValue::Numeric(v),
            None => SensorValue::Text(self.str_value.clone()),
        };

        NormalizedValue {
            value,
            unit: self.unit.clone(),
        }
    }

    fn numeric_value(&self) -> Option<f64> {
        let unit = self.unit.as_deref()?;
        if !is_float_unit(unit) {
            return None;
        }
        let text = self.text.as_deref()?;

        let parsed = parse_scaled(
            text,
            self.scale_factor.as_deref().unwrap_or("1"),
            self.dec_places.as_deref().unwrap_or("0"),
        );
        if parsed.is_none() {
            warn!(
                unit,
                text,
                scale_factor = ?self.scale_factor,
                dec_places = ?self.dec_places,
                "Failed to parse numeric value, using string fallback"
            );
        }
        parsed
    }
}

fn parse_scaled(text: &str, scale_factor: &str, dec_places: &str) -> Option<f64> {
    let scale_factor: i64 = scale_factor.trim().parse().ok()?;
    let dec_places: i32 = dec_places.trim().parse().ok()?;
    let raw: f64 = text.trim().parse().ok()?;

    if scale_factor == 0 {
        return None;
    }

    Some(round_to(raw / scale_factor as f64, dec_places))
}

/// Round half away from zero to `digits` fractional digits
///
/// Negative `digits` round to tens, hundreds, ...
pub fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits.unsigned_abs().min(308) as i32);
    if digits >= 0 {
        let scaled = value * factor;
        if !scaled.is_finite() {
            return value;
        }
        scaled.round() / factor
    } else {
        (value / factor).round() * factor
    }
}
