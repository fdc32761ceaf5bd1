//! Diagnosis model and analysis-result schema
//!
//! The vision model is asked to reply with one of two JSON shapes:
//!
//! ```text
//! { "isPlant": false, "message": "..." }
//! { "isPlant": true, "plantName": "...", "disease": "...", "confidence": 94,
//!   "severity": "moderate", "description": "...", "treatments": [...] }
//! ```
//!
//! [`AnalysisOutcome::from_value`] checks a parsed reply against that schema
//! and is shared by the proxy (which rejects non-conforming replies) and the
//! client (which never hands out a partially-filled [`Diagnosis`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Disease severity reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No disease detected
    Healthy,
    /// Early or limited symptoms
    Mild,
    /// Clearly established disease
    Moderate,
    /// Widespread damage
    Severe,
}

impl Severity {
    /// All severities, mildest first
    pub const ALL: [Severity; 4] = [Self::Healthy, Self::Mild, Self::Moderate, Self::Severe];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| SchemaError(format!("unknown severity '{}'", s)))
    }
}

/// Treatment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentType {
    /// Organic / natural remedy
    Organic,
    /// Synthetic chemical product
    Chemical,
}

impl TreatmentType {
    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Chemical => "Chemical",
        }
    }
}

/// A single recommended remedy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    /// Organic or chemical
    #[serde(rename = "type")]
    pub kind: TreatmentType,
    /// Treatment name (identity; not unique within a diagnosis)
    pub name: String,
    /// How it works
    pub description: String,
    /// How to apply it
    pub application: String,
}

/// Structured result of analyzing one plant image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// Plant species
    pub plant_name: String,
    /// Disease name, or "Healthy"
    pub disease: String,
    /// Model-reported confidence, 0–100 (not independently verified)
    pub confidence: f64,
    /// Severity
    pub severity: Severity,
    /// Free-text description of what the model saw
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Recommended treatments, in model order
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

/// A parsed model reply that does not match the analysis schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

/// The two legitimate outcomes of an analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The image is not a plant leaf
    NotAPlant {
        /// User-facing explanation from the model
        message: String,
    },
    /// The image was diagnosed
    Diagnosed(Diagnosis),
}

/// Loose mirror of the reply schema; every field optional so that missing
/// fields can be reported by name instead of as a serde error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    is_plant: Option<bool>,
    message: Option<String>,
    plant_name: Option<String>,
    disease: Option<String>,
    confidence: Option<f64>,
    severity: Option<String>,
    description: Option<String>,
    treatments: Option<Vec<Treatment>>,
}

impl AnalysisOutcome {
    /// Validate a parsed reply against the analysis schema.
    ///
    /// Rules: `isPlant` must be a boolean; a rejection needs `message`; a
    /// diagnosis needs `plantName`, `disease`, a finite `confidence` within
    /// 0–100 and a known `severity`. `treatments` may be absent (treated as
    /// empty) but every present entry must be well-formed.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError("analysis result is not a JSON object".to_string()));
        }

        let raw = RawAnalysis::deserialize(value)
            .map_err(|e| SchemaError(format!("invalid field: {}", e)))?;

        let is_plant = raw
            .is_plant
            .ok_or_else(|| missing("isPlant"))?;

        if !is_plant {
            let message = raw.message.ok_or_else(|| missing("message"))?;
            return Ok(Self::NotAPlant { message });
        }

        let plant_name = raw.plant_name.ok_or_else(|| missing("plantName"))?;
        let disease = raw.disease.ok_or_else(|| missing("disease"))?;
        let confidence = raw.confidence.ok_or_else(|| missing("confidence"))?;
        if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
            return Err(SchemaError(format!(
                "confidence {} outside 0-100",
                confidence
            )));
        }
        let severity: Severity = raw
            .severity
            .ok_or_else(|| missing("severity"))?
            .parse()?;

        Ok(Self::Diagnosed(Diagnosis {
            plant_name,
            disease,
            confidence,
            severity,
            description: raw.description,
            treatments: raw.treatments.unwrap_or_default(),
        }))
    }
}

fn missing(field: &str) -> SchemaError {
    SchemaError(format!("missing required field '{}'", field))
}
