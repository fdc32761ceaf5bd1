//! Diagnosis presentation
//!
//! Display logic only: severity and treatment styling, detailed instruction
//! lookup, and a plain-text report. Nothing here has side effects.

mod instructions;

pub use instructions::{
    instructions_for, InstructionRecord, InstructionSource, Instructions, TreatmentKey,
    GENERIC_INSTRUCTIONS, ORGANIC_INSTRUCTIONS,
};

use crate::diagnosis::{Diagnosis, Severity, TreatmentType};
use std::fmt::Write as _;

/// Colour category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Healthy / organic
    Green,
    /// Mild
    Yellow,
    /// Moderate
    Orange,
    /// Severe
    Red,
    /// Chemical
    Blue,
    /// Unknown severity
    Gray,
}

impl Color {
    /// Lower-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Gray => "gray",
        }
    }
}

/// Icon category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    /// Check mark in a circle
    CheckCircle,
    /// Exclamation in a triangle
    AlertTriangle,
    /// Exclamation in a circle
    AlertCircle,
    /// Leaf
    Leaf,
    /// Lab beaker
    Beaker,
}

/// Visual category of a severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    /// Colour
    pub color: Color,
    /// Icon
    pub icon: Icon,
}

impl SeverityStyle {
    /// Style used for labels that are not a known severity
    pub const UNKNOWN: Self = Self {
        color: Color::Gray,
        icon: Icon::AlertCircle,
    };

    /// Style for a known severity
    #[must_use]
    pub fn for_severity(severity: Severity) -> Self {
        let (color, icon) = match severity {
            Severity::Healthy => (Color::Green, Icon::CheckCircle),
            Severity::Mild => (Color::Yellow, Icon::AlertTriangle),
            Severity::Moderate => (Color::Orange, Icon::AlertCircle),
            Severity::Severe => (Color::Red, Icon::AlertCircle),
        };
        Self { color, icon }
    }

    /// Style for a raw severity label; unknown labels get [`Self::UNKNOWN`]
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        label
            .parse::<Severity>()
            .map(Self::for_severity)
            .unwrap_or(Self::UNKNOWN)
    }
}

/// Visual category of a treatment type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreatmentStyle {
    /// Colour
    pub color: Color,
    /// Icon
    pub icon: Icon,
}

impl TreatmentStyle {
    /// Style for a treatment type
    #[must_use]
    pub fn for_type(kind: TreatmentType) -> Self {
        match kind {
            TreatmentType::Organic => Self {
                color: Color::Green,
                icon: Icon::Leaf,
            },
            TreatmentType::Chemical => Self {
                color: Color::Blue,
                icon: Icon::Beaker,
            },
        }
    }
}

/// Advisory shown next to any diagnosis that is not healthy
pub const EXPERT_ADVISORY: &str = "This AI diagnosis is for guidance only. For severe issues or if symptoms persist, please consult with a local agricultural expert or plant pathologist for professional advice.";

/// Whether [`EXPERT_ADVISORY`] applies
#[must_use]
pub fn needs_expert_advisory(severity: Severity) -> bool {
    severity != Severity::Healthy
}

/// Tips shown under every set of detailed instructions
pub const GENERAL_TIPS: [&str; 4] = [
    "Always read and follow the complete product label",
    "Test treatment on a small area first",
    "Keep detailed records of treatments and results",
    "Consult local agricultural extension for region-specific advice",
];

/// Render a diagnosis as a plain-text report
#[must_use]
pub fn render_report(diagnosis: &Diagnosis) -> String {
    let mut out = String::new();
    let style = SeverityStyle::for_severity(diagnosis.severity);

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Plant:      {}", diagnosis.plant_name);
    let _ = writeln!(out, "Disease:    {}", diagnosis.disease);
    let _ = writeln!(out, "Confidence: {}%", diagnosis.confidence);
    let _ = writeln!(
        out,
        "Severity:   {} ({})",
        diagnosis.severity,
        style.color.as_str()
    );
    if let Some(ref description) = diagnosis.description {
        let _ = writeln!(out, "\n{}", description);
    }

    if diagnosis.treatments.is_empty() {
        let _ = writeln!(out, "\nNo treatments recommended.");
    } else {
        let _ = writeln!(out, "\nTreatments:");
        for (i, treatment) in diagnosis.treatments.iter().enumerate() {
            let guide = instructions_for(treatment);
            let _ = writeln!(
                out,
                "\n  {}. [{}] {}",
                i + 1,
                treatment.kind.label(),
                treatment.name
            );
            let _ = writeln!(out, "     {}", treatment.description);
            let _ = writeln!(out, "     Application: {}", treatment.application);
            for (heading, text) in guide.record.sections() {
                let _ = writeln!(out, "     {}: {}", heading, text);
            }
        }
    }

    if needs_expert_advisory(diagnosis.severity) {
        let _ = writeln!(out, "\nImportant Note: {}", EXPERT_ADVISORY);
    }

    let _ = writeln!(out, "\nAdditional Tips:");
    for tip in GENERAL_TIPS {
        let _ = writeln!(out, "  - {}", tip);
    }
    out
}
