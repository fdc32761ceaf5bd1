//! Detailed treatment instructions
//!
//! Treatment names come from the model as free text, so the lookup runs in
//! three passes: an exact match on the normalised name, then whole-word
//! keyword rules in priority order, then a per-category default.

use crate::diagnosis::{Treatment, TreatmentType};

/// Pre-authored guidance for one treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionRecord {
    /// How to prepare it
    pub preparation: &'static str,
    /// When to apply it
    pub timing: &'static str,
    /// How often
    pub frequency: &'static str,
    /// Safety precautions
    pub safety: &'static str,
    /// Storage
    pub storage: &'static str,
}

impl InstructionRecord {
    /// Headed sections in display order
    #[must_use]
    pub fn sections(&self) -> [(&'static str, &'static str); 5] {
        [
            ("Preparation", self.preparation),
            ("Timing", self.timing),
            ("Frequency", self.frequency),
            ("Safety Precautions", self.safety),
            ("Storage", self.storage),
        ]
    }
}

/// Treatments with specific instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreatmentKey {
    /// Neem oil spray
    NeemOil,
    /// Copper-based fungicides
    Copper,
    /// Baking soda (sodium bicarbonate) solution
    BakingSoda,
    /// Insecticidal soap
    Soap,
    /// Tebuconazole
    Tebuconazole,
    /// Routine preventive care for healthy plants
    PreventiveCare,
}

impl TreatmentKey {
    /// Every key
    pub const ALL: [TreatmentKey; 6] = [
        Self::NeemOil,
        Self::Copper,
        Self::BakingSoda,
        Self::Soap,
        Self::Tebuconazole,
        Self::PreventiveCare,
    ];

    /// Display name
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NeemOil => "Neem Oil Spray",
            Self::Copper => "Copper Fungicide",
            Self::BakingSoda => "Baking Soda Solution",
            Self::Soap => "Insecticidal Soap",
            Self::Tebuconazole => "Tebuconazole",
            Self::PreventiveCare => "Preventive Care",
        }
    }

    /// Instructions for this treatment
    #[must_use]
    pub fn record(&self) -> &'static InstructionRecord {
        match self {
            Self::NeemOil => &NEEM_OIL,
            Self::Copper => &COPPER,
            Self::BakingSoda => &BAKING_SODA,
            Self::Soap => &SOAP,
            Self::Tebuconazole => &TEBUCONAZOLE,
            Self::PreventiveCare => &PREVENTIVE_CARE,
        }
    }

    /// Exact lookup of a normalised identifier
    #[must_use]
    pub fn from_identifier(name: &str) -> Option<Self> {
        alias_match(&normalize(name))
    }
}

/// Where a set of instructions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSource {
    /// Matched a known treatment
    Specific(TreatmentKey),
    /// Default for the treatment's category
    Category(TreatmentType),
}

/// Resolved instructions for a treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instructions {
    /// The guidance
    pub record: &'static InstructionRecord,
    /// How it was chosen
    pub source: InstructionSource,
}

const NEEM_OIL: InstructionRecord = InstructionRecord {
    preparation: "Mix 2 tablespoons of neem oil with 1 gallon of water and a few drops of mild dish soap",
    timing: "Apply early morning or evening to avoid leaf burn",
    frequency: "Every 7-10 days until symptoms improve",
    safety: "Wear gloves and avoid spraying during flowering period",
    storage: "Store in cool, dry place away from children and pets",
};

const COPPER: InstructionRecord = InstructionRecord {
    preparation: "Follow manufacturer instructions for dilution ratio",
    timing: "Apply when weather conditions are dry with no rain expected for 24 hours",
    frequency: "Every 14 days, maximum 4 applications per season",
    safety: "Wear protective clothing, mask, and gloves. Avoid inhaling spray",
    storage: "Store in original container in locked cabinet",
};

const BAKING_SODA: InstructionRecord = InstructionRecord {
    preparation: "Mix 1 teaspoon baking soda with 1 quart water and 2-3 drops dish soap",
    timing: "Apply during cooler parts of the day",
    frequency: "Weekly application until disease is controlled",
    safety: "Test on small area first to check for plant sensitivity",
    storage: "Prepare fresh solution for each application",
};

const SOAP: InstructionRecord = InstructionRecord {
    preparation: "Use a ready-to-spray insecticidal soap or dilute concentrate as directed on the label",
    timing: "Spray in the early morning or evening, directly onto affected leaf surfaces",
    frequency: "Every 5-7 days while pests or symptoms persist",
    safety: "Do not apply in full sun or above 32°C; test on a few leaves first",
    storage: "Keep sealed in a cool place and protect from freezing",
};

const TEBUCONAZOLE: InstructionRecord = InstructionRecord {
    preparation: "Use exact concentration specified on product label",
    timing: "Apply preventatively before disease symptoms appear",
    frequency: "Every 2-3 weeks during growing season",
    safety: "Use full protective equipment. Do not apply before harvest period",
    storage: "Store in original container away from food and water sources",
};

const PREVENTIVE_CARE: InstructionRecord = InstructionRecord {
    preparation: "Maintain consistent watering schedule and good air circulation",
    timing: "Monitor daily, especially during humid conditions",
    frequency: "Ongoing maintenance routine",
    safety: "Use clean gardening tools to prevent disease spread",
    storage: "Keep gardening tools clean and sanitized",
};

/// Default for organic treatments with no specific match
pub const ORGANIC_INSTRUCTIONS: InstructionRecord = InstructionRecord {
    preparation: "Prepare a fresh batch following the recipe or product directions",
    timing: "Apply in the early morning or evening, avoiding rain and midday heat",
    frequency: "Every 7 days until symptoms stop spreading",
    safety: "Wear gloves and test on a few leaves before treating the whole plant",
    storage: "Use homemade mixtures the same day; keep products cool and sealed",
};

/// Label-reading guidance, the default for unmatched chemical treatments
pub const GENERIC_INSTRUCTIONS: InstructionRecord = InstructionRecord {
    preparation: "Follow product label instructions",
    timing: "Apply according to manufacturer guidelines",
    frequency: "As recommended on product packaging",
    safety: "Use appropriate protective equipment",
    storage: "Store according to label instructions",
};

const ALIASES: &[(&str, TreatmentKey)] = &[
    ("neem oil spray", TreatmentKey::NeemOil),
    ("neem oil", TreatmentKey::NeemOil),
    ("copper fungicide", TreatmentKey::Copper),
    ("copper spray", TreatmentKey::Copper),
    ("baking soda solution", TreatmentKey::BakingSoda),
    ("baking soda spray", TreatmentKey::BakingSoda),
    ("insecticidal soap", TreatmentKey::Soap),
    ("tebuconazole", TreatmentKey::Tebuconazole),
    ("preventive care", TreatmentKey::PreventiveCare),
    ("preventative care", TreatmentKey::PreventiveCare),
];

struct KeywordRule {
    words: &'static [&'static str],
    priority: u8,
    key: TreatmentKey,
}

// Higher priority wins; every priority is distinct.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule { words: &["baking", "soda"], priority: 90, key: TreatmentKey::BakingSoda },
    KeywordRule { words: &["sodium", "bicarbonate"], priority: 85, key: TreatmentKey::BakingSoda },
    KeywordRule { words: &["tebuconazole"], priority: 80, key: TreatmentKey::Tebuconazole },
    KeywordRule { words: &["copper"], priority: 70, key: TreatmentKey::Copper },
    KeywordRule { words: &["neem"], priority: 60, key: TreatmentKey::NeemOil },
    KeywordRule { words: &["preventive"], priority: 50, key: TreatmentKey::PreventiveCare },
    KeywordRule { words: &["preventative"], priority: 45, key: TreatmentKey::PreventiveCare },
    KeywordRule { words: &["soap"], priority: 10, key: TreatmentKey::Soap },
];

/// Lower-case, keep alphanumerics, collapse everything else to single spaces
fn normalize(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn alias_match(id: &str) -> Option<TreatmentKey> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == id)
        .map(|(_, key)| *key)
}

fn contains_words(tokens: &[&str], words: &[&str]) -> bool {
    tokens.windows(words.len()).any(|w| w == words)
}

fn keyword_match(id: &str) -> Option<TreatmentKey> {
    let tokens: Vec<&str> = id.split(' ').collect();
    KEYWORD_RULES
        .iter()
        .filter(|rule| contains_words(&tokens, rule.words))
        .max_by_key(|rule| rule.priority)
        .map(|rule| rule.key)
}

/// Resolve the detailed instructions for `treatment`
#[must_use]
pub fn instructions_for(treatment: &Treatment) -> Instructions {
    let id = normalize(&treatment.name);
    let specific = alias_match(&id).or_else(|| keyword_match(&id));

    match (specific, treatment.kind) {
        (Some(key), _) => Instructions {
            record: key.record(),
            source: InstructionSource::Specific(key),
        },
        (None, TreatmentType::Organic) => Instructions {
            record: &ORGANIC_INSTRUCTIONS,
            source: InstructionSource::Category(TreatmentType::Organic),
        },
        (None, TreatmentType::Chemical) => Instructions {
            record: &GENERIC_INSTRUCTIONS,
            source: InstructionSource::Category(TreatmentType::Chemical),
        },
    }
}
