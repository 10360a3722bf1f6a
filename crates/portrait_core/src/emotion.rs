//! Emotion Interpreter
//!
//! The face backend reports one raw score per emotion category. Scores have no
//! fixed scale across backends (DeepFace reports percentages, other models
//! report fractions), so interpretation always re-normalizes the distribution
//! into fractions before deriving anything from it.
//!
//! From the normalized distribution we derive:
//! - the dominant category (argmax, ties broken lexicographically),
//! - valence on a 0..100 scale (50 = neutral),
//! - intensity (share of the dominant category, 0..100),
//! - a qualitative stability band from the Shannon entropy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entropy below this is a "stable" distribution.
pub const STABLE_ENTROPY: f64 = 1.2;
/// Entropy below this (and above `STABLE_ENTROPY`) is "variable".
pub const VARIABLE_ENTROPY: f64 = 1.8;

const ENTROPY_EPSILON: f64 = 1e-12;

/// The fixed set of categories the interpreter knows a valence weight for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionCategory {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 7] = [
        EmotionCategory::Angry,
        EmotionCategory::Disgust,
        EmotionCategory::Fear,
        EmotionCategory::Happy,
        EmotionCategory::Neutral,
        EmotionCategory::Sad,
        EmotionCategory::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Angry => "angry",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Happy => "happy",
            EmotionCategory::Neutral => "neutral",
            EmotionCategory::Sad => "sad",
            EmotionCategory::Surprise => "surprise",
        }
    }

    /// Case-insensitive lookup. Keys outside the fixed set return `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }

    /// Signed affective polarity in [-1, 1].
    pub fn valence_weight(&self) -> f64 {
        match self {
            EmotionCategory::Angry => -0.9,
            EmotionCategory::Fear => -0.8,
            EmotionCategory::Sad => -0.8,
            EmotionCategory::Disgust => -0.7,
            EmotionCategory::Surprise => 0.1,
            EmotionCategory::Neutral => 0.0,
            EmotionCategory::Happy => 0.9,
        }
    }
}

/// Valence weight for an arbitrary backend key; unknown keys are neutral.
pub fn valence_weight(key: &str) -> f64 {
    EmotionCategory::from_key(key)
        .map(|c| c.valence_weight())
        .unwrap_or(0.0)
}

/// Raw per-category scores as reported by the face backend.
///
/// Keys are lower-cased on insertion and duplicate keys are summed.
/// Negative and non-finite scores are stored as 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct EmotionDistribution {
    scores: BTreeMap<String, f64>,
}

impl EmotionDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut dist = Self::new();
        for (key, score) in pairs {
            dist.insert(key.as_ref(), score);
        }
        dist
    }

    pub fn insert(&mut self, key: &str, score: f64) {
        let score = if score.is_finite() && score > 0.0 { score } else { 0.0 };
        let entry = self.scores.entry(key.trim().to_lowercase()).or_insert(0.0);
        *entry = (*entry + score).min(f64::MAX);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.scores.get(&key.to_lowercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all scores. May be infinite for scores near `f64::MAX`.
    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }

    fn max_score(&self) -> f64 {
        self.scores.values().copied().fold(0.0, f64::max)
    }

    /// Fractions of the total, summing to 1 for any non-zero input.
    ///
    /// Scores are rescaled by the largest one first, so huge inputs cannot
    /// overflow the sum. An all-zero distribution maps every key to 0.
    pub fn normalized(&self) -> BTreeMap<String, f64> {
        let max = self.max_score();
        if max <= 0.0 {
            return self.scores.keys().map(|k| (k.clone(), 0.0)).collect();
        }
        let scaled_total: f64 = self.scores.values().map(|v| v / max).sum();
        self.scores
            .iter()
            .map(|(k, v)| (k.clone(), (v / max) / scaled_total))
            .collect()
    }
}

impl From<BTreeMap<String, f64>> for EmotionDistribution {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<EmotionDistribution> for BTreeMap<String, f64> {
    fn from(dist: EmotionDistribution) -> Self {
        dist.scores
    }
}

/// Qualitative band of how spread out the distribution is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Variable,
    HighlyVariable,
    Unknown,
}

impl Stability {
    pub fn from_entropy(entropy: f64) -> Self {
        if !entropy.is_finite() {
            Stability::Unknown
        } else if entropy < STABLE_ENTROPY {
            Stability::Stable
        } else if entropy < VARIABLE_ENTROPY {
            Stability::Variable
        } else {
            Stability::HighlyVariable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stability::Stable => "стабільний",
            Stability::Variable => "мінливий",
            Stability::HighlyVariable => "дуже мінливий",
            Stability::Unknown => "невідомо",
        }
    }
}

/// Interpreted emotional state for one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    /// Dominant category key, or "unknown" for an empty distribution
    pub dominant: String,

    /// Valence on 0..100; 0 = strongly negative, 50 = neutral, 100 = strongly positive
    pub valence: f64,

    /// Share of the dominant category, 0..100
    pub intensity: f64,

    pub stability: Stability,

    /// Normalized fractions, summing to 1 for any non-degenerate input
    pub normalized: BTreeMap<String, f64>,

    /// Raw distribution retained for audit and display
    pub raw: EmotionDistribution,
}

impl EmotionProfile {
    pub const UNKNOWN: &'static str = "unknown";

    /// Profile for a missing or all-zero distribution.
    pub fn unknown() -> Self {
        Self {
            dominant: Self::UNKNOWN.to_string(),
            valence: 50.0,
            intensity: 0.0,
            stability: Stability::Unknown,
            normalized: BTreeMap::new(),
            raw: EmotionDistribution::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.dominant == Self::UNKNOWN
    }

    pub fn dominant_category(&self) -> Option<EmotionCategory> {
        EmotionCategory::from_key(&self.dominant)
    }

    /// Valence mapped back onto [-1, 1].
    pub fn signed_valence(&self) -> f64 {
        (self.valence / 50.0 - 1.0).clamp(-1.0, 1.0)
    }

    /// Two-sentence description of the emotional background.
    pub fn describe(&self) -> String {
        if self.is_unknown() {
            return "Емоційний стан не визначений.".to_string();
        }

        let mood = if self.valence > 70.0 {
            "Переважно позитивний емоційний фон"
        } else if self.valence < 30.0 {
            "Переважно негативний або напружений емоційний фон"
        } else {
            "Змішаний або відносно нейтральний фон"
        };

        let style = if self.intensity > 70.0 {
            "Домінує одна яскраво виражена емоція; реакції можуть бути помітними для оточення."
        } else if self.intensity < 35.0 {
            "Емоційний стан більш розмитий, без різко вираженої емоції."
        } else {
            "Є одна провідна емоція, але простежуються й інші емоційні відтінки."
        };

        format!("{}. {}", mood, style)
    }
}

/// Shannon entropy (natural log) of a set of fractions.
pub fn entropy<'a, I>(fractions: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    fractions
        .into_iter()
        .map(|p| -p * (p + ENTROPY_EPSILON).ln())
        .sum()
}

/// Interpret a raw distribution into an `EmotionProfile`.
///
/// Empty or all-zero input yields `EmotionProfile::unknown()`; nothing here fails.
pub fn interpret_emotions(dist: &EmotionDistribution) -> EmotionProfile {
    if dist.is_empty() || dist.max_score() <= 0.0 {
        return EmotionProfile::unknown();
    }

    let normalized = dist.normalized();
    if normalized.values().any(|p| !p.is_finite()) {
        return EmotionProfile::unknown();
    }

    // BTreeMap iterates keys in lexicographic order and only a strictly greater
    // fraction replaces the current leader, so ties go to the smaller key.
    let mut dominant: Option<(&str, f64)> = None;
    for (key, frac) in &normalized {
        match dominant {
            Some((_, best)) if *frac <= best => {}
            _ => dominant = Some((key.as_str(), *frac)),
        }
    }
    let (dominant, dominant_frac) = dominant.unwrap_or((EmotionProfile::UNKNOWN, 0.0));

    let signed: f64 = normalized
        .iter()
        .map(|(key, frac)| valence_weight(key) * frac)
        .sum();
    let valence = ((signed + 1.0) * 50.0).clamp(0.0, 100.0);
    let intensity = (dominant_frac * 100.0).clamp(0.0, 100.0);
    let stability = Stability::from_entropy(entropy(normalized.values()));

    EmotionProfile {
        dominant: dominant.to_string(),
        valence,
        intensity,
        stability,
        normalized: normalized.clone(),
        raw: dist.clone(),
    }
}
