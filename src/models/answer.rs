use serde::{Deserialize, Serialize};
use std::fmt;

/// Topical category assigned to a question at classification time.
///
/// Categories are not mutually exclusive; a question may carry several.
/// The `Ord` derive follows the pipeline routing priority
/// (tabular > onboarding > policy > generic), so iterating an ordered set
/// of categories visits extractors in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tabular,
    Onboarding,
    Policy,
    Generic,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tabular => "tabular",
            Self::Onboarding => "onboarding",
            Self::Policy => "policy",
            Self::Generic => "generic",
        };
        write!(f, "{name}")
    }
}

/// Which extraction strategy produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Delimited-data lookup or aggregation.
    Tabular,
    /// Pattern-rule extraction from structured prose.
    StructuredText,
    /// Sentence selection by question-token overlap.
    GenericOverlap,
    /// Terminal pipeline fallback; no extractor produced an answer.
    Fallback,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tabular => "tabular",
            Self::StructuredText => "structured_text",
            Self::GenericOverlap => "generic_overlap",
            Self::Fallback => "fallback",
        };
        write!(f, "{name}")
    }
}

/// A synthesized answer attributed to a source document.
///
/// This is the engine's sole output. Confidence is a fixed,
/// extractor-tier score, not a calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    answer: String,
    source: Option<String>,
    confidence: f32,
    extractor: ExtractorKind,
}

impl AnswerResult {
    /// Creates a new answer result, clamping confidence into [0.0, 1.0].
    pub fn new(
        answer: impl Into<String>,
        source: Option<String>,
        confidence: f32,
        extractor: ExtractorKind,
    ) -> Self {
        Self {
            answer: answer.into(),
            source,
            confidence: confidence.clamp(0.0, 1.0),
            extractor,
        }
    }

    /// Returns the answer text.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns the filename of the source document, if one was attributed.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the confidence score (0.0-1.0).
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns which extractor produced the answer.
    pub fn extractor(&self) -> ExtractorKind {
        self.extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_matches_routing_priority() {
        assert!(Category::Tabular < Category::Onboarding);
        assert!(Category::Onboarding < Category::Policy);
        assert!(Category::Policy < Category::Generic);
    }

    #[test]
    fn answer_result_clamps_confidence() {
        let high = AnswerResult::new("a", None, 1.5, ExtractorKind::Tabular);
        assert_eq!(high.confidence(), 1.0);

        let low = AnswerResult::new("a", None, -0.5, ExtractorKind::Fallback);
        assert_eq!(low.confidence(), 0.0);
    }

    #[test]
    fn extractor_kind_display_names() {
        assert_eq!(ExtractorKind::Tabular.to_string(), "tabular");
        assert_eq!(ExtractorKind::StructuredText.to_string(), "structured_text");
        assert_eq!(ExtractorKind::GenericOverlap.to_string(), "generic_overlap");
        assert_eq!(ExtractorKind::Fallback.to_string(), "fallback");
    }
}
