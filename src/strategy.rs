//! Extraction strategy selection.
//!
//! Consumes the complexity profile and picks one of the two extraction
//! paths with a confidence score and an explicit reason trail. The decision
//! order is fixed; confidence is a weighted adjustment around a base of 50,
//! clamped to [0, 100].

use serde::Serialize;

use crate::profile::ComplexityProfile;

/// The two extraction paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Structured payload / markdown-style path.
    Structured,
    /// Readability path with the fallback chain.
    Readability,
}

/// The outcome of strategy selection.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSelection {
    pub strategy: ExtractionStrategy,
    /// 0-100; never outside that range.
    pub confidence: u8,
    /// Ordered human-readable reasons, most decisive first.
    pub reasons: Vec<String>,
    /// True when the signal mix is ambiguous and the chosen path's output
    /// should be verified against the fallback chain.
    pub needs_fallback_verification: bool,
}

/// Text length under which any selection is considered ambiguous.
const SHORT_DOCUMENT_LENGTH: usize = 500;

/// Pick the extraction strategy for a profiled document.
#[must_use]
pub fn select_strategy(profile: &ComplexityProfile) -> ExtractionSelection {
    let needs_fallback_verification = profile.text_length < SHORT_DOCUMENT_LENGTH
        || (profile.has_ads && profile.has_technical_content);

    // An explicit markdown container is decisive on its own.
    if profile.markdown_container_count > 0 {
        return ExtractionSelection {
            strategy: ExtractionStrategy::Structured,
            confidence: 95,
            reasons: vec!["explicit markdown container".to_string()],
            needs_fallback_verification,
        };
    }

    let prefer_markdown =
        profile.is_clean || profile.has_markdown_features || profile.has_technical_content;
    let require_readability =
        profile.has_ads || profile.is_complex_layout || profile.has_rich_media;

    let mut reasons = Vec::new();
    let strategy = if prefer_markdown && !require_readability {
        reasons.push("clean or technical page without hostile signals".to_string());
        ExtractionStrategy::Structured
    } else if require_readability {
        reasons.push("ads, complex layout, or rich media require readability".to_string());
        ExtractionStrategy::Readability
    } else if profile.is_long_form {
        reasons.push("long-form content favors readability".to_string());
        ExtractionStrategy::Readability
    } else {
        reasons.push("default markdown path".to_string());
        ExtractionStrategy::Structured
    };

    let confidence = score_confidence(profile, strategy, &mut reasons);

    ExtractionSelection {
        strategy,
        confidence,
        reasons,
        needs_fallback_verification,
    }
}

/// Weighted confidence around a base of 50.
///
/// Flags that agree with the chosen path add; flags that cut against it
/// subtract. The result is clamped to [0, 100].
fn score_confidence(
    profile: &ComplexityProfile,
    strategy: ExtractionStrategy,
    reasons: &mut Vec<String>,
) -> u8 {
    let mut score: i32 = 50;

    match strategy {
        ExtractionStrategy::Structured => {
            if profile.is_clean {
                score += 20;
                reasons.push("clean layout (+20)".to_string());
            }
            if profile.has_markdown_features {
                score += 15;
                reasons.push("markdown features (+15)".to_string());
            }
            if profile.has_technical_content {
                score += 10;
                reasons.push("technical vocabulary (+10)".to_string());
            }
            if profile.has_ads {
                score -= 25;
                reasons.push("ads present (-25)".to_string());
            }
            if profile.is_complex_layout {
                score -= 15;
                reasons.push("complex layout (-15)".to_string());
            }
        }
        ExtractionStrategy::Readability => {
            if profile.has_ads {
                score += 20;
                reasons.push("ads present (+20)".to_string());
            }
            if profile.is_complex_layout {
                score += 15;
                reasons.push("complex layout (+15)".to_string());
            }
            if profile.is_long_form {
                score += 10;
                reasons.push("long form (+10)".to_string());
            }
            if profile.has_markdown_features {
                score -= 15;
                reasons.push("markdown features (-15)".to_string());
            }
        }
    }

    score.clamp(0, 100) as u8
}
