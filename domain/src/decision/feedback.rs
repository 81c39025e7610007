//! Feedback message catalog
//!
//! Every accept/reject sent to the marketplace carries a message chosen by
//! [`FeedbackReason`]. Defaults live here; deployments may override any of
//! them by reason key.

use crate::core::error::DomainError;
use crate::judgment::InvalidPattern;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a judgment was accepted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackReason {
    TranscriptionApproved,
    NoRatesApproved,
    ParseFailed,
    BlankTranscription,
    CategoriesApproved,
    DidNotSelectAnyOptions,
    CategoryNoConsensus,
    PhotoChangeApproved,
    PhotoChangeAllBlank,
    PhotoChangeDifferentSignWithDetails,
    PhotoChangeExtraRatesWithPrices,
    PhotoChangeMatchingRatesWithoutPrices,
}

impl FeedbackReason {
    pub const ALL: [FeedbackReason; 12] = [
        FeedbackReason::TranscriptionApproved,
        FeedbackReason::NoRatesApproved,
        FeedbackReason::ParseFailed,
        FeedbackReason::BlankTranscription,
        FeedbackReason::CategoriesApproved,
        FeedbackReason::DidNotSelectAnyOptions,
        FeedbackReason::CategoryNoConsensus,
        FeedbackReason::PhotoChangeApproved,
        FeedbackReason::PhotoChangeAllBlank,
        FeedbackReason::PhotoChangeDifferentSignWithDetails,
        FeedbackReason::PhotoChangeExtraRatesWithPrices,
        FeedbackReason::PhotoChangeMatchingRatesWithoutPrices,
    ];

    /// Configuration key of this reason
    pub fn key(&self) -> &'static str {
        match self {
            FeedbackReason::TranscriptionApproved => "transcription_approved",
            FeedbackReason::NoRatesApproved => "no_rates_approved",
            FeedbackReason::ParseFailed => "parse_failed",
            FeedbackReason::BlankTranscription => "blank_transcription",
            FeedbackReason::CategoriesApproved => "categories_approved",
            FeedbackReason::DidNotSelectAnyOptions => "did_not_select_any_options",
            FeedbackReason::CategoryNoConsensus => "category_no_consensus",
            FeedbackReason::PhotoChangeApproved => "photo_change_approved",
            FeedbackReason::PhotoChangeAllBlank => "photo_change_all_blank",
            FeedbackReason::PhotoChangeDifferentSignWithDetails => {
                "photo_change_different_sign_with_details"
            }
            FeedbackReason::PhotoChangeExtraRatesWithPrices => "photo_change_extra_rates_with_prices",
            FeedbackReason::PhotoChangeMatchingRatesWithoutPrices => {
                "photo_change_matching_rates_without_prices"
            }
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            FeedbackReason::TranscriptionApproved => "Approved by automatic transcription parser.",
            FeedbackReason::NoRatesApproved => {
                "Approved: other workers also found no rates in this photo."
            }
            FeedbackReason::ParseFailed => "Automated parsing of answer failed.",
            FeedbackReason::BlankTranscription => {
                "No rates were transcribed and the photo was not marked as having no rates."
            }
            FeedbackReason::CategoriesApproved => "Approved by automatic category consensus.",
            FeedbackReason::DidNotSelectAnyOptions => "You did not select any options.",
            FeedbackReason::CategoryNoConsensus => {
                "Your selections did not agree with other workers."
            }
            FeedbackReason::PhotoChangeApproved => "Approved by automatic photo comparison.",
            FeedbackReason::PhotoChangeAllBlank => "You did not answer any of the questions.",
            FeedbackReason::PhotoChangeDifferentSignWithDetails => {
                "You marked the signs as different but also answered the follow-up questions."
            }
            FeedbackReason::PhotoChangeExtraRatesWithPrices => {
                "You marked extra rates but also answered whether the prices match."
            }
            FeedbackReason::PhotoChangeMatchingRatesWithoutPrices => {
                "You marked the rates as matching but did not answer whether the prices match."
            }
        }
    }
}

impl From<InvalidPattern> for FeedbackReason {
    fn from(pattern: InvalidPattern) -> Self {
        match pattern {
            InvalidPattern::AllBlank => FeedbackReason::PhotoChangeAllBlank,
            InvalidPattern::DifferentSignWithDetails => {
                FeedbackReason::PhotoChangeDifferentSignWithDetails
            }
            InvalidPattern::ExtraRatesWithPrices => FeedbackReason::PhotoChangeExtraRatesWithPrices,
            InvalidPattern::MatchingRatesWithoutPrices => {
                FeedbackReason::PhotoChangeMatchingRatesWithoutPrices
            }
        }
    }
}

impl std::fmt::Display for FeedbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for FeedbackReason {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedbackReason::ALL
            .into_iter()
            .find(|reason| reason.key() == s)
            .ok_or_else(|| DomainError::InvalidFeedbackReason(s.to_string()))
    }
}

/// Feedback templates keyed by reason
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackCatalog {
    overrides: HashMap<FeedbackReason, String>,
}

impl FeedbackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from string-keyed overrides (as found in config files)
    pub fn from_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Result<Self, DomainError> {
        let mut catalog = Self::new();
        for (key, message) in overrides {
            catalog = catalog.with_override(key.parse()?, message.clone());
        }
        Ok(catalog)
    }

    pub fn with_override(mut self, reason: FeedbackReason, message: impl Into<String>) -> Self {
        self.overrides.insert(reason, message.into());
        self
    }

    pub fn message(&self, reason: FeedbackReason) -> &str {
        self.overrides
            .get(&reason)
            .map(String::as_str)
            .unwrap_or_else(|| reason.default_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        let catalog = FeedbackCatalog::new();
        assert_eq!(
            catalog.message(FeedbackReason::TranscriptionApproved),
            "Approved by automatic transcription parser."
        );
        assert_eq!(
            catalog.message(FeedbackReason::ParseFailed),
            "Automated parsing of answer failed."
        );
    }

    #[test]
    fn test_override() {
        let catalog = FeedbackCatalog::new().with_override(FeedbackReason::ParseFailed, "Nope.");
        assert_eq!(catalog.message(FeedbackReason::ParseFailed), "Nope.");
        assert_eq!(
            catalog.message(FeedbackReason::DidNotSelectAnyOptions),
            "You did not select any options."
        );
    }

    #[test]
    fn test_from_overrides_rejects_unknown_key() {
        let overrides = HashMap::from([("bogus".to_string(), "x".to_string())]);
        assert_eq!(
            FeedbackCatalog::from_overrides(&overrides),
            Err(DomainError::InvalidFeedbackReason("bogus".to_string()))
        );

        let overrides = HashMap::from([("parse_failed".to_string(), "x".to_string())]);
        let catalog = FeedbackCatalog::from_overrides(&overrides).unwrap();
        assert_eq!(catalog.message(FeedbackReason::ParseFailed), "x");
    }

    #[test]
    fn test_keys_round_trip_through_from_str() {
        for reason in FeedbackReason::ALL {
            assert_eq!(reason.key().parse::<FeedbackReason>(), Ok(reason));
        }
    }

    #[test]
    fn test_invalid_pattern_reasons() {
        assert_eq!(
            FeedbackReason::from(InvalidPattern::AllBlank),
            FeedbackReason::PhotoChangeAllBlank
        );
    }
}
