//! Photo-change questionnaire
//!
//! Workers compare a new photo of a rate sign with the previous one and
//! answer four yes/no questions. The questions are described by a
//! declarative schema ([`PhotoChangeQuestion::ALL`]) rather than ad hoc
//! accessors, so tallying and screening iterate the same list.

use super::answer::Answer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One question of the photo-change questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoChangeQuestion {
    /// Is it the same physical sign?
    SameSign,
    /// Does the new photo show rate lines the old one lacks?
    NewHasExtraRates,
    /// Does the old photo show rate lines the new one lacks?
    OldHasExtraRates,
    /// Are all prices unchanged?
    SamePrices,
}

impl PhotoChangeQuestion {
    pub const ALL: [PhotoChangeQuestion; 4] = [
        PhotoChangeQuestion::SameSign,
        PhotoChangeQuestion::NewHasExtraRates,
        PhotoChangeQuestion::OldHasExtraRates,
        PhotoChangeQuestion::SamePrices,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            PhotoChangeQuestion::SameSign => "same_sign",
            PhotoChangeQuestion::NewHasExtraRates => "new_has_extra_rates",
            PhotoChangeQuestion::OldHasExtraRates => "old_has_extra_rates",
            PhotoChangeQuestion::SamePrices => "same_prices",
        }
    }
}

impl std::fmt::Display for PhotoChangeQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Structurally inconsistent answer combinations.
///
/// A judgment matching any of these is never counted as a vote.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidPattern {
    #[error("all questions were left blank")]
    AllBlank,

    #[error("signs differ but follow-up questions were answered")]
    DifferentSignWithDetails,

    #[error("extra rates reported but prices were also compared")]
    ExtraRatesWithPrices,

    #[error("rates reported as matching but prices were not compared")]
    MatchingRatesWithoutPrices,
}

/// The four sub-answers of one photo-change judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoChangeAnswers {
    pub same_sign: Answer,
    pub new_has_extra_rates: Answer,
    pub old_has_extra_rates: Answer,
    pub same_prices: Answer,
}

impl PhotoChangeAnswers {
    pub fn new(
        same_sign: Answer,
        new_has_extra_rates: Answer,
        old_has_extra_rates: Answer,
        same_prices: Answer,
    ) -> Self {
        Self {
            same_sign,
            new_has_extra_rates,
            old_has_extra_rates,
            same_prices,
        }
    }

    pub fn get(&self, question: PhotoChangeQuestion) -> Answer {
        match question {
            PhotoChangeQuestion::SameSign => self.same_sign,
            PhotoChangeQuestion::NewHasExtraRates => self.new_has_extra_rates,
            PhotoChangeQuestion::OldHasExtraRates => self.old_has_extra_rates,
            PhotoChangeQuestion::SamePrices => self.same_prices,
        }
    }

    /// Screen the answer combination.
    ///
    /// Patterns are checked in a fixed order and the first hit is reported.
    pub fn validate(&self) -> Result<(), InvalidPattern> {
        if PhotoChangeQuestion::ALL
            .iter()
            .all(|q| self.get(*q).is_blank())
        {
            return Err(InvalidPattern::AllBlank);
        }

        let details = [
            self.new_has_extra_rates,
            self.old_has_extra_rates,
            self.same_prices,
        ];
        if self.same_sign.is_no() && details.iter().any(|a| !a.is_blank()) {
            return Err(InvalidPattern::DifferentSignWithDetails);
        }

        if self.same_sign.is_yes() {
            let any_extra = self.new_has_extra_rates.is_yes() || self.old_has_extra_rates.is_yes();
            if any_extra && !self.same_prices.is_blank() {
                return Err(InvalidPattern::ExtraRatesWithPrices);
            }

            let no_extra = self.new_has_extra_rates.is_no() && self.old_has_extra_rates.is_no();
            if no_extra && self.same_prices.is_blank() {
                return Err(InvalidPattern::MatchingRatesWithoutPrices);
            }
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
