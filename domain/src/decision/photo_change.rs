//! Photo-change classification

use super::entities::PhotoChangeClass;
use crate::quorum::PhotoChangeConsensus;

/// Classify an agreed photo comparison into exactly one class.
pub fn classify(consensus: &PhotoChangeConsensus) -> PhotoChangeClass {
    let extra_lines = consensus.new_has_extra_rates() || consensus.old_has_extra_rates();

    if !consensus.same_sign() || extra_lines {
        PhotoChangeClass::NeedsManualUpdate
    } else if consensus.same_prices() {
        PhotoChangeClass::AutoApply
    } else {
        PhotoChangeClass::NeedsPricing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::Answer::{self, Blank, No, Yes};
    use crate::judgment::PhotoChangeAnswers;
    use crate::quorum::{QuorumRule, boolean_majority};

    fn unanimous(s: Answer, n: Answer, o: Answer, p: Answer) -> PhotoChangeConsensus {
        let answers = PhotoChangeAnswers::new(s, n, o, p);
        let ballots = vec![("W1", &answers), ("W2", &answers), ("W3", &answers)];
        boolean_majority(&ballots, QuorumRule::Percentage(51))
            .into_value()
            .unwrap()
    }

    #[test]
    fn test_different_sign_needs_manual_update() {
        assert_eq!(
            classify(&unanimous(No, Blank, Blank, Blank)),
            PhotoChangeClass::NeedsManualUpdate
        );
    }

    #[test]
    fn test_extra_lines_need_manual_update() {
        assert_eq!(
            classify(&unanimous(Yes, Yes, No, Blank)),
            PhotoChangeClass::NeedsManualUpdate
        );
        assert_eq!(
            classify(&unanimous(Yes, No, Yes, Blank)),
            PhotoChangeClass::NeedsManualUpdate
        );
    }

    #[test]
    fn test_same_prices_auto_apply() {
        assert_eq!(
            classify(&unanimous(Yes, No, No, Yes)),
            PhotoChangeClass::AutoApply
        );
    }

    #[test]
    fn test_changed_prices_need_pricing() {
        assert_eq!(
            classify(&unanimous(Yes, No, No, No)),
            PhotoChangeClass::NeedsPricing
        );
    }
}
