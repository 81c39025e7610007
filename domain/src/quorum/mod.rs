//! Multi-judgment consensus
//!
//! Redundant workers answer the same unit of work; the policies here decide
//! whether they agree and on what.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Task kind           Policy                 Quorum            │
//! ├───────────────────────────────────────────────────────────────┤
//! │  Rate transcription  set equality           2 identical sets  │
//! │  Categorization      majority count         label count >= 2  │
//! │                      uncategorizable        flags + 1 >= n    │
//! │  Photo change        boolean majority       51% per question  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod consensus;
pub mod policy;
pub mod rule;
pub mod thresholds;
pub mod vote;

pub use consensus::ConsensusResult;
pub use policy::{
    PhotoChangeConsensus, QuestionTally, SetAgreement, boolean_majority, majority_count,
    set_equality, uncategorizable_override,
};
pub use rule::QuorumRule;
pub use thresholds::ConsensusThresholds;
pub use vote::{Vote, VoteResult};
