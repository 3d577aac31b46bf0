//! Validator preference record.

use serde::{Deserialize, Serialize};

/// Preferences a validator publishes on chain.
///
/// Structured record, not a numeric wrapper: the normalizer passes it
/// through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorPrefs {
    /// Number of slashes tolerated before the validator is unstaked
    pub unstake_threshold: u32,

    /// Reward the validator keeps before nominators are paid, in base units
    pub validator_payment: u128,
}

impl ValidatorPrefs {
    pub fn new(unstake_threshold: u32, validator_payment: u128) -> Self {
        Self {
            unstake_threshold,
            validator_payment,
        }
    }
}
