//! Raw values as delivered by a chain data source.
//!
//! The source tags every value at the boundary so the normalizer can match
//! on it exhaustively instead of probing shapes at runtime.

use serde::{Deserialize, Serialize};

use super::preferences::ValidatorPrefs;

/// A single element of a raw sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum RawScalar {
    /// Unsigned integer up to `u128` (balances, era lengths)
    ///
    /// Sources must tag wider big-number values as [`RawValue::Opaque`].
    LargeInteger(u128),

    /// Block height
    BlockNumber(u64),

    /// Account identifier, already rendered as an address
    AccountId(String),
}

impl RawScalar {
    /// Canonical string form: base-10 digits for numbers, the address for accounts.
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::LargeInteger(value) => value.to_string(),
            Self::BlockNumber(value) => value.to_string(),
            Self::AccountId(address) => address.clone(),
        }
    }
}

/// A raw value delivered by a one-shot call or a subscription callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum RawValue {
    /// Ordered sequence (validator lists, intentions)
    Sequence(Vec<RawScalar>),

    /// Unsigned integer up to `u128`
    ///
    /// Wider big-number values do not fit; sources tag them as
    /// [`Opaque`](Self::Opaque), typically as a decimal string.
    LargeInteger(u128),

    /// Block height
    BlockNumber(u64),

    /// Validator preference record
    Preferences(ValidatorPrefs),

    /// Anything the source could not tag more precisely
    Opaque(serde_json::Value),
}

impl RawValue {
    /// Short name of the shape, used in log lines.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::LargeInteger(_) => "large-integer",
            Self::BlockNumber(_) => "block-number",
            Self::Preferences(_) => "preference-record",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl From<u128> for RawValue {
    fn from(value: u128) -> Self {
        Self::LargeInteger(value)
    }
}

impl From<ValidatorPrefs> for RawValue {
    fn from(value: ValidatorPrefs) -> Self {
        Self::Preferences(value)
    }
}

impl From<Vec<RawScalar>> for RawValue {
    fn from(value: Vec<RawScalar>) -> Self {
        Self::Sequence(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_canonical_strings() {
        assert_eq!(RawScalar::LargeInteger(2000).to_canonical_string(), "2000");
        assert_eq!(RawScalar::BlockNumber(42).to_canonical_string(), "42");
        assert_eq!(
            RawScalar::AccountId("5GrwvaEF".to_string()).to_canonical_string(),
            "5GrwvaEF"
        );
    }

    #[test]
    fn test_large_integer_beyond_u64() {
        let value = RawScalar::LargeInteger(u128::MAX);
        assert_eq!(
            value.to_canonical_string(),
            "340282366920938463463374607431768211455"
        );
    }

    #[test]
    fn test_tagged_json_shape() {
        let raw: RawValue =
            serde_json::from_str(r#"{"kind":"blockNumber","value":1234}"#).unwrap();
        assert_eq!(raw, RawValue::BlockNumber(1234));
        assert_eq!(raw.shape(), "block-number");

        let raw: RawValue = serde_json::from_str(
            r#"{"kind":"preferences","value":{"unstakeThreshold":3,"validatorPayment":10}}"#,
        )
        .unwrap();
        assert_eq!(raw, RawValue::Preferences(ValidatorPrefs::new(3, 10)));
    }
}
