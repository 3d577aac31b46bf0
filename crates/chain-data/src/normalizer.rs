//! Value normalization.
//!
//! Converts tagged raw values from a chain data source into the canonical
//! [`BoundValue`] representation stored by a session:
//!
//! | Raw shape | Bound value |
//! |-----------|-------------|
//! | sequence | sequence of canonical strings, same order |
//! | large integer | decimal string |
//! | block number | decimal string |
//! | preference record | unchanged |
//! | opaque | unchanged, plus a warning |

use log::warn;

use crate::errors::FailureClass;
use crate::models::{BoundValue, RawValue};

/// Result of normalizing one raw value.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    /// The value to store.
    pub value: BoundValue,
    /// Set when the raw shape was not recognized.
    pub diagnostic: Option<FailureClass>,
}

impl Normalized {
    fn recognized(value: BoundValue) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    pub fn into_value(self) -> BoundValue {
        self.value
    }
}

/// Normalize a raw value delivered for `source_name`.
///
/// Pure apart from the warning logged for opaque shapes.
pub fn normalize(source_name: &str, raw: RawValue) -> Normalized {
    match raw {
        RawValue::Sequence(items) => Normalized::recognized(BoundValue::Sequence(
            items.iter().map(|item| item.to_canonical_string()).collect(),
        )),
        RawValue::LargeInteger(value) => {
            Normalized::recognized(BoundValue::Scalar(value.to_string()))
        }
        RawValue::BlockNumber(value) => {
            Normalized::recognized(BoundValue::Scalar(value.to_string()))
        }
        RawValue::Preferences(prefs) => Normalized::recognized(BoundValue::Preferences(prefs)),
        RawValue::Opaque(value) => {
            warn!(
                "Unrecognized value shape for '{}', storing as-is: {}",
                source_name, value
            );
            Normalized {
                value: BoundValue::Opaque(value),
                diagnostic: Some(FailureClass::Diagnostic),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawScalar, ValidatorPrefs};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_large_integer_to_decimal() {
        let normalized = normalize("getEraLength", RawValue::LargeInteger(2000));
        assert_eq!(normalized.value, BoundValue::from("2000"));
        assert_eq!(normalized.diagnostic, None);
    }

    #[test]
    fn test_block_number_to_decimal() {
        let normalized = normalize("getBlockNumber", RawValue::BlockNumber(918_273));
        assert_eq!(normalized.value.as_scalar(), Some("918273"));
    }

    #[test]
    fn test_sequence_keeps_order() {
        let normalized = normalize(
            "getValidators",
            RawValue::Sequence(vec![
                RawScalar::AccountId("5Alice".to_string()),
                RawScalar::LargeInteger(7),
                RawScalar::BlockNumber(3),
            ]),
        );
        assert_eq!(
            normalized.value,
            BoundValue::Sequence(vec!["5Alice".into(), "7".into(), "3".into()])
        );
    }

    #[test]
    fn test_empty_sequence() {
        let normalized = normalize("getIntentions", RawValue::Sequence(vec![]));
        assert_eq!(normalized.value, BoundValue::Sequence(vec![]));
    }

    #[test]
    fn test_preferences_pass_through() {
        let prefs = ValidatorPrefs::new(3, 1_000);
        let normalized = normalize("getValidatorPreferences", prefs.clone().into());
        assert_eq!(normalized.value, BoundValue::Preferences(prefs));
        assert_eq!(normalized.diagnostic, None);
    }

    #[test]
    fn test_opaque_is_stored_with_diagnostic() {
        let raw = json!({ "peers": 4, "isSyncing": false });
        let normalized = normalize("getHealth", RawValue::Opaque(raw.clone()));
        assert_eq!(normalized.value, BoundValue::Opaque(raw));
        assert_eq!(normalized.diagnostic, Some(FailureClass::Diagnostic));
    }

    proptest! {
        #[test]
        fn prop_sequence_length_and_order(values in proptest::collection::vec(any::<u128>(), 0..32)) {
            let raw = RawValue::Sequence(values.iter().copied().map(RawScalar::LargeInteger).collect());
            let normalized = normalize("getStakers", raw).into_value();
            let strings = normalized.as_sequence().unwrap().to_vec();
            prop_assert_eq!(strings.len(), values.len());
            for (string, value) in strings.iter().zip(&values) {
                let expected = value.to_string();
                prop_assert_eq!(string, &expected);
            }
        }

        #[test]
        fn prop_large_integer_idempotent(value in any::<u128>()) {
            let first = normalize("getBalance", RawValue::LargeInteger(value)).into_value();
            let expected = value.to_string();
            prop_assert_eq!(first.as_scalar(), Some(expected.as_str()));

            // The decimal string parses back into the same wrapper.
            let reparsed: u128 = first.as_scalar().unwrap().parse().unwrap();
            let second = normalize("getBalance", RawValue::LargeInteger(reparsed)).into_value();
            prop_assert_eq!(first, second);
        }
    }
}
