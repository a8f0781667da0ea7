//! Transaction lifecycle states.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The lifecycle state of a multi-document transaction.
///
/// Stored on disk as a small integer under the `s` field of a transaction
/// document. Codes outside the known range decode to
/// [`TransactionState::Unknown`] instead of failing, so a bookkeeping
/// collection written by a newer transaction layer can still be reported on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionState {
    /// Zero value; never written by a healthy transaction layer.
    #[default]
    Invalid,
    /// One or more documents not yet prepared.
    Preparing,
    /// Prepared but not yet ready to run.
    Prepared,
    /// Assertions failed, cleaning up.
    Aborting,
    /// Changes are in progress.
    Applying,
    /// Pre-conditions failed, nothing done.
    Aborted,
    /// All changes applied.
    Applied,
    /// A code this version does not recognise.
    Unknown(i64),
}

impl TransactionState {
    /// Every named state, in lifecycle code order.
    pub const NAMED: [Self; 7] = [
        Self::Invalid,
        Self::Preparing,
        Self::Prepared,
        Self::Aborting,
        Self::Applying,
        Self::Aborted,
        Self::Applied,
    ];

    /// Map a stored state code to its state. Total: unrecognised codes
    /// become [`TransactionState::Unknown`].
    pub fn classify(code: i64) -> Self {
        match code {
            0 => Self::Invalid,
            1 => Self::Preparing,
            2 => Self::Prepared,
            3 => Self::Aborting,
            4 => Self::Applying,
            5 => Self::Aborted,
            6 => Self::Applied,
            other => Self::Unknown(other),
        }
    }

    /// The integer code as stored on disk.
    pub fn code(&self) -> i64 {
        match self {
            Self::Invalid => 0,
            Self::Preparing => 1,
            Self::Prepared => 2,
            Self::Aborting => 3,
            Self::Applying => 4,
            Self::Aborted => 5,
            Self::Applied => 6,
            Self::Unknown(code) => *code,
        }
    }

    /// Whether the transaction has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted | Self::Applied)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::Preparing => "preparing",
            Self::Prepared => "prepared",
            Self::Aborting => "aborting",
            Self::Applying => "applying",
            Self::Aborted => "aborted",
            Self::Applied => "applied",
            Self::Unknown(code) => return write!(f, "unknown state: {code}"),
        };
        f.write_str(name)
    }
}

/// Serialized by name so the state can key a JSON object.
impl Serialize for TransactionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_fixed_names() {
        let expected = [
            (0, "invalid"),
            (1, "preparing"),
            (2, "prepared"),
            (3, "aborting"),
            (4, "applying"),
            (5, "aborted"),
            (6, "applied"),
        ];
        for (code, name) in expected {
            let state = TransactionState::classify(code);
            assert_eq!(state.to_string(), name);
            assert_eq!(state.code(), code);
            assert!(!matches!(state, TransactionState::Unknown(_)));
        }
    }

    #[test]
    fn unknown_code_renders_raw_value() {
        let state = TransactionState::classify(42);
        assert_eq!(state, TransactionState::Unknown(42));
        assert_eq!(state.to_string(), "unknown state: 42");
        assert!(TransactionState::NAMED.iter().all(|s| *s != state));

        let negative = TransactionState::classify(-1);
        assert_eq!(negative.to_string(), "unknown state: -1");
    }

    #[test]
    fn named_states_are_in_code_order() {
        for (i, state) in TransactionState::NAMED.iter().enumerate() {
            assert_eq!(state.code(), i as i64);
        }
    }

    #[test]
    fn only_aborted_and_applied_are_terminal() {
        let terminal: Vec<_> = TransactionState::NAMED
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![&TransactionState::Aborted, &TransactionState::Applied]
        );
    }

    #[test]
    fn decodes_from_integer_and_encodes_as_name() {
        let state: TransactionState = serde_json::from_str("4").unwrap();
        assert_eq!(state, TransactionState::Applying);
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"applying\"");

        let state: TransactionState = serde_json::from_str("9").unwrap();
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            "\"unknown state: 9\""
        );
    }
}
