//! Identifier newtypes (ULID for sortability)

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Ulid);

        impl $name {
            /// Generate a new identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Deterministic identifier from a millisecond timestamp and a sequence
            #[inline]
            #[must_use]
            pub fn from_parts(timestamp_ms: u64, sequence: u128) -> Self {
                Self(Ulid::from_parts(timestamp_ms, sequence))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ulid::from_string(s)
                    .map(Self)
                    .map_err(|e| ModelError::InvalidId {
                        value: s.to_string(),
                        reason: e.to_string(),
                    })
            }
        }
    };
}

ulid_id!(
    /// Unique simulation run identifier
    RunId
);

ulid_id!(
    /// Unique history record identifier
    RecordId
);

ulid_id!(
    /// Unique change-request attachment identifier
    AttachmentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn record_id_parses_its_display() {
        let id = RecordId::new();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn record_id_rejects_garbage() {
        let err = "not-a-ulid".parse::<RecordId>().unwrap_err();
        assert!(matches!(err, ModelError::InvalidId { .. }));
    }

    #[test]
    fn from_parts_is_deterministic() {
        let a = RecordId::from_parts(1_715_351_520_000, 1);
        assert_eq!(a, RecordId::from_parts(1_715_351_520_000, 1));
        assert_ne!(a, RecordId::from_parts(1_715_351_520_000, 2));
        assert_eq!(a.to_string().parse::<RecordId>().unwrap(), a);
    }
}
