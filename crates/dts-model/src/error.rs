//! Error types for the data model

/// Errors raised while parsing or validating model records
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A string did not name any variant of the enum
    #[error("unknown {kind}: '{value}'")]
    UnknownVariant {
        /// Enum being parsed
        kind: &'static str,
        /// Rejected input
        value: String,
    },

    /// Identifier was not a valid ULID
    #[error("invalid identifier '{value}': {reason}")]
    InvalidId { value: String, reason: String },

    /// Risk score outside 0..=100
    #[error("risk score {0} out of range (0-100)")]
    RiskOutOfRange(u8),

    /// Attachment change id does not match its change type
    #[error("inconsistent attachment: {0}")]
    InconsistentAttachment(&'static str),

    /// JSON encode/decode failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variant_display() {
        let err = ModelError::UnknownVariant {
            kind: "Zone",
            value: "mars".to_string(),
        };
        assert_eq!(err.to_string(), "unknown Zone: 'mars'");
    }

    #[test]
    fn risk_out_of_range_display() {
        assert!(ModelError::RiskOutOfRange(140).to_string().contains("140"));
    }
}
