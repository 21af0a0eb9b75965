//! Test configuration: the single slot captured before a run
//!
//! The content blob is opaque. Its format is implied by [`ConfigType`] but
//! never validated against it; any text is accepted.

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Kind of configuration under test
    pub enum ConfigType {
        Network => "network",
        Firewall => "firewall",
        Sdwan => "sdwan",
        Dns => "dns",
        Identity => "identity",
        Software => "software",
        Custom => "custom",
    }
}

impl Default for ConfigType {
    fn default() -> Self {
        ConfigType::Network
    }
}

wire_enum! {
    /// Named deployment zone mirrored into the sandbox
    pub enum Zone {
        /// Wildcard covering every zone
        Global => "global",
        UsEast => "us-east",
        UsWest => "us-west",
        EuCentral => "eu-central",
        ApSoutheast => "ap-southeast",
    }
}

impl Zone {
    /// Whether this is the wildcard zone
    #[inline]
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Zone::Global)
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone::Global
    }
}

wire_enum! {
    /// Synthetic traffic replayed against the sandbox
    pub enum TrafficProfile {
        Normal => "normal",
        Burst25 => "burst-25",
        Burst50 => "burst-50",
        Burst100 => "burst-100",
        Security => "security",
        Random => "random",
    }
}

impl TrafficProfile {
    /// Extra load over baseline, in percent, for burst profiles
    #[inline]
    #[must_use]
    pub fn burst_percent(&self) -> Option<u8> {
        match self {
            TrafficProfile::Burst25 => Some(25),
            TrafficProfile::Burst50 => Some(50),
            TrafficProfile::Burst100 => Some(100),
            _ => None,
        }
    }
}

impl Default for TrafficProfile {
    fn default() -> Self {
        TrafficProfile::Normal
    }
}

/// Configuration captured for a deployment test
///
/// Serialises to the persisted record shape:
/// `{configType, configContent, selectedZone, replicateZone, trafficProfile, timestamp}`
/// with an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfiguration {
    /// Kind of configuration
    pub config_type: ConfigType,
    /// Opaque configuration text
    pub config_content: String,
    /// Zone the sandbox targets
    pub selected_zone: Zone,
    /// Mirror live zone topology and traffic into the sandbox
    pub replicate_zone: bool,
    /// Traffic replayed during the run
    pub traffic_profile: TrafficProfile,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
}

impl TestConfiguration {
    /// Create a configuration stamped with the current instant
    #[inline]
    #[must_use]
    pub fn new(config_type: ConfigType, content: impl Into<String>) -> Self {
        Self {
            config_type,
            config_content: content.into(),
            selected_zone: Zone::default(),
            replicate_zone: false,
            traffic_profile: TrafficProfile::default(),
            timestamp: Utc::now(),
        }
    }

    /// With target zone
    #[inline]
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.selected_zone = zone;
        self
    }

    /// With zone replication
    #[inline]
    #[must_use]
    pub fn with_replication(mut self, replicate: bool) -> Self {
        self.replicate_zone = replicate;
        self
    }

    /// With traffic profile
    #[inline]
    #[must_use]
    pub fn with_traffic(mut self, profile: TrafficProfile) -> Self {
        self.traffic_profile = profile;
        self
    }

    /// With explicit timestamp
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Encode as the persisted JSON record
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a persisted JSON record
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}
