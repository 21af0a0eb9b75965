//! Persisted configuration records accept any content

use dts_model::{ConfigType, SimulationResult, TestConfiguration, TrafficProfile, Zone};
use proptest::prelude::*;

proptest! {
    #[test]
    fn any_content_is_accepted(
        kind in proptest::sample::select(ConfigType::ALL.to_vec()),
        content in any::<String>(),
    ) {
        let config = TestConfiguration::new(kind, content.clone());
        let decoded = TestConfiguration::from_json(&config.to_json().unwrap()).unwrap();
        prop_assert_eq!(decoded.config_content, content);
        prop_assert_eq!(decoded.config_type, kind);
    }

    #[test]
    fn risk_range_is_checked(score in any::<u8>()) {
        let result = SimulationResult::new(score, Default::default());
        prop_assert_eq!(result.validate().is_ok(), score <= 100);
    }
}

#[test]
fn record_shape_matches_slot_format() {
    let json = r#"{
        "configType": "firewall",
        "configContent": "allow tcp 443",
        "selectedZone": "us-west",
        "replicateZone": true,
        "trafficProfile": "burst-100",
        "timestamp": "2024-05-10T14:32:00Z"
    }"#;
    let config = TestConfiguration::from_json(json).unwrap();
    assert_eq!(config.config_type, ConfigType::Firewall);
    assert_eq!(config.selected_zone, Zone::UsWest);
    assert!(config.replicate_zone);
    assert_eq!(config.traffic_profile, TrafficProfile::Burst100);
    assert_eq!(config.traffic_profile.burst_percent(), Some(100));
}

#[test]
fn unknown_zone_is_rejected() {
    let json = r#"{"configType":"dns","configContent":"","selectedZone":"mars",
        "replicateZone":false,"trafficProfile":"normal","timestamp":"2024-05-10T14:32:00Z"}"#;
    assert!(TestConfiguration::from_json(json).is_err());
}
