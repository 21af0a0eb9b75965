use dts_engine::{phase_label, Phase};
use proptest::prelude::*;

const TABLE: [(u8, u8, &str); 6] = [
    (0, 20, "Creating virtualized environment"),
    (20, 40, "Replicating network topology and endpoints"),
    (40, 60, "Applying configuration changes"),
    (60, 80, "Simulating traffic and analyzing impact"),
    (80, 95, "Running AI analysis on results"),
    (95, 101, "Finalizing report and recommendations"),
];

fn expected(percent: u8) -> &'static str {
    TABLE
        .iter()
        .find(|(lo, hi, _)| percent >= *lo && percent < *hi)
        .map(|(_, _, label)| *label)
        .unwrap()
}

#[test]
fn test_every_percent_matches_table() {
    for percent in 0..=100u8 {
        assert_eq!(phase_label(percent), expected(percent), "percent {percent}");
    }
}

#[test]
fn test_boundaries_open_new_phase() {
    for (percent, phase) in [
        (20, Phase::ReplicatingTopology),
        (40, Phase::ApplyingChanges),
        (60, Phase::SimulatingTraffic),
        (80, Phase::RunningAnalysis),
        (95, Phase::Finalizing),
    ] {
        assert_eq!(Phase::from_percent(percent), phase);
        assert_ne!(Phase::from_percent(percent - 1), phase);
    }
}

proptest! {
    #[test]
    fn prop_label_is_total_and_monotone(a in 0u8..=100, b in 0u8..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo_idx = Phase::ALL.iter().position(|p| *p == Phase::from_percent(lo)).unwrap();
        let hi_idx = Phase::ALL.iter().position(|p| *p == Phase::from_percent(hi)).unwrap();
        prop_assert!(lo_idx <= hi_idx);
        prop_assert!(!phase_label(a).is_empty());
    }
}
