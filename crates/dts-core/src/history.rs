//! History ledger
//!
//! Append-only log of past runs, browsable without an active run. Records
//! can be deleted one at a time; viewing a record rebuilds a displayable
//! result from its stored summary instead of re-running anything.

use crate::error::HistoryError;
use chrono::{DateTime, TimeZone, Utc};
use dts_model::{
    ConfigDiff, ConfigType, HistoryRecord, HistoryStatus, RecordId, SimulationResult,
    TestConfiguration,
};

/// A history record together with its reconstructed result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    pub record: HistoryRecord,
    /// Result-like object for display; diff and services are not stored
    pub result: SimulationResult,
}

/// Append-only run ledger
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    records: Vec<HistoryRecord>,
}

impl HistoryLedger {
    /// Create empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create ledger seeded with records
    #[inline]
    #[must_use]
    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    /// Append a record
    pub fn append(&mut self, record: HistoryRecord) -> RecordId {
        let id = record.id;
        tracing::debug!(%id, status = %record.status, "history record appended");
        self.records.push(record);
        id
    }

    /// Records, newest first
    #[must_use]
    pub fn list(&self) -> Vec<&HistoryRecord> {
        let mut records: Vec<&HistoryRecord> = self.records.iter().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Look up a record
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove exactly one record
    pub fn delete(&mut self, id: RecordId) -> Result<HistoryRecord, HistoryError> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(HistoryError::NotFound(id))?;
        Ok(self.records.remove(idx))
    }

    /// Rebuild a displayable result for a record
    pub fn view(&self, id: RecordId) -> Result<HistoryView, HistoryError> {
        let record = self.get(id).ok_or(HistoryError::NotFound(id))?;
        let critical = u32::try_from(record.critical_issues.len()).unwrap_or(u32::MAX);
        let result = SimulationResult::new(record.risk_score, ConfigDiff::default())
            .with_issues(critical, 0)
            .with_timestamp(record.timestamp);

        Ok(HistoryView {
            record: record.clone(),
            result,
        })
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Summarise a finished run as a ledger record
///
/// One description per critical issue: major-impact services first, then
/// numbered placeholders for issues the analysis did not attribute.
#[must_use]
pub(crate) fn record_for_run(
    snapshot: &TestConfiguration,
    result: &SimulationResult,
    user: &str,
) -> HistoryRecord {
    let mut attributed = result
        .major_impacts()
        .map(|s| format!("Major impact on {}", s.name));
    let issues: Vec<String> = (1..=result.critical_issues)
        .map(|n| attributed.next().unwrap_or_else(|| format!("Critical issue {n}")))
        .collect();

    HistoryRecord::new(snapshot.config_type, result.risk_score, user, HistoryStatus::Pending)
        .with_issues(issues)
        .with_timestamp(result.timestamp)
}

/// Summarise a failed run as a ledger record
#[must_use]
pub(crate) fn record_for_failure(
    snapshot: &TestConfiguration,
    reason: &dts_model::FailureReason,
    user: &str,
) -> HistoryRecord {
    HistoryRecord::new(snapshot.config_type, 0, user, HistoryStatus::Failed)
        .with_issues([reason.to_string()])
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// Demo seed for a fresh ledger
///
/// Ids are derived from each record's timestamp, so they are the same in
/// every process and can be passed back on a later invocation.
#[must_use]
pub fn sample_records() -> Vec<HistoryRecord> {
    let seed = vec![
        HistoryRecord::new(ConfigType::Firewall, 92, "sarah.johnson", HistoryStatus::Approved)
            .with_timestamp(at(2024, 5, 10, 14, 32)),
        HistoryRecord::new(ConfigType::Sdwan, 78, "michael.chen", HistoryStatus::Pending)
            .with_issues(["Latency increase on branch VPN tunnels"])
            .with_timestamp(at(2024, 5, 9, 11, 15)),
        HistoryRecord::new(ConfigType::Network, 45, "alex.rodriguez", HistoryStatus::Failed)
            .with_issues([
                "Routing loop detected between core switches",
                "Packet loss above 5% under burst traffic",
            ])
            .with_timestamp(at(2024, 5, 8, 16, 45)),
        HistoryRecord::new(ConfigType::Dns, 88, "emily.davis", HistoryStatus::InReview)
            .with_timestamp(at(2024, 5, 7, 9, 20)),
        HistoryRecord::new(ConfigType::Identity, 95, "david.kim", HistoryStatus::Approved)
            .with_timestamp(at(2024, 5, 6, 13, 5)),
    ];

    seed.into_iter()
        .zip(1u128..)
        .map(|(record, sequence)| {
            let millis = u64::try_from(record.timestamp.timestamp_millis()).unwrap_or_default();
            record.with_id(RecordId::from_parts(millis, sequence))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dts_model::{AffectedService, Impact};

    #[test]
    fn sample_ids_are_stable() {
        let ids = |records: Vec<HistoryRecord>| records.iter().map(|r| r.id).collect::<Vec<_>>();
        let first = ids(sample_records());
        assert_eq!(first, ids(sample_records()));

        let mut unique = first.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn sample_ids_resolve_in_a_fresh_ledger() {
        let id = sample_records()[2].id;
        let parsed: RecordId = id.to_string().parse().unwrap();

        let mut ledger = HistoryLedger::with_records(sample_records());
        assert_eq!(ledger.view(parsed).unwrap().record.user, "alex.rodriguez");
        assert!(ledger.delete(parsed).is_ok());
    }

    #[test]
    fn list_is_newest_first() {
        let ledger = HistoryLedger::with_records(sample_records());
        let listed = ledger.list();
        assert_eq!(listed.len(), 5);
        assert!(listed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn delete_unknown_id() {
        let mut ledger = HistoryLedger::with_records(sample_records());
        let err = ledger.delete(RecordId::new()).unwrap_err();
        assert!(matches!(err, HistoryError::NotFound(_)));
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn view_rebuilds_result() {
        let ledger = HistoryLedger::with_records(sample_records());
        let failed = ledger
            .list()
            .into_iter()
            .find(|r| r.status == HistoryStatus::Failed)
            .unwrap()
            .id;

        let view = ledger.view(failed).unwrap();
        assert_eq!(view.result.risk_score, 45);
        assert_eq!(view.result.critical_issues, 2);
        assert_eq!(view.result.timestamp, view.record.timestamp);
        assert!(view.result.affected_services.is_empty());
    }

    #[test]
    fn run_record_describes_each_critical_issue() {
        let snapshot = TestConfiguration::new(ConfigType::Firewall, "deny all");
        let result = SimulationResult::new(40, ConfigDiff::new(1, 0, 0))
            .with_services(vec![
                AffectedService::new("Payments", Impact::Major),
                AffectedService::new("CDN", Impact::Minor),
            ])
            .with_issues(2, 1);

        let record = record_for_run(&snapshot, &result, "ops");
        assert_eq!(record.config_type, ConfigType::Firewall);
        assert_eq!(record.status, HistoryStatus::Pending);
        assert_eq!(
            record.critical_issues,
            vec!["Major impact on Payments".to_string(), "Critical issue 2".to_string()]
        );
        assert_eq!(record.timestamp, result.timestamp);
    }
}
