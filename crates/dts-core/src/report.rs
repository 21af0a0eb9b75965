//! Impact report
//!
//! Pure view over the current result; rendering never mutates anything.

use chrono::{DateTime, Utc};
use dts_model::{AffectedService, ConfigDiff, SimulationResult};
use std::fmt::Write;

/// Risk band derived from the risk score (higher score is safer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskBand {
    /// Score 80 and above
    Low,
    /// Score 50 to 79
    Moderate,
    /// Score below 50
    High,
}

impl RiskBand {
    /// Band for a risk score
    #[inline]
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => RiskBand::Low,
            50..=79 => RiskBand::Moderate,
            _ => RiskBand::High,
        }
    }

    #[inline]
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low risk",
            RiskBand::Moderate => "Moderate risk",
            RiskBand::High => "High risk",
        }
    }
}

/// Rendered analysis of a simulation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactReport {
    pub risk_score: u8,
    pub band: RiskBand,
    pub config_diff: ConfigDiff,
    pub services: Vec<AffectedService>,
    pub major_impacts: usize,
    pub minor_impacts: usize,
    pub critical_issues: u32,
    pub warnings: u32,
    pub recommendation: &'static str,
    pub completed_at: DateTime<Utc>,
}

impl ImpactReport {
    /// Build the report, `None` when there is no result
    #[must_use]
    pub fn from_result(result: Option<&SimulationResult>) -> Option<Self> {
        let result = result?;
        let band = RiskBand::from_score(result.risk_score);
        let major_impacts = result.major_impacts().count();
        let minor_impacts = result.minor_impacts().count();

        let recommendation = if result.critical_issues > 0 || band == RiskBand::High {
            "Do not deploy: resolve critical issues and re-run the simulation"
        } else if band == RiskBand::Moderate || major_impacts > 0 {
            "Deploy with caution: schedule a maintenance window and monitor affected services"
        } else {
            "Safe to deploy: no significant impact detected"
        };

        Some(Self {
            risk_score: result.risk_score,
            band,
            config_diff: result.config_diff,
            services: result.affected_services.clone(),
            major_impacts,
            minor_impacts,
            critical_issues: result.critical_issues,
            warnings: result.warnings,
            recommendation,
            completed_at: result.timestamp,
        })
    }

    /// Plain-text rendering
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Impact Analysis ({})", self.completed_at.to_rfc3339());
        let _ = writeln!(out, "Risk score: {}/100 ({})", self.risk_score, self.band.label());
        let _ = writeln!(
            out,
            "Configuration diff: +{} -{} ~{}",
            self.config_diff.added, self.config_diff.removed, self.config_diff.modified
        );
        let _ = writeln!(
            out,
            "Critical issues: {}  Warnings: {}",
            self.critical_issues, self.warnings
        );
        let _ = writeln!(out, "Affected services:");
        if self.services.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for service in &self.services {
            let _ = writeln!(out, "  - {:<28} {}", service.name, service.impact);
        }
        let _ = writeln!(out, "Recommendation: {}", self.recommendation);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dts_model::Impact;

    fn result(score: u8, critical: u32, services: Vec<AffectedService>) -> SimulationResult {
        SimulationResult::new(score, ConfigDiff::new(2, 1, 0))
            .with_services(services)
            .with_issues(critical, 0)
    }

    #[test]
    fn no_result_no_report() {
        assert!(ImpactReport::from_result(None).is_none());
    }

    #[test]
    fn bands() {
        assert_eq!(RiskBand::from_score(100), RiskBand::Low);
        assert_eq!(RiskBand::from_score(80), RiskBand::Low);
        assert_eq!(RiskBand::from_score(79), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(50), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(49), RiskBand::High);
        assert_eq!(RiskBand::from_score(0), RiskBand::High);
    }

    #[test]
    fn recommendations() {
        let safe = ImpactReport::from_result(Some(&result(90, 0, vec![]))).unwrap();
        assert!(safe.recommendation.starts_with("Safe"));

        let major = result(90, 0, vec![AffectedService::new("DB", Impact::Major)]);
        let caution = ImpactReport::from_result(Some(&major)).unwrap();
        assert!(caution.recommendation.starts_with("Deploy with caution"));
        assert_eq!(caution.major_impacts, 1);

        let blocked = ImpactReport::from_result(Some(&result(95, 1, vec![]))).unwrap();
        assert!(blocked.recommendation.starts_with("Do not deploy"));
    }

    #[test]
    fn render_lists_services() {
        let r = result(
            70,
            0,
            vec![
                AffectedService::new("API Gateway", Impact::None),
                AffectedService::new("Load Balancer", Impact::Minor),
            ],
        );
        let text = ImpactReport::from_result(Some(&r)).unwrap().render();
        assert!(text.contains("Risk score: 70/100 (Moderate risk)"));
        assert!(text.contains("API Gateway"));
        assert!(text.contains("minor"));
        assert!(text.contains("+2 -1 ~0"));
    }
}
