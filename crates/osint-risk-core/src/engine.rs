use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::completeness::{completeness, CompletenessReport, CHECKLIST_VERSION};
use crate::documents::{summarize, DocumentInventorySummary};
use crate::format::{abbreviate_number, format_currency, format_phone, truncate_text};
use crate::leaks::{aggregate, LeakStats};
use crate::scoring::{
    distribution, score_with_config, ConfigValidationError, RiskAssessment, ScoringConfig,
    SeverityDistribution,
};
use crate::snapshot::{OrganizationFacts, OsintSnapshot};

const DESCRIPTION_CAP: usize = 120;

/// Display-ready organization facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub employees: Option<String>,
    pub revenue: Option<String>,
    pub funding: Option<String>,
    pub market_cap: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl OrganizationProfile {
    fn from_facts(facts: &OrganizationFacts) -> Self {
        let financials = facts.financials.as_ref();
        let contact = facts.contact.as_ref();
        Self {
            name: facts.name.clone(),
            description: facts
                .description
                .as_deref()
                .map(|text| truncate_text(text, DESCRIPTION_CAP)),
            employees: facts.employee_count.map(abbreviate_number),
            revenue: financials.and_then(|f| f.revenue).map(format_currency),
            funding: financials.and_then(|f| f.funding).map(format_currency),
            market_cap: financials.and_then(|f| f.market_cap).map(format_currency),
            phone: contact
                .and_then(|c| c.phone.as_deref())
                .map(format_phone),
            email: contact.and_then(|c| c.email.clone()),
        }
    }
}

/// Every derived metric for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub risk: RiskAssessment,
    pub distribution: SeverityDistribution,
    pub leaks: LeakStats,
    pub completeness: CompletenessReport,
    pub documents: DocumentInventorySummary,
    pub profile: OrganizationProfile,
    pub checklist_version: u32,
}

/// Runs every component over a snapshot. Holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: ScoringConfig,
}

impl RiskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, snapshot: &OsintSnapshot) -> RiskAssessment {
        score_with_config(snapshot.vulnerability_counts(), &self.config)
    }

    #[instrument(
        name = "assess_snapshot",
        skip(self, snapshot),
        fields(leaks = snapshot.leak_records().len())
    )]
    pub fn assess(&self, snapshot: &OsintSnapshot) -> IntelligenceReport {
        let risk = self.score(snapshot);
        trace!(score = risk.score, label = %risk.label, "vulnerabilities scored");

        let report = IntelligenceReport {
            risk,
            distribution: distribution(snapshot.vulnerability_counts()),
            leaks: aggregate(snapshot.leak_records()),
            completeness: completeness(snapshot),
            documents: summarize(snapshot.file_inventory()),
            profile: OrganizationProfile::from_facts(snapshot.organization()),
            checklist_version: CHECKLIST_VERSION,
        };
        debug!(
            score = report.risk.score,
            completeness = report.completeness.percentage,
            documents = report.documents.total_count,
            "assessment completed"
        );
        report
    }
}
