pub mod completeness;
pub mod documents;
pub mod engine;
pub mod format;
pub mod leaks;
pub mod report;
pub mod scoring;
pub mod snapshot;

pub use completeness::{completeness, CompletenessReport, Probe, ProbeResult, CHECKLIST_VERSION};
pub use documents::{summarize, DocumentInventorySummary};
pub use engine::{IntelligenceReport, OrganizationProfile, RiskEngine};
pub use leaks::{aggregate, LeakStats};
pub use scoring::{
    distribution, score, score_with_config, ColorTier, ConfigValidationError, RiskAssessment,
    RiskLabel, ScoringConfig, SeverityDistribution, SeverityWeights, TierThresholds,
};
pub use snapshot::{
    file_repository::{
        FileSnapshotRepository, InMemorySnapshotRepository, SnapshotFormat, SnapshotRepository,
    },
    ContactInfo, FileInventory, Financials, LeakRecord, OrganizationFacts, OsintSnapshot,
    Severity, SeverityCounts, SnapshotBuilder, SnapshotError,
};
