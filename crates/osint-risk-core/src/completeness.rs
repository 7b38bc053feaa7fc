use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::rounded_percent;
use crate::snapshot::OsintSnapshot;

/// Bumped whenever a probe is added or removed, since that changes the denominator.
pub const CHECKLIST_VERSION: u32 = 1;

/// One expected intelligence section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    OpenPorts,
    Vulnerabilities,
    Description,
    EmployeeCount,
    Technologies,
    Financials,
    ContactInfo,
    WebsiteInsights,
    LeakRecords,
    Documents,
}

impl Probe {
    pub const ALL: [Probe; 10] = [
        Probe::OpenPorts,
        Probe::Vulnerabilities,
        Probe::Description,
        Probe::EmployeeCount,
        Probe::Technologies,
        Probe::Financials,
        Probe::ContactInfo,
        Probe::WebsiteInsights,
        Probe::LeakRecords,
        Probe::Documents,
    ];

    /// Whether the snapshot carries data for this section.
    pub fn is_present(self, snapshot: &OsintSnapshot) -> bool {
        let org = snapshot.organization();
        match self {
            Self::OpenPorts => !snapshot.open_ports().is_empty(),
            Self::Vulnerabilities => snapshot.vulnerability_counts().is_some(),
            Self::Description => org.description.is_some(),
            Self::EmployeeCount => org.employee_count.is_some(),
            Self::Technologies => !org.technologies.is_empty(),
            Self::Financials => org.financials.is_some(),
            Self::ContactInfo => org.contact.is_some(),
            Self::WebsiteInsights => !org.website_insights.is_empty(),
            Self::LeakRecords => !snapshot.leak_records().is_empty(),
            Self::Documents => snapshot
                .file_inventory()
                .values()
                .any(|urls| !urls.is_empty()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenPorts => "open ports",
            Self::Vulnerabilities => "vulnerabilities",
            Self::Description => "description",
            Self::EmployeeCount => "employee count",
            Self::Technologies => "technologies",
            Self::Financials => "financials",
            Self::ContactInfo => "contact info",
            Self::WebsiteInsights => "website insights",
            Self::LeakRecords => "leak records",
            Self::Documents => "documents",
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub probe: Probe,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Share of populated sections, `0..=100`.
    pub percentage: u8,
    pub probes: Vec<ProbeResult>,
}

impl CompletenessReport {
    pub fn missing(&self) -> impl Iterator<Item = Probe> + '_ {
        self.probes
            .iter()
            .filter(|result| !result.present)
            .map(|result| result.probe)
    }
}

pub fn completeness(snapshot: &OsintSnapshot) -> CompletenessReport {
    let probes: Vec<_> = Probe::ALL
        .iter()
        .map(|probe| ProbeResult {
            probe: *probe,
            present: probe.is_present(snapshot),
        })
        .collect();
    let populated = probes.iter().filter(|result| result.present).count() as u64;
    CompletenessReport {
        percentage: rounded_percent(populated, Probe::ALL.len() as u64),
        probes,
    }
}
