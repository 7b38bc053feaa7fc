use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{trace, warn};

pub mod file_repository;

/// Four-level vulnerability classification; the discriminant is the tier number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl Severity {
    /// All tiers, most severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn tier(self) -> u8 {
        self as u8
    }

    pub fn from_tier(tier: u8) -> Option<Self> {
        match tier {
            1 => Some(Self::Critical),
            2 => Some(Self::High),
            3 => Some(Self::Medium),
            4 => Some(Self::Low),
            _ => None,
        }
    }

    /// Accepts either a tier number (`"1"`) or a tier name (`"critical"`, any case).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        if let Ok(tier) = key.parse::<u8>() {
            return Self::from_tier(tier);
        }
        match key.to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Finding counts per severity tier. A tier that was never reported is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    pub fn new(critical: u32, high: u32, medium: u32, low: u32) -> Self {
        Self {
            critical,
            high,
            medium,
            low,
        }
    }

    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn set(&mut self, severity: Severity, count: u32) {
        match severity {
            Severity::Critical => self.critical = count,
            Severity::High => self.high = count,
            Severity::Medium => self.medium = count,
            Severity::Low => self.low = count,
        }
    }

    /// Total findings across all tiers.
    pub fn total(&self) -> u64 {
        Severity::ALL
            .iter()
            .map(|severity| u64::from(self.get(*severity)))
            .sum()
    }
}

/// A single breach-database entry.
///
/// An empty `password` means the credential was not recovered, not that the
/// account has no password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeakRecord {
    pub email: String,
    pub password: String,
    pub hashed_password: String,
    pub database_name: String,
    pub leak_date: String,
}

impl LeakRecord {
    pub fn new(email: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            database_name: database_name.into(),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_hashed_password(mut self, hashed: impl Into<String>) -> Self {
        self.hashed_password = hashed.into();
        self
    }

    pub fn with_leak_date(mut self, date: impl Into<String>) -> Self {
        self.leak_date = date.into();
        self
    }

    /// True when the record exposes a recovered cleartext password.
    pub fn has_plaintext_password(&self) -> bool {
        !self.password.is_empty()
    }
}

/// Discovered documents keyed by category label (e.g. `PDF`, `XLS`).
pub type FileInventory = BTreeMap<String, Vec<String>>;

/// Reported financial figures in whole US dollars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Financials {
    pub revenue: Option<f64>,
    pub funding: Option<f64>,
    pub market_cap: Option<f64>,
}

impl Financials {
    pub fn is_populated(&self) -> bool {
        self.revenue.is_some() || self.funding.is_some() || self.market_cap.is_some()
    }

    fn normalized(self) -> Option<Self> {
        let finite = |value: Option<f64>| value.filter(|v| v.is_finite());
        let normalized = Self {
            revenue: finite(self.revenue),
            funding: finite(self.funding),
            market_cap: finite(self.market_cap),
        };
        normalized.is_populated().then_some(normalized)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ContactInfo {
    pub fn is_populated(&self) -> bool {
        self.email.is_some() || self.phone.is_some() || self.address.is_some()
    }

    fn normalized(self) -> Option<Self> {
        let normalized = Self {
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
        };
        normalized.is_populated().then_some(normalized)
    }
}

/// Organization-level facts. Only their presence feeds the completeness checklist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationFacts {
    pub name: Option<String>,
    pub description: Option<String>,
    pub employee_count: Option<u64>,
    pub technologies: Vec<String>,
    pub financials: Option<Financials>,
    pub contact: Option<ContactInfo>,
    pub website_insights: Vec<String>,
}

impl OrganizationFacts {
    fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            description: non_blank(self.description),
            employee_count: self.employee_count,
            technologies: non_blank_items(self.technologies),
            financials: self.financials.and_then(Financials::normalized),
            contact: self.contact.and_then(ContactInfo::normalized),
            website_insights: non_blank_items(self.website_insights),
        }
    }
}

/// Errors raised while decoding a loosely-typed snapshot document.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot document must be an object (got {found})")]
    NotAnObject { found: &'static str },
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable input to every engine component.
///
/// Only constructible through [`SnapshotBuilder`] (directly or via
/// [`OsintSnapshot::from_json_value`]), so optional fields are already
/// normalized when the engine sees them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OsintSnapshot {
    open_ports: Vec<u16>,
    vulnerability_counts: Option<SeverityCounts>,
    leak_records: Vec<LeakRecord>,
    file_inventory: FileInventory,
    organization: OrganizationFacts,
}

impl OsintSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Decode a snapshot from a JSON document.
    ///
    /// Only a non-object document is an error. Null or mistyped sections and
    /// fields are treated as absent and logged.
    pub fn from_json_value(value: Value) -> Result<Self, SnapshotError> {
        let doc = match value {
            Value::Object(doc) => doc,
            other => {
                return Err(SnapshotError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };
        Ok(decode_snapshot(doc).build())
    }

    pub fn from_json_str(input: &str) -> Result<Self, SnapshotError> {
        Self::from_json_value(serde_json::from_str(input)?)
    }

    pub fn open_ports(&self) -> &[u16] {
        &self.open_ports
    }

    /// `None` when the upstream scan produced no vulnerability data at all.
    pub fn vulnerability_counts(&self) -> Option<&SeverityCounts> {
        self.vulnerability_counts.as_ref()
    }

    pub fn leak_records(&self) -> &[LeakRecord] {
        &self.leak_records
    }

    pub fn file_inventory(&self) -> &FileInventory {
        &self.file_inventory
    }

    pub fn organization(&self) -> &OrganizationFacts {
        &self.organization
    }
}

/// The single factory for [`OsintSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    open_ports: Vec<u16>,
    vulnerability_counts: Option<SeverityCounts>,
    leak_records: Vec<LeakRecord>,
    file_inventory: FileInventory,
    organization: OrganizationFacts,
}

impl SnapshotBuilder {
    pub fn open_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.open_ports.extend(ports);
        self
    }

    pub fn vulnerability_counts(mut self, counts: SeverityCounts) -> Self {
        self.vulnerability_counts = Some(counts);
        self
    }

    pub fn leak_record(mut self, record: LeakRecord) -> Self {
        self.leak_records.push(record);
        self
    }

    pub fn leak_records(mut self, records: impl IntoIterator<Item = LeakRecord>) -> Self {
        self.leak_records.extend(records);
        self
    }

    /// Add (or extend) a document category. Empty categories are kept.
    pub fn file_category<I, S>(mut self, category: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_inventory
            .entry(category.into())
            .or_default()
            .extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn organization(mut self, facts: OrganizationFacts) -> Self {
        self.organization = facts;
        self
    }

    pub fn build(self) -> OsintSnapshot {
        let mut open_ports = self.open_ports;
        open_ports.sort_unstable();
        open_ports.dedup();

        OsintSnapshot {
            open_ports,
            vulnerability_counts: self.vulnerability_counts,
            leak_records: self.leak_records,
            file_inventory: self.file_inventory,
            organization: self.organization.normalized(),
        }
    }
}

fn decode_snapshot(mut doc: Map<String, Value>) -> SnapshotBuilder {
    let mut builder = SnapshotBuilder::default()
        .open_ports(decode_ports(take(&mut doc, "openPorts")))
        .leak_records(decode_leak_records(take(&mut doc, "leakRecords")))
        .organization(decode_organization(take(&mut doc, "organization")));

    if let Some(counts) = decode_counts(take(&mut doc, "vulnerabilityCounts")) {
        builder = builder.vulnerability_counts(counts);
    }

    if let Some(inventory) = object_or_absent("fileInventory", take(&mut doc, "fileInventory")) {
        for (category, value) in inventory {
            let urls = decode_urls(&category, value);
            builder = builder.file_category(category, urls);
        }
    }

    builder
}

fn take(map: &mut Map<String, Value>, key: &str) -> Value {
    map.remove(key).unwrap_or(Value::Null)
}

fn object_or_absent(field: &'static str, value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(field, kind = json_kind(&other), "expected an object, treating as absent");
            None
        }
    }
}

fn array_or_empty(field: &'static str, value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!(field, kind = json_kind(&other), "expected an array, treating as empty");
            Vec::new()
        }
    }
}

fn string_or_absent(field: &'static str, value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Null => None,
        other => {
            warn!(field, kind = json_kind(&other), "expected a string, treating as absent");
            None
        }
    }
}

fn u64_or_absent(field: &'static str, value: Value) -> Option<u64> {
    let parsed = match &value {
        Value::Null => return None,
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    if parsed.is_none() {
        warn!(field, value = %value, "expected a non-negative integer, treating as absent");
    }
    parsed
}

fn f64_or_absent(field: &'static str, value: Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Null => None,
        other => {
            warn!(field, kind = json_kind(&other), "expected a number, treating as absent");
            None
        }
    }
}

fn string_items(field: &'static str, value: Value) -> Vec<String> {
    array_or_empty(field, value)
        .into_iter()
        .filter_map(|item| string_or_absent(field, item))
        .collect()
}

fn decode_ports(value: Value) -> Vec<u16> {
    array_or_empty("openPorts", value)
        .into_iter()
        .filter_map(|item| {
            let port = item.as_u64().and_then(|port| u16::try_from(port).ok());
            if port.is_none() {
                warn!(value = %item, "ignoring invalid port");
            }
            port
        })
        .collect()
}

fn decode_leak_records(value: Value) -> Vec<LeakRecord> {
    array_or_empty("leakRecords", value)
        .into_iter()
        .filter_map(|item| object_or_absent("leakRecords[]", item))
        .map(|mut record| {
            let mut text = |field: &'static str, key: &str| {
                string_or_absent(field, take(&mut record, key)).unwrap_or_default()
            };
            LeakRecord {
                email: text("leakRecords[].email", "email"),
                password: text("leakRecords[].password", "password"),
                hashed_password: text("leakRecords[].hashedPassword", "hashedPassword"),
                database_name: text("leakRecords[].databaseName", "databaseName"),
                leak_date: text("leakRecords[].leakDate", "leakDate"),
            }
        })
        .collect()
}

fn decode_organization(value: Value) -> OrganizationFacts {
    let Some(mut org) = object_or_absent("organization", value) else {
        return OrganizationFacts::default();
    };

    let financials = object_or_absent("organization.financials", take(&mut org, "financials"))
        .map(|mut raw| Financials {
            revenue: f64_or_absent("financials.revenue", take(&mut raw, "revenue")),
            funding: f64_or_absent("financials.funding", take(&mut raw, "funding")),
            market_cap: f64_or_absent("financials.marketCap", take(&mut raw, "marketCap")),
        });
    let contact = object_or_absent("organization.contact", take(&mut org, "contact")).map(
        |mut raw| ContactInfo {
            email: string_or_absent("contact.email", take(&mut raw, "email")),
            phone: string_or_absent("contact.phone", take(&mut raw, "phone")),
            address: string_or_absent("contact.address", take(&mut raw, "address")),
        },
    );

    OrganizationFacts {
        name: string_or_absent("organization.name", take(&mut org, "name")),
        description: string_or_absent("organization.description", take(&mut org, "description")),
        employee_count: u64_or_absent(
            "organization.employeeCount",
            take(&mut org, "employeeCount"),
        ),
        technologies: string_items("organization.technologies", take(&mut org, "technologies")),
        financials,
        contact,
        website_insights: string_items(
            "organization.websiteInsights",
            take(&mut org, "websiteInsights"),
        ),
    }
}

fn decode_counts(value: Value) -> Option<SeverityCounts> {
    let raw = object_or_absent("vulnerabilityCounts", value)?;
    let mut counts = SeverityCounts::default();
    for (key, value) in raw {
        let Some(severity) = Severity::from_key(&key) else {
            warn!(tier = %key, "ignoring unknown severity tier");
            continue;
        };
        let count = match &value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Value::Null => 0,
            other => {
                warn!(tier = %key, kind = json_kind(other), "non-numeric severity count treated as 0");
                0
            }
        };
        if count < 0 {
            warn!(tier = %key, count, "negative severity count clamped to 0");
        }
        let clamped = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
        counts.set(severity, clamped);
    }
    Some(counts)
}

fn decode_urls(category: &str, value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(url) => url,
                other => other.to_string(),
            })
            .collect(),
        other => {
            trace!(category, kind = json_kind(&other), "non-sequence file category");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_blank_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
