use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::snapshot::LeakRecord;

/// Calendar date format used by breach feeds.
pub const LEAK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Summary statistics over a set of breach records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakStats {
    pub total_records: usize,
    pub unique_emails: usize,
    pub unique_databases: usize,
    pub has_plaintext_password_exposure: bool,
    /// Latest parseable `leak_date` across all records.
    pub most_recent_leak: Option<NaiveDate>,
}

/// Aggregate breach records into counts. Independent of input order.
///
/// Emails and database names are compared case-sensitively, and every empty
/// email collapses into a single unique value. Callers that do not want that
/// should drop empty emails before aggregating.
pub fn aggregate(records: &[LeakRecord]) -> LeakStats {
    let unique_emails: HashSet<&str> = records.iter().map(|r| r.email.as_str()).collect();
    let unique_databases: HashSet<&str> =
        records.iter().map(|r| r.database_name.as_str()).collect();

    LeakStats {
        total_records: records.len(),
        unique_emails: unique_emails.len(),
        unique_databases: unique_databases.len(),
        has_plaintext_password_exposure: records.iter().any(LeakRecord::has_plaintext_password),
        most_recent_leak: records
            .iter()
            .filter_map(|r| parse_leak_date(&r.leak_date))
            .max(),
    }
}

pub fn parse_leak_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), LEAK_DATE_FORMAT).ok()
}
