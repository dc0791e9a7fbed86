// src/expected_table.rs
use chrono::Duration;
use std::collections::BTreeMap;

// Standard time per unit for each process on the floor, in seconds
const STANDARD_EXPECTED_UPT: [(&str, i64); 15] = [
    ("Confirmation", 4 * 60 + 37),
    ("Line-Item", 60 + 53),
    ("Order Entry", 4 * 60 + 10),
    ("Prep Report", 75 * 60),
    ("Complaint Report", 15 * 60),
    ("QC Report", 140 * 60),
    ("Dairy Purchase", 15 * 60),
    ("Sales @9", 12 * 60),
    ("MOV", 7 * 60),
    ("Collate Report", 10 * 60),
    ("E-FOOD", 4 * 60 + 37),
    ("UFC", 4 * 60 + 37),
    ("PW", 4 * 60 + 37),
    ("Acquire", 3 * 60 + 42),
    ("G & F", 60),
];

/// Expected per-unit duration by process type.
///
/// Built once and handed to every grouping that needs a standard time.
/// Lookups are exact (case-sensitive) on the process name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedDurationTable {
    entries: BTreeMap<String, Duration>,
}

impl ExpectedDurationTable {
    /// The production floor's standard table.
    pub fn standard() -> Self {
        Self::from_entries(
            STANDARD_EXPECTED_UPT
                .iter()
                .map(|(process, seconds)| (process.to_string(), Duration::seconds(*seconds))),
        )
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Duration)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, process: &str) -> Option<Duration> {
        self.entries.get(process).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
