// src/history.rs - Per-session record of completed analyses and severity trend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::ConditionKind;
use crate::severity::SeverityLevel;

/// Severity score change beyond which a trend is reported as moving
const TREND_TOLERANCE: i16 = 1;

/// Lightweight snapshot of one completed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub fingerprint: String,
    pub findings: Vec<ConditionKind>,
    pub severity_score: u8,
    pub severity_level: SeverityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Worsening,
    Improving,
    Stable,
}

impl Trend {
    pub fn from_change(change: i16) -> Self {
        if change > TREND_TOLERANCE {
            Trend::Worsening
        } else if change < -TREND_TOLERANCE {
            Trend::Improving
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Worsening => "worsening",
            Trend::Improving => "improving",
            Trend::Stable => "stable",
        }
    }
}

/// Comparison of the latest record against the last differing submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendComparison {
    pub trend: Trend,
    /// Current score minus previous score
    pub severity_change: i16,
    pub previous_timestamp: DateTime<Utc>,
    pub current_timestamp: DateTime<Utc>,
}

/// Append-only analysis history for one session.
///
/// Not synchronised itself; the owner decides how writers are serialised.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    records: Vec<HistoryRecord>,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compare the newest record with the most recent earlier record whose
    /// fingerprint differs. `None` until two distinct submissions exist.
    pub fn trend(&self) -> Option<TrendComparison> {
        let (current, earlier) = self.records.split_last()?;
        let previous = earlier
            .iter()
            .rev()
            .find(|record| record.fingerprint != current.fingerprint)?;

        let severity_change = current.severity_score as i16 - previous.severity_score as i16;

        Some(TrendComparison {
            trend: Trend::from_change(severity_change),
            severity_change,
            previous_timestamp: previous.timestamp,
            current_timestamp: current.timestamp,
        })
    }
}
