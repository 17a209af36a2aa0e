//! Per-function activity timeline

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use crate::profile::record::TransactionRecord;

/// Occurrence times of one function, in record order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSeries {
    pub function: String,
    pub timestamps: Vec<DateTime<Utc>>,
}

/// Function name -> ordered timestamps, functions in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineSeries {
    series: Vec<FunctionSeries>,
    /// function -> index into `series`
    index: HashMap<String, usize>,
}

impl TimelineSeries {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        records
            .iter()
            .filter(|r| r.has_function())
            .fold(Self::default(), |mut timeline, record| {
                match timeline.index.get(&record.function) {
                    Some(&idx) => timeline.series[idx].timestamps.push(record.timestamp),
                    None => {
                        timeline.index.insert(record.function.clone(), timeline.series.len());
                        timeline.series.push(FunctionSeries {
                            function: record.function.clone(),
                            timestamps: vec![record.timestamp],
                        });
                    }
                }
                timeline
            })
    }

    pub fn get(&self, function: &str) -> Option<&[DateTime<Utc>]> {
        self.index
            .get(function)
            .map(|&idx| self.series[idx].timestamps.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSeries> {
        self.series.iter()
    }

    /// Number of distinct functions
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// Serialized as {"Module::function": ["2024-01-01T00:00:00Z", ...], ...}
impl Serialize for TimelineSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len()))?;
        for series in &self.series {
            let iso: Vec<String> = series
                .timestamps
                .iter()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                .collect();
            map.serialize_entry(&series.function, &iso)?;
        }
        map.end()
    }
}
