//! Classification scoring and landing success summaries

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use crate::error::{EtlError, EtlResult};
use crate::models::CleanedFlightRecord;

/// Binary confusion matrix, positive class = 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> EtlResult<Self> {
        if actual.len() != predicted.len() {
            return Err(EtlError::InvalidInput(format!(
                "label length mismatch: {} actual vs {} predicted",
                actual.len(),
                predicted.len()
            )));
        }

        let mut matrix = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a != 0, p != 0) {
                (true, true) => matrix.true_positive += 1,
                (false, true) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (true, false) => matrix.false_negative += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "                predicted 0  predicted 1")?;
        writeln!(
            f,
            "actual 0  {:>13}  {:>11}",
            self.true_negative, self.false_positive
        )?;
        write!(
            f,
            "actual 1  {:>13}  {:>11}",
            self.false_negative, self.true_positive
        )
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Accuracy, precision, recall and F1 for the positive class.
///
/// Any ratio with a zero denominator is reported as 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationMetrics {
    pub fn from_confusion(m: &ConfusionMatrix) -> Self {
        let accuracy = ratio(m.true_positive + m.true_negative, m.total());
        let precision = ratio(m.true_positive, m.true_positive + m.false_positive);
        let recall = ratio(m.true_positive, m.true_positive + m.false_negative);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }

    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> EtlResult<Self> {
        Ok(Self::from_confusion(&ConfusionMatrix::from_labels(
            actual, predicted,
        )?))
    }
}

/// Column used to group launches in a success-rate summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Category {
    Orbit,
    LaunchSite,
    BoosterVersion,
    Flights,
    Year,
}

impl Category {
    pub fn column(&self) -> &'static str {
        match self {
            Category::Orbit => "Orbit",
            Category::LaunchSite => "LaunchSite",
            Category::BoosterVersion => "BoosterVersion",
            Category::Flights => "Flights",
            Category::Year => "Year",
        }
    }

    fn key(&self, record: &CleanedFlightRecord) -> String {
        match self {
            Category::Orbit => record.orbit.clone(),
            Category::LaunchSite => record.launch_site.clone(),
            Category::BoosterVersion => record
                .booster_version
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            Category::Flights => record.flights.to_string(),
            Category::Year => record
                .date
                .map(|d| d.year().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Landing success rate of one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate {
    pub key: String,
    pub launches: usize,
    pub landings: usize,
    pub rate: f64,
}

/// Mean `class` per group, highest rate first, ties by group name
pub fn success_rate_by(records: &[CleanedFlightRecord], category: Category) -> Vec<GroupRate> {
    let mut groups: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(category.key(record)).or_default();
        entry.0 += 1;
        entry.1 += usize::from(record.class);
    }

    let mut rates: Vec<GroupRate> = groups
        .into_iter()
        .map(|(key, (launches, landings))| GroupRate {
            key,
            launches,
            landings,
            rate: ratio(landings, launches),
        })
        .collect();

    // BTreeMap order is by key, so a stable sort keeps ties alphabetical
    rates.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    rates
}

/// Overall landing success rate of the batch
pub fn overall_success_rate(records: &[CleanedFlightRecord]) -> f64 {
    let landings = records.iter().filter(|r| r.class == 1).count();
    ratio(landings, records.len())
}
