//! Feature derivation for landing-outcome classification
//!
//! Builds a numeric design matrix from cleaned launches: numeric columns kept
//! as-is, categorical columns one-hot encoded as `<Column>_<value>` indicator
//! columns over the values observed in the batch (sorted). The `class` column
//! is the target. `Outcome` is the label source and is never a feature;
//! `Date` and `BoosterVersion` are not numeric and are left out.
//!
//! Also provides a seeded train/test split and a standard scaler fitted on
//! the training rows only.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{EtlError, EtlResult};
use crate::models::cleaned::{format_bool, format_float};
use crate::models::CleanedFlightRecord;

/// Categorical columns encoded one-hot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Categorical {
    Orbit,
    LaunchSite,
    GridFins,
    Reused,
    Legs,
}

impl Categorical {
    /// Output order of the indicator column groups
    pub const ALL: [Categorical; 5] = [
        Categorical::Orbit,
        Categorical::LaunchSite,
        Categorical::GridFins,
        Categorical::Reused,
        Categorical::Legs,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Categorical::Orbit => "Orbit",
            Categorical::LaunchSite => "LaunchSite",
            Categorical::GridFins => "GridFins",
            Categorical::Reused => "Reused",
            Categorical::Legs => "Legs",
        }
    }

    /// Level of this column for one record
    pub fn value(&self, record: &CleanedFlightRecord) -> String {
        match self {
            Categorical::Orbit => record.orbit.clone(),
            Categorical::LaunchSite => record.launch_site.clone(),
            Categorical::GridFins => format_bool(record.grid_fins).to_string(),
            Categorical::Reused => format_bool(record.reused).to_string(),
            Categorical::Legs => format_bool(record.legs).to_string(),
        }
    }
}

/// Numeric columns carried through unchanged, in output order
pub const NUMERIC_COLUMNS: [&str; 3] = ["flight_number", "PayloadMass", "Flights"];

/// Target column name used in exported tables
pub const TARGET_COLUMN: &str = "class";

/// Dense feature matrix with a binary target per row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<u8>,
}

impl FeatureMatrix {
    /// One-hot encode a batch of cleaned records; one row per record
    pub fn from_records(records: &[CleanedFlightRecord]) -> Self {
        let levels: Vec<(Categorical, Vec<String>)> = Categorical::ALL
            .iter()
            .map(|&column| {
                let observed: BTreeSet<String> =
                    records.iter().map(|r| column.value(r)).collect();
                (column, observed.into_iter().collect())
            })
            .collect();

        let mut names: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
        for (column, values) in &levels {
            names.extend(values.iter().map(|v| format!("{}_{}", column.column(), v)));
        }

        let rows = records
            .iter()
            .map(|record| {
                let mut row = Vec::with_capacity(names.len());
                row.push(record.flight_number as f64);
                row.push(record.payload_mass);
                row.push(record.flights as f64);
                for (column, values) in &levels {
                    let own = column.value(record);
                    row.extend(values.iter().map(|v| if *v == own { 1.0 } else { 0.0 }));
                }
                row
            })
            .collect();

        Self {
            names,
            rows,
            targets: records.iter().map(|r| r.class).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Subset of rows, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Header and text rows (features then `class`) for CSV export
    pub fn to_table(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let mut header = self.names.clone();
        header.push(TARGET_COLUMN.to_string());

        let rows = self
            .rows
            .iter()
            .zip(&self.targets)
            .map(|(row, target)| {
                let mut cells: Vec<String> = row.iter().map(|v| format_float(*v)).collect();
                cells.push(target.to_string());
                cells
            })
            .collect();

        (header, rows)
    }
}

/// Train and test partitions of one matrix
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: FeatureMatrix,
    pub test: FeatureMatrix,
}

/// Number of test rows: `ceil(test_size * n)`, kept within `[1, n - 1]`
pub fn test_row_count(n: usize, test_size: f64) -> usize {
    let raw = (test_size * n as f64).ceil() as usize;
    raw.clamp(1, n.saturating_sub(1).max(1))
}

/// Shuffle rows with a seeded RNG and hold out a test partition.
///
/// The same seed on the same matrix always yields the same split.
pub fn train_test_split(
    matrix: &FeatureMatrix,
    test_size: f64,
    seed: u64,
) -> EtlResult<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(EtlError::InvalidInput(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if matrix.len() < 2 {
        return Err(EtlError::InvalidInput(format!(
            "need at least 2 rows to split, got {}",
            matrix.len()
        )));
    }

    let mut indices: Vec<usize> = (0..matrix.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = test_row_count(matrix.len(), test_size);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(TrainTestSplit {
        train: matrix.select(train_idx),
        test: matrix.select(test_idx),
    })
}

/// Per-column standardization: `(x - mean) / std`, population std
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    /// Standard deviations; zero-variance columns use 1.0
    pub scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(matrix: &FeatureMatrix) -> EtlResult<Self> {
        if matrix.is_empty() {
            return Err(EtlError::InvalidInput(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }

        let n = matrix.len() as f64;
        let width = matrix.width();
        let mut means = vec![0.0; width];
        for row in &matrix.rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = vec![0.0; width];
        for row in &matrix.rows {
            for ((acc, value), mean) in scales.iter_mut().zip(row).zip(&means) {
                *acc += (value - mean) * (value - mean);
            }
        }
        for scale in &mut scales {
            let std = (*scale / n).sqrt();
            *scale = if std > f64::EPSILON { std } else { 1.0 };
        }

        Ok(Self { means, scales })
    }

    pub fn transform(&self, matrix: &FeatureMatrix) -> EtlResult<FeatureMatrix> {
        if matrix.width() != self.means.len() {
            return Err(EtlError::InvalidInput(format!(
                "scaler fitted on {} columns, matrix has {}",
                self.means.len(),
                matrix.width()
            )));
        }

        let rows = matrix
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(value, (mean, scale))| (value - mean) / scale)
                    .collect()
            })
            .collect();

        Ok(FeatureMatrix {
            names: matrix.names.clone(),
            rows,
            targets: matrix.targets.clone(),
        })
    }
}

/// Split, then scale both partitions with statistics from the training rows
pub fn split_and_scale(
    matrix: &FeatureMatrix,
    test_size: f64,
    seed: u64,
) -> EtlResult<(TrainTestSplit, StandardScaler)> {
    let split = train_test_split(matrix, test_size, seed)?;
    let scaler = StandardScaler::fit(&split.train)?;
    let scaled = TrainTestSplit {
        train: scaler.transform(&split.train)?,
        test: scaler.transform(&split.test)?,
    };
    Ok((scaled, scaler))
}
