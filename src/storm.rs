use nalgebra::DVector;

use crate::error::{HydrographError, Result};

// Observed storm event: rainfall and streamflow sharing one time index.
// Columns are only built through `new` and `template`, so they always align.
#[derive(Clone, Debug, PartialEq)]
pub struct StormRecord {
    time: DVector<f64>,      // Time since start of record [hr]
    rainfall: DVector<f64>,  // Rainfall intensity [in/hr]
    discharge: DVector<f64>, // Total streamflow [cfs]
}

impl StormRecord {
    /// Builds a record from three aligned columns.
    ///
    /// Fails fast when the columns are empty, differ in length, hold
    /// non-finite values, or when time is not strictly increasing. The time
    /// step itself is not required to be uniform.
    pub fn new(time: Vec<f64>, rainfall: Vec<f64>, discharge: Vec<f64>) -> Result<Self> {
        if time.is_empty() {
            return Err(HydrographError::InvalidInput(
                "storm record contains no samples".to_string(),
            ));
        }
        if rainfall.len() != time.len() {
            return Err(HydrographError::LengthMismatch {
                column: "rainfall",
                expected: time.len(),
                actual: rainfall.len(),
            });
        }
        if discharge.len() != time.len() {
            return Err(HydrographError::LengthMismatch {
                column: "discharge",
                expected: time.len(),
                actual: discharge.len(),
            });
        }

        for (column, values) in [
            ("time", &time),
            ("rainfall", &rainfall),
            ("discharge", &discharge),
        ] {
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(HydrographError::InvalidInput(format!(
                    "{} value at row {} is not a finite number",
                    column, row
                )));
            }
        }

        if let Some(row) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(HydrographError::InvalidInput(format!(
                "time must be strictly increasing, but row {} ({}) does not follow row {} ({})",
                row + 1,
                time[row + 1],
                row,
                time[row]
            )));
        }

        Ok(StormRecord {
            time: DVector::from_vec(time),
            rainfall: DVector::from_vec(rainfall),
            discharge: DVector::from_vec(discharge),
        })
    }

    // Example storm handed out as the CSV template: 12 hourly samples
    pub fn template() -> Self {
        StormRecord {
            time: DVector::from_iterator(12, (0..12).map(f64::from)),
            rainfall: DVector::from_vec(vec![
                0.0, 0.5, 1.5, 1.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            ]),
            discharge: DVector::from_vec(vec![
                100.0, 100.0, 300.0, 700.0, 1000.0, 800.0, 600.0, 400.0, 300.0, 200.0, 100.0,
                100.0,
            ]),
        }
    }

    pub fn time(&self) -> &DVector<f64> {
        &self.time
    }

    pub fn rainfall(&self) -> &DVector<f64> {
        &self.rainfall
    }

    pub fn discharge(&self) -> &DVector<f64> {
        &self.discharge
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
