use std::fmt;

use nalgebra::DVector;

use crate::error::{HydrographError, Result};
use crate::params::TransformParams;
use crate::runoff::{direct_runoff, excess_rainfall, net_rainfall_depth};
use crate::storm::StormRecord;

// Unit hydrograph derived from one storm, with the series it was built from.
// Only `derive` builds one, so every series has the record's length.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitHydrograph {
    record: StormRecord,            // Observed storm the hydrograph came from
    excess_rainfall: DVector<f64>,  // Rainfall above the infiltration rate [in/hr]
    direct_runoff: DVector<f64>,    // Discharge minus baseflow [cfs]
    ordinates: DVector<f64>,        // Direct runoff per inch of net rainfall [cfs/in]
    net_rainfall_depth: f64,        // Total excess rainfall [in]
    peak_ordinate: f64,             // Largest ordinate [cfs/in]
    peak_index: usize,              // First sample reaching the peak
    time_of_peak: f64,              // Time of that sample [hr]
    params: TransformParams,        // Loss rate and baseflow used
}

impl UnitHydrograph {
    /// Derives the 1-inch unit hydrograph of a storm.
    ///
    /// Excess rainfall is taken with a constant infiltration rate, summed into
    /// the net rainfall depth, and the direct runoff is scaled by that depth.
    /// The record is assumed to be on a unit time step.
    ///
    /// # Errors
    /// - `DegenerateInput` when the net rainfall depth is zero or within
    ///   `params.min_net_depth` of it
    /// - `InvalidInput` when the depth, direct runoff or an ordinate overflows
    ///   to a non-finite value
    ///
    /// No ordinates are produced in either case.
    pub fn derive(record: &StormRecord, params: &TransformParams) -> Result<Self> {
        let excess = excess_rainfall(record.rainfall(), params.infiltration_rate);
        let net_depth = net_rainfall_depth(&excess);
        tracing::debug!(
            samples = record.len(),
            infiltration_rate = params.infiltration_rate,
            net_depth,
            "computed excess rainfall"
        );

        if !net_depth.is_finite() {
            return Err(HydrographError::InvalidInput(format!(
                "net rainfall depth overflowed to {}",
                net_depth
            )));
        }
        if params.is_degenerate(net_depth) {
            return Err(HydrographError::DegenerateInput {
                net_rainfall_depth: net_depth,
                infiltration_rate: params.infiltration_rate,
            });
        }

        let runoff = direct_runoff(record.discharge(), params.baseflow);
        let ordinates = &runoff / net_depth;
        for (column, values) in [("direct runoff", &runoff), ("unit hydrograph", &ordinates)] {
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(HydrographError::InvalidInput(format!(
                    "{} at row {} overflowed to {}",
                    column, row, values[row]
                )));
            }
        }

        // argmax keeps the first index on ties
        let (peak_index, peak_ordinate) = ordinates.argmax();
        let time_of_peak = record.time()[peak_index];

        let uh = UnitHydrograph {
            record: record.clone(),
            excess_rainfall: excess,
            direct_runoff: runoff,
            ordinates,
            net_rainfall_depth: net_depth,
            peak_ordinate,
            peak_index,
            time_of_peak,
            params: *params,
        };

        let negative = uh.negative_runoff_indices();
        if !negative.is_empty() {
            tracing::warn!(
                count = negative.len(),
                first_time = uh.time()[negative[0]],
                baseflow = params.baseflow,
                "discharge falls below baseflow; direct runoff is negative at some samples"
            );
        }
        tracing::debug!(peak_ordinate, time_of_peak, "derived unit hydrograph");

        Ok(uh)
    }

    pub fn record(&self) -> &StormRecord {
        &self.record
    }

    pub fn time(&self) -> &DVector<f64> {
        self.record.time()
    }

    pub fn excess_rainfall(&self) -> &DVector<f64> {
        &self.excess_rainfall
    }

    pub fn direct_runoff(&self) -> &DVector<f64> {
        &self.direct_runoff
    }

    pub fn ordinates(&self) -> &DVector<f64> {
        &self.ordinates
    }

    pub fn net_rainfall_depth(&self) -> f64 {
        self.net_rainfall_depth
    }

    pub fn peak_ordinate(&self) -> f64 {
        self.peak_ordinate
    }

    pub fn peak_index(&self) -> usize {
        self.peak_index
    }

    pub fn time_of_peak(&self) -> f64 {
        self.time_of_peak
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    // Samples where observed discharge is below the baseflow
    pub fn negative_runoff_indices(&self) -> Vec<usize> {
        self.direct_runoff
            .iter()
            .enumerate()
            .filter(|(_, q)| **q < 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinates.is_empty()
    }
}

impl fmt::Display for UnitHydrograph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Net rainfall depth = {:.2} inches",
            self.net_rainfall_depth
        )?;
        write!(
            f,
            "Peak of Unit Hydrograph = {:.1} cfs at t = {} hr",
            self.peak_ordinate, self.time_of_peak
        )
    }
}
