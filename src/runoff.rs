/*!
Module for separating excess rainfall and direct runoff from a storm record.

Losses follow the constant-rate infiltration model (f-method / phi-index): every
sample loses the same infiltration rate, and only the remainder becomes runoff.
Direct runoff is what is left of the observed discharge once a constant
baseflow is removed. Units follow the record: rainfall in in/hr, discharge in cfs.

The series are assumed to sit on a unit time step, so the net rainfall depth is
a plain sum of excess intensities with no Δt factor.
*/
use nalgebra::DVector;

/**
Calculates the excess rainfall for each sample with a constant infiltration rate.

# Arguments
* `rainfall` - Rainfall intensity series [in/hr].
* `infiltration_rate` - Constant loss rate f [in/hr].

# Returns
`max(rainfall - f, 0)` at every sample; never negative.
*/
pub fn excess_rainfall(rainfall: &DVector<f64>, infiltration_rate: f64) -> DVector<f64> {
    rainfall.map(|r| (r - infiltration_rate).max(0.0))
}

// Total depth of excess rainfall over the storm [in]
pub fn net_rainfall_depth(excess: &DVector<f64>) -> f64 {
    excess.sum()
}

/**
Calculates direct runoff by removing a constant baseflow from total discharge.

No floor is applied: samples where discharge drops below baseflow come out
negative and are left for the caller to inspect.
*/
pub fn direct_runoff(discharge: &DVector<f64>, baseflow: f64) -> DVector<f64> {
    discharge.map(|q| q - baseflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn excess_rainfall_floors_at_zero() {
        let rainfall = DVector::from_vec(vec![0.0, 0.1, 0.25, 0.5, 1.5]);
        let excess = excess_rainfall(&rainfall, 0.25);
        assert_eq!(excess.as_slice(), &[0.0, 0.0, 0.0, 0.25, 1.25]);
    }

    #[test]
    fn zero_infiltration_keeps_all_rainfall() {
        let rainfall = DVector::from_vec(vec![0.0, 0.3, 0.7]);
        assert_eq!(excess_rainfall(&rainfall, 0.0), rainfall);
    }

    #[test]
    fn net_depth_is_sum_of_excess() {
        let excess = DVector::from_vec(vec![0.0, 0.25, 1.25, 1.25, 0.25]);
        assert_relative_eq!(net_rainfall_depth(&excess), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn net_depth_of_no_excess_is_zero() {
        let excess = excess_rainfall(&DVector::from_vec(vec![0.1, 0.2, 0.2]), 0.5);
        assert_eq!(net_rainfall_depth(&excess), 0.0);
    }

    #[test]
    fn direct_runoff_is_not_clamped() {
        let discharge = DVector::from_vec(vec![80.0, 100.0, 350.0]);
        let runoff = direct_runoff(&discharge, 100.0);
        assert_eq!(runoff.as_slice(), &[-20.0, 0.0, 250.0]);
    }
}
