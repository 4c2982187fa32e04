use std::fs;
use std::path::{Path, PathBuf};

use approx::abs_diff_eq;
use serde::Deserialize;

use crate::error::{HydrographError, Result};

// Net rainfall depths within this distance of zero are treated as no rainfall [in]
pub const DEFAULT_MIN_NET_DEPTH: f64 = 1e-9;

// Scalar parameters applied uniformly to every sample of a storm
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParams {
    pub infiltration_rate: f64, // Constant loss rate f [in/hr]
    pub baseflow: f64,          // Background streamflow [cfs]
    pub min_net_depth: f64,     // Degenerate-depth tolerance [in]
}

impl TransformParams {
    pub fn new(infiltration_rate: f64, baseflow: f64) -> Self {
        TransformParams {
            infiltration_rate,
            baseflow,
            min_net_depth: DEFAULT_MIN_NET_DEPTH,
        }
    }

    pub fn with_min_net_depth(mut self, min_net_depth: f64) -> Self {
        self.min_net_depth = min_net_depth;
        self
    }

    // True when the depth is too close to zero to normalize by
    pub fn is_degenerate(&self, net_rainfall_depth: f64) -> bool {
        abs_diff_eq!(net_rainfall_depth, 0.0, epsilon = self.min_net_depth)
    }
}

/// Parses a scalar entered by the user or passed on the command line.
///
/// Only the form is checked: the text must be a finite real number. Range is
/// left to the caller, so a negative baseflow is accepted.
pub fn parse_parameter(name: &'static str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| HydrographError::InvalidParameter {
            name,
            message: format!("'{}' is not a number", trimmed),
        })?;
    if !value.is_finite() {
        return Err(HydrographError::InvalidParameter {
            name,
            message: format!("'{}' is not a finite number", trimmed),
        });
    }
    Ok(value)
}

/// Run configuration loaded from a TOML file.
///
/// ```toml
/// [parameters]
/// infiltration_rate = 0.25   # in/hr
/// baseflow = 100.0           # cfs
///
/// [io]
/// input = "storm.csv"
/// output = "Computed_UnitHydrograph.csv"
/// ```
///
/// Every key is optional; anything left out is filled from the command line
/// or prompted for. Relative paths are taken relative to the working directory.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HydrographConfig {
    #[serde(default)]
    pub parameters: ParameterSection,
    #[serde(default)]
    pub io: IoSection,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSection {
    pub infiltration_rate: Option<f64>,
    pub baseflow: Option<f64>,
    pub min_net_depth: Option<f64>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoSection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl HydrographConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| HydrographError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, path)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let config: HydrographConfig =
            toml::from_str(contents).map_err(|e| HydrographError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let section = &config.parameters;
        for (key, value) in [
            ("infiltration_rate", section.infiltration_rate),
            ("baseflow", section.baseflow),
            ("min_net_depth", section.min_net_depth),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(HydrographError::Config {
                        path: path.to_path_buf(),
                        message: format!("parameters.{} must be a finite number", key),
                    });
                }
            }
        }
        if section.min_net_depth.is_some_and(|d| d < 0.0) {
            return Err(HydrographError::Config {
                path: path.to_path_buf(),
                message: "parameters.min_net_depth must not be negative".to_string(),
            });
        }

        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }
}
