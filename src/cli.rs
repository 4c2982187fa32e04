//! CLI argument parsing and parameter resolution for unit_hydrograph

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{HydrographError, Result};
use crate::params::{HydrographConfig, TransformParams, parse_parameter};

pub const DEFAULT_TEMPLATE_PATH: &str = "UnitHydrograph_Template.csv";
pub const DEFAULT_RESULTS_PATH: &str = "Computed_UnitHydrograph.csv";

const INFILTRATION_PROMPT: &str = "Enter constant infiltration rate f (in/hr): ";
const BASEFLOW_PROMPT: &str = "Enter baseflow (cfs): ";

#[derive(Parser, Debug)]
#[command(name = "unit_hydrograph")]
#[command(version)]
#[command(
    about = "Derive a 1-inch unit hydrograph from observed rainfall and streamflow",
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a CSV template with the expected columns and an example storm
    Template {
        /// Where to write the template
        #[arg(short, long, default_value = DEFAULT_TEMPLATE_PATH)]
        output: PathBuf,
    },

    /// Derive the unit hydrograph of a storm record
    Derive(DeriveArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct DeriveArgs {
    /// CSV with Time_hr, Rainfall_in_hr and Discharge_cfs columns
    pub input: Option<PathBuf>,

    /// Constant infiltration rate f (in/hr); prompted for when not given
    #[arg(short = 'f', long, value_name = "IN_PER_HR", allow_negative_numbers = true, value_parser = parse_infiltration_rate)]
    pub infiltration_rate: Option<f64>,

    /// Baseflow (cfs); prompted for when not given
    #[arg(short, long, value_name = "CFS", allow_negative_numbers = true, value_parser = parse_baseflow)]
    pub baseflow: Option<f64>,

    /// TOML file supplying parameters and paths
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to write the computed table
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the computed table after the summary
    #[arg(long)]
    pub show_table: bool,
}

fn parse_infiltration_rate(s: &str) -> std::result::Result<f64, String> {
    parse_parameter("infiltration rate", s).map_err(|e| e.to_string())
}

fn parse_baseflow(s: &str) -> std::result::Result<f64, String> {
    parse_parameter("baseflow", s).map_err(|e| e.to_string())
}

impl DeriveArgs {
    /// Input CSV from the command line, else from the config file.
    pub fn input_path(&self, config: &HydrographConfig) -> Result<PathBuf> {
        self.input
            .clone()
            .or_else(|| config.io.input.clone())
            .ok_or_else(|| {
                HydrographError::InvalidInput(
                    "no input CSV given on the command line or in the config file".to_string(),
                )
            })
    }

    pub fn output_path(&self, config: &HydrographConfig) -> PathBuf {
        self.output
            .clone()
            .or_else(|| config.io.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_PATH))
    }

    /// Merges scalar flags with the config file, prompting for any still missing.
    ///
    /// Flags win over the config file; the prompt is the last resort. Callers
    /// read the storm record first so a bad file is reported before any prompt.
    pub fn resolve_params<R: BufRead, W: Write>(
        &self,
        config: &HydrographConfig,
        input: &mut R,
        prompt_out: &mut W,
    ) -> Result<TransformParams> {
        let infiltration_rate = match self
            .infiltration_rate
            .or(config.parameters.infiltration_rate)
        {
            Some(v) => v,
            None => prompt_parameter("infiltration rate", INFILTRATION_PROMPT, input, prompt_out)?,
        };
        let baseflow = match self.baseflow.or(config.parameters.baseflow) {
            Some(v) => v,
            None => prompt_parameter("baseflow", BASEFLOW_PROMPT, input, prompt_out)?,
        };

        let mut params = TransformParams::new(infiltration_rate, baseflow);
        if let Some(d) = config.parameters.min_net_depth {
            params = params.with_min_net_depth(d);
        }
        Ok(params)
    }
}

/// Asks for one scalar on `prompt_out` and reads a line from `input`.
pub fn prompt_parameter<R: BufRead, W: Write>(
    name: &'static str,
    message: &str,
    input: &mut R,
    prompt_out: &mut W,
) -> Result<f64> {
    write!(prompt_out, "{}", message)?;
    prompt_out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(HydrographError::InvalidParameter {
            name,
            message: "no value entered".to_string(),
        });
    }
    parse_parameter(name, &line)
}
