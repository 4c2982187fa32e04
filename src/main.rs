use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use unit_hydrograph::cli::{Cli, Command, DeriveArgs};
use unit_hydrograph::params::HydrographConfig;
use unit_hydrograph::{UnitHydrograph, table};

/// Initialize tracing subscriber; warnings always, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_derive(args: &DeriveArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => HydrographConfig::from_file(path)?,
        None => HydrographConfig::default(),
    };

    let input = args.input_path(&config)?;
    let output = args.output_path(&config);

    // Read the storm before asking for scalars so a bad file fails straight away
    let record = table::read_storm_csv(&input)
        .with_context(|| format!("Failed to read storm record {}", input.display()))?;

    let stdin = io::stdin();
    let params = args.resolve_params(&config, &mut stdin.lock(), &mut io::stdout())?;

    let uh = UnitHydrograph::derive(&record, &params)
        .with_context(|| format!("Failed to derive unit hydrograph for {}", input.display()))?;

    println!();
    println!("Computation complete");
    println!("{}", uh);
    if args.show_table {
        println!();
        print!("{}", table::format_table(&uh));
    }

    table::save_results(&output, &uh)
        .with_context(|| format!("Failed to write results to {}", output.display()))?;
    println!("Results saved as {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match &cli.command {
        Command::Template { output } => {
            table::save_template(output)
                .with_context(|| format!("Failed to write template {}", output.display()))?;
            println!("CSV template generated: {}", output.display());
            println!("Fill in the same 3 columns with your storm data.");
        }
        Command::Derive(args) => run_derive(args)?,
    }
    Ok(())
}
