use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use faer::c64;
use log::info;

use krets_result::{write_ac_results_to_parquet, write_op_results_to_parquet, write_tran_results_to_parquet};
use krets_solver::config::SolverConfig;
use krets_solver::prelude::{Backing, Circuit};

/// Krets is a SPICE-like circuit simulator written in Rust.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file to simulate.
    netlist: PathBuf,

    /// Where to write results. Defaults to `result.parquet` next to the netlist.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Linear system backend.
    #[arg(long, value_enum, default_value_t = BackingArg::Sparse)]
    backing: BackingArg,

    /// Maximum Newton iterations before giving up.
    #[arg(long, default_value_t = 300)]
    max_iterations: usize,

    /// Dump the assembled linear system after solving.
    #[arg(long)]
    debug_trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// DC operating-point analysis.
    Dc,
    /// Transient simulation via trapezoidal companion models.
    Transient {
        /// Variables to record, comma-separated.
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        /// End time in seconds.
        #[arg(long)]
        end_time: f64,
        /// Time to start recording from, in seconds.
        #[arg(long, default_value_t = 0.0)]
        start_record: f64,
        /// Fixed time step. Defaults to `end_time / 1024`.
        #[arg(long)]
        time_step: Option<f64>,
    },
    /// AC frequency sweep via phasor analysis.
    Ac {
        /// Variables to record, comma-separated.
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        /// Sweep start frequency in Hertz.
        #[arg(long)]
        start_freq: f64,
        /// Sweep end frequency in Hertz.
        #[arg(long)]
        end_freq: f64,
        /// Number of frequency points.
        #[arg(long, default_value_t = 50)]
        steps: usize,
        /// Use a logarithmic (decade) sweep instead of linear.
        #[arg(long)]
        log_scale: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackingArg {
    Dense,
    Sparse,
}

impl From<BackingArg> for Backing {
    fn from(value: BackingArg) -> Self {
        match value {
            BackingArg::Dense => Backing::Dense,
            BackingArg::Sparse => Backing::Sparse,
        }
    }
}

fn output_path(args: &Args) -> PathBuf {
    args.output.clone().unwrap_or_else(|| {
        args.netlist
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("result.parquet")
    })
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let netlist_text = std::fs::read_to_string(&args.netlist).unwrap_or_else(|e| {
        eprintln!("Error reading netlist '{}': {e}", args.netlist.display());
        std::process::exit(1);
    });

    let mut circuit = Circuit::from_netlist(&netlist_text).unwrap_or_else(|e| {
        eprintln!("Error parsing netlist '{}': {e}", args.netlist.display());
        std::process::exit(1);
    });

    let config = SolverConfig {
        backing: args.backing.into(),
        maximum_iterations: args.max_iterations,
    };
    let output = output_path(&args);

    match &args.command {
        Command::Dc => {
            let solution = circuit
                .dc_analysis(config.backing, config.maximum_iterations, args.debug_trace)
                .unwrap_or_else(|e| {
                    eprintln!("Error during DC analysis: {e}");
                    std::process::exit(1);
                });
            println!("Running DC analysis on '{}'...", args.netlist.display());
            write_op_results_to_parquet(&solution, &output.to_string_lossy()).unwrap_or_else(|e| {
                eprintln!("Error writing DC results to Parquet: {e}");
                std::process::exit(1);
            });
        }
        Command::Transient {
            variables,
            end_time,
            start_record,
            time_step,
        } => {
            println!(
                "Running transient analysis on '{}'...",
                args.netlist.display()
            );
            let (timestamps, series) = circuit
                .transient_simulation(
                    *start_record,
                    *end_time,
                    variables,
                    *time_step,
                    config.backing,
                    config.maximum_iterations,
                    args.debug_trace,
                )
                .unwrap_or_else(|e| {
                    eprintln!("Error during transient analysis: {e}");
                    std::process::exit(1);
                });

            let rows = timestamps
                .iter()
                .enumerate()
                .map(|(i, &t)| {
                    let mut row = HashMap::with_capacity(variables.len() + 1);
                    row.insert("time".to_string(), t);
                    for (name, values) in variables.iter().zip(&series) {
                        row.insert(name.clone(), values[i]);
                    }
                    row
                })
                .collect::<Vec<_>>();

            write_tran_results_to_parquet(&rows, &output.to_string_lossy()).unwrap_or_else(|e| {
                eprintln!("Error writing transient results to Parquet: {e}");
                std::process::exit(1);
            });
        }
        Command::Ac {
            variables,
            start_freq,
            end_freq,
            steps,
            log_scale,
        } => {
            println!("Running AC sweep on '{}'...", args.netlist.display());
            let (freqs, series) = circuit
                .ac_sweep(
                    variables,
                    *start_freq,
                    *end_freq,
                    *steps,
                    *log_scale,
                    config.backing,
                    config.maximum_iterations,
                    args.debug_trace,
                )
                .unwrap_or_else(|e| {
                    eprintln!("Error during AC sweep: {e}");
                    std::process::exit(1);
                });

            let rows = freqs
                .iter()
                .enumerate()
                .map(|(i, &f)| {
                    let mut row: HashMap<String, c64> = HashMap::with_capacity(variables.len() + 1);
                    row.insert("frequency".to_string(), c64::new(f, 0.0));
                    for (name, values) in variables.iter().zip(&series) {
                        row.insert(name.clone(), values[i]);
                    }
                    row
                })
                .collect::<Vec<_>>();

            write_ac_results_to_parquet(&rows, &output.to_string_lossy()).unwrap_or_else(|e| {
                eprintln!("Error writing AC results to Parquet: {e}");
                std::process::exit(1);
            });
        }
    }

    info!("wrote results to {}", output.display());
}
