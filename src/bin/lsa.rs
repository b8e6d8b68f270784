//! LSA command line - run analyses on model files and inspect them

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lsa_solver::dofs::DofMap;
use lsa_solver::prelude::*;
use lsa_solver::report::write_atomic;

#[derive(Parser)]
#[command(name = "lsa")]
#[command(version, about = "Linear static analysis of frames, trusses and grids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a model and write `<model>_results.txt` beside it.
    Run {
        /// Path to the model document (JSON).
        model: PathBuf,

        /// Analysis type (static-linear, static-nonlinear, dynamic-linear,
        /// dynamic-nonlinear, frequency-domain, buckling).
        #[arg(short, long, default_value = "static-linear")]
        analysis: AnalysisType,

        /// Analysis options file (JSON); missing fields keep their defaults.
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Append the run log to this file.
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Write the report here instead of beside the model.
        #[arg(short, long, conflicts_with = "no_report")]
        report: Option<PathBuf>,

        /// Do not write a report.
        #[arg(long)]
        no_report: bool,

        /// Renumber nodes to reduce the half-bandwidth.
        #[arg(long)]
        renumber: bool,

        /// Fail instead of substituting the reference solution when the
        /// banded solver disagrees with it.
        #[arg(long)]
        strict: bool,

        /// Also export the results as JSON to this file.
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print node coordinates and member connectivity as JSON.
    Geometry {
        /// Path to the model document (JSON).
        model: PathBuf,
    },

    /// Validate a model and report its size without solving it.
    Check {
        /// Path to the model document (JSON).
        model: PathBuf,
    },
}

struct RunArgs {
    model: PathBuf,
    analysis: AnalysisType,
    options: Option<PathBuf>,
    log: Option<PathBuf>,
    report: Option<PathBuf>,
    no_report: bool,
    renumber: bool,
    strict: bool,
    json: Option<PathBuf>,
}

fn load(path: &Path) -> Result<StructuralModel> {
    load_model(path).with_context(|| format!("Failed to load model {}", path.display()))
}

fn run_command(args: RunArgs) -> Result<()> {
    let model = load(&args.model)?;

    let mut options = match &args.options {
        Some(path) => AnalysisOptions::from_json_file(path)
            .with_context(|| format!("Failed to read options {}", path.display()))?,
        None => AnalysisOptions::default(),
    };
    if let Some(report) = args.report {
        options = options.with_report_path(report);
    }
    if args.no_report {
        options.write_report = false;
    }
    if args.renumber {
        options.renumber_nodes = true;
    }
    if args.strict {
        options.solver.on_discrepancy = DiscrepancyPolicy::Fail;
    }

    let mut log = match &args.log {
        Some(path) => RunLog::append_to(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => RunLog::new(),
    };

    let outcome = run(&model, args.analysis, &options, Some(&mut log))
        .with_context(|| format!("{} of '{}' failed", args.analysis, args.model.display()))?;

    match &outcome {
        RunOutcome::NotImplemented(analysis) => {
            println!("{analysis} is not yet implemented; nothing was computed");
        }
        RunOutcome::Completed {
            results,
            report_path,
        } => {
            let s = &results.summary;
            println!("{} ({})", results.title, results.kind.name());
            println!("  DOFs:             {} ({} free)", s.total_dofs, s.free_dofs);
            println!("  Solver path:      {}", results.solver_path);
            println!(
                "  Max displacement: {:.6e} at node {}",
                s.max_displacement, s.max_disp_node
            );
            println!(
                "  Max axial force:  {:.6e} in member {}",
                s.max_axial, s.max_axial_member
            );

            if let Some(path) = &args.json {
                write_atomic(path, &results.to_json()?)
                    .with_context(|| format!("Failed to export results to {}", path.display()))?;
                eprintln!("JSON:   {}", path.display());
            }
            if let Some(path) = report_path {
                eprintln!("Report: {}", path.display());
            }
        }
    }

    if let Some(err) = log.sink_error() {
        eprintln!("Warning: run log file incomplete: {err}");
    }
    Ok(())
}

fn geometry_command(path: &Path) -> Result<()> {
    let model = load(path)?;
    println!("{}", serde_json::to_string_pretty(&model.geometry())?);
    Ok(())
}

fn check_command(path: &Path) -> Result<()> {
    let model = load(path)?;
    model
        .validate()
        .with_context(|| format!("Model {} is not analysable", path.display()))?;

    let plain = DofMap::new(&model);
    let renumbered = DofMap::renumbered(&model);
    println!("{} ({})", model.title, model.kind.name());
    println!("  Nodes:          {}", model.node_count());
    println!("  Members:        {}", model.member_count());
    println!("  DOFs:           {}", plain.total_dofs());
    println!(
        "  Half-bandwidth: {} ({} with --renumber)",
        plain.half_bandwidth(),
        renumbered.half_bandwidth()
    );

    let mut supports: Vec<_> = model.supports().collect();
    supports.sort_by_key(|(node, _)| *node);
    for (node, support) in supports {
        println!("  Support {node}: {}", support.describe());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model,
            analysis,
            options,
            log,
            report,
            no_report,
            renumber,
            strict,
            json,
        } => run_command(RunArgs {
            model,
            analysis,
            options,
            log,
            report,
            no_report,
            renumber,
            strict,
            json,
        }),
        Commands::Geometry { model } => geometry_command(&model),
        Commands::Check { model } => check_command(&model),
    }
}
