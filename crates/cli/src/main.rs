#![deny(unsafe_code)]
//! CLI binary for dyeflow.
//!
//! Subcommands:
//! - `run <preset>`: seed dye, advect it N steps, optionally write a PNG
//! - `list`: print available flow presets and their default parameters

mod error;
mod logging;

use clap::{Args, Parser, Subcommand};
use dyeflow_core::{DyeShape, Scenario, Simulation};
use dyeflow_presets::pixel::View;
use dyeflow_presets::FlowPreset;
use error::CliError;
use glam::DVec2;
use std::path::{Path, PathBuf};
use std::process;

/// Fraction of the fitted extent added around the particles in PNG output.
const VIEW_MARGIN: f64 = 0.05;

#[derive(Parser)]
#[command(name = "dyeflow", about = "Steady 2-D flow and dye advection CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log level (error, warn, info, debug, trace); falls back to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Advect dye through a preset flow and report where it ends up.
    Run(RunArgs),
    /// List available flow presets.
    List,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Preset name (e.g. "vortex-quad"). Overrides the scenario's preset.
    preset: Option<String>,

    /// Scenario JSON file to start from.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Preset parameters as a JSON object.
    #[arg(long)]
    params: Option<String>,

    /// Dye shapes as a JSON array, e.g. '[{"kind":"circle","center":[0,0],"radius":0.1,"count":500}]'.
    #[arg(long)]
    dye: Option<String>,

    /// Duration of one outer step.
    #[arg(long)]
    time_step: Option<f64>,

    /// Euler substeps per outer step.
    #[arg(long)]
    substeps: Option<usize>,

    /// Number of outer steps.
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Write a PNG of initial and final dye positions here.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image width in pixels.
    #[arg(short = 'W', long, default_value_t = 512)]
    width: usize,

    /// Image height in pixels.
    #[arg(short = 'H', long, default_value_t = 512)]
    height: usize,
}

/// Dye used when neither the scenario nor `--dye` provides any: a vertical
/// line through the origin.
fn default_dye() -> Vec<DyeShape> {
    vec![DyeShape::Line {
        start: DVec2::new(0.0, -1.0),
        end: DVec2::new(0.0, 1.0),
        count: 1000,
        mass: 0.0,
    }]
}

fn read_scenario(path: &Path) -> Result<Scenario, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scenario {}: {e}", path.display())))
}

/// Merges the scenario file (if any) with command-line overrides.
fn build_scenario(args: &RunArgs) -> Result<Scenario, CliError> {
    let mut scenario = match (&args.scenario, &args.preset) {
        (Some(path), _) => read_scenario(path)?,
        (None, Some(preset)) => Scenario::new(preset),
        (None, None) => {
            return Err(CliError::Input(
                "run needs a preset name or --scenario".into(),
            ))
        }
    };
    if let Some(preset) = &args.preset {
        scenario.preset.clone_from(preset);
    }
    if let Some(params) = &args.params {
        scenario.params = serde_json::from_str(params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    }
    if let Some(dye) = &args.dye {
        scenario.dye = serde_json::from_str(dye)
            .map_err(|e| CliError::Input(format!("invalid --dye JSON: {e}")))?;
    }
    if let Some(time_step) = args.time_step {
        scenario.setup.time_step = time_step;
    }
    if let Some(substeps) = args.substeps {
        scenario.setup.substeps = substeps;
    }
    if let Some(iterations) = args.iterations {
        scenario.iterations = iterations;
    }
    if scenario.dye.is_empty() {
        scenario.dye = default_dye();
    }
    scenario.validate()?;
    Ok(scenario)
}

fn run_scenario(args: &RunArgs, json: bool) -> Result<(), CliError> {
    let scenario = build_scenario(args)?;
    let flow = FlowPreset::from_name(&scenario.preset, &scenario.params)?;
    let particles = scenario.particles()?;
    let mut sim = Simulation::new(scenario.setup, flow, particles)?;
    let report = sim.iterate(scenario.iterations)?;

    let view = View::fit(sim.particles(), VIEW_MARGIN);
    if let Some(output) = &args.output {
        dyeflow_presets::snapshot::write_png(
            sim.particles(),
            &view,
            args.width,
            args.height,
            output,
        )?;
    }

    if json {
        let info = serde_json::json!({
            "preset": scenario.preset,
            "params": scenario.params,
            "particles": sim.particles().len(),
            "shapes": sim.particles().shape_starts().len(),
            "iterations": report.steps,
            "time_step": scenario.setup.time_step,
            "substeps": scenario.setup.substeps,
            "elapsed": sim.elapsed(),
            "held": report.held,
            "bounds": {"min": [view.min.x, view.min.y], "max": [view.max.x, view.max.y]},
            "output": args.output.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "advected {} particle(s) through {} for {} step(s) (t = {:.4}, {} held)",
            sim.particles().len(),
            scenario.preset,
            report.steps,
            sim.elapsed(),
            report.held
        );
        if let Some(output) = &args.output {
            eprintln!("wrote {}", output.display());
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let presets = FlowPreset::list_presets();
            if cli.json {
                let entries = presets
                    .iter()
                    .map(|name| -> Result<serde_json::Value, CliError> {
                        let defaults = FlowPreset::parse(name)?.defaults();
                        Ok(serde_json::json!({"name": name, "defaults": defaults}))
                    })
                    .collect::<Result<Vec<_>, CliError>>()?;
                let info = serde_json::json!({ "presets": entries });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Presets:");
                for name in presets {
                    let defaults = FlowPreset::parse(name)?.defaults();
                    println!("  {name:<12} {defaults}");
                }
            }
        }
        Command::Run(args) => run_scenario(&args, cli.json)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        log::debug!("exiting with code {}: {e:?}", e.exit_code());
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
