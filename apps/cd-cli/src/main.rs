use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cd_app::{AppResult, RunProgressEvent, RunReport, RunStage, list_snapshots, run_with_progress};
use cd_config::{RunConfig, validate_config};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cd-cli")]
#[command(about = "Protoplanetary disks in a young star cluster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration file holding every default
    Init {
        /// Where to write the YAML file
        config_path: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration YAML file
        config_path: PathBuf,
    },
    /// Run a cluster simulation
    Run(RunArgs),
    /// List the snapshots of a run
    Snapshots {
        /// Directory holding the run directories
        save_path: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        run_number: u32,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Configuration YAML file; defaults are used when absent
    config_path: Option<PathBuf>,
    /// Worker threads
    #[arg(short, long)]
    workers: Option<usize>,
    /// Viscous disk backends
    #[arg(short, long)]
    backends: Option<usize>,
    #[arg(long)]
    save_path: Option<String>,
    #[arg(short, long)]
    run_number: Option<u32>,
    /// Continue from the latest snapshot of the run
    #[arg(long)]
    restart: bool,
    #[arg(short, long)]
    n_stars: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// End time [Myr]
    #[arg(long)]
    t_end_myr: Option<f64>,
    /// Directory of the FRIED mass-loss grid
    #[arg(long)]
    grid_path: Option<String>,
    /// Log per-phase wall-clock totals at the end
    #[arg(long)]
    timing: bool,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { config_path } => cmd_init(&config_path),
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run(args) => cmd_run(args),
        Commands::Snapshots {
            save_path,
            run_number,
        } => cmd_snapshots(&save_path, run_number),
    }
}

fn cmd_init(config_path: &Path) -> AppResult<()> {
    cd_config::save_yaml(config_path, &RunConfig::default())?;
    println!("✓ Wrote default configuration to {}", config_path.display());
    Ok(())
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    cd_config::load_yaml(config_path)?;
    println!("✓ Configuration is valid");
    Ok(())
}

fn apply_overrides(config: &mut RunConfig, args: &RunArgs) {
    if let Some(workers) = args.workers {
        config.parallel.workers = workers;
    }
    if let Some(backends) = args.backends {
        config.parallel.backends = backends;
    }
    if let Some(save_path) = &args.save_path {
        config.output.save_path = save_path.clone();
    }
    if let Some(run_number) = args.run_number {
        config.output.run_number = run_number;
    }
    if args.restart {
        config.output.restart = true;
    }
    if let Some(n) = args.n_stars {
        config.cluster.n_stars = n;
    }
    if let Some(seed) = args.seed {
        config.cluster.seed = seed;
    }
    if let Some(t_end) = args.t_end_myr {
        config.time.end_yr = t_end * 1e6;
    }
    if let Some(grid_path) = &args.grid_path {
        config.disks.fried_grid_path = grid_path.clone();
    }
}

fn cmd_run(args: RunArgs) -> AppResult<()> {
    let mut config = match &args.config_path {
        Some(path) => cd_config::load_yaml_unchecked(path)?,
        None => RunConfig::default(),
    };
    apply_overrides(&mut config, &args);
    validate_config(&config)?;
    if args.timing {
        cd_core::timing::enable_timing();
    }
    tracing::info!(
        config = ?args.config_path,
        save_path = %config.output.save_path,
        run_number = config.output.run_number,
        restart = config.output.restart,
        "configuration ready"
    );

    println!(
        "Running {} stars to {:.3} Myr on {} workers",
        config.cluster.n_stars,
        config.time.end_yr * 1e-6,
        config.parallel.workers
    );

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let report = run_with_progress(
        &config,
        Some(&mut |event| {
            let fraction = event
                .cluster
                .as_ref()
                .map(|c| c.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100
                || event.stage != RunStage::RunningCluster;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    print_report(&report);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.cluster) {
        (RunStage::RunningCluster, Some(c)) => {
            let width = 28usize;
            let filled = ((c.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!("{}{}", "#".repeat(filled), "-".repeat(width.saturating_sub(filled)));
            print!(
                "\r[{}] {:>6.2}%  t={:.4}/{:.4} Myr  step={}  disks={}  encounters={}  elapsed={:.1}s",
                bar,
                c.fraction_complete * 100.0,
                c.sim_time_yr * 1e-6,
                c.t_end_yr * 1e-6,
                c.step,
                c.active_disks,
                c.encounters,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_report(report: &RunReport) {
    let summary = &report.summary;
    if summary.stopped_early {
        println!("✓ All disks dispersed at {:.4} Myr", summary.end_time_yr * 1e-6);
    } else {
        println!("✓ Simulation completed at {:.4} Myr", summary.end_time_yr * 1e-6);
    }
    if let Some(t) = report.restarted_from_yr {
        println!("  Restarted from: {:.4} Myr", t * 1e-6);
    }
    println!("  Output: {}", report.run_dir.display());
    println!("  Steps: {}", summary.steps);
    println!("  Snapshots: {}", summary.snapshots);
    println!("  Encounters: {}", summary.encounters);
    println!("  Active disks: {}", summary.active_disks);

    let timing = &report.timing;
    let total = timing.total_time_s.max(1.0e-12);
    println!("\nTiming summary:");
    println!(
        "  Table:   {:.3}s ({:.1}%)",
        timing.table_load_time_s,
        100.0 * timing.table_load_time_s / total
    );
    println!(
        "  Setup:   {:.3}s ({:.1}%)",
        timing.setup_time_s,
        100.0 * timing.setup_time_s / total
    );
    println!(
        "  Run:     {:.3}s ({:.1}%)",
        timing.run_time_s,
        100.0 * timing.run_time_s / total
    );
    println!("  Total:   {:.3}s", timing.total_time_s);
}

fn cmd_snapshots(save_path: &Path, run_number: u32) -> AppResult<()> {
    let summaries = list_snapshots(save_path, run_number)?;
    if summaries.is_empty() {
        println!("No snapshots found for run {}", run_number);
        return Ok(());
    }
    println!("Snapshots of run {}:", run_number);
    println!(
        "  {:>10}  {:>6}  {:>6}  {:>9}  {:>8}  {:>12}  {:>10}",
        "t [Myr]", "stars", "disks", "dispersed", "fraction", "<M_disk>", "encounters"
    );
    for s in summaries {
        println!(
            "  {:>10.4}  {:>6}  {:>6}  {:>9}  {:>8.3}  {:>12.4e}  {:>10}",
            s.time_yr * 1e-6,
            s.n_stars,
            s.active_disks,
            s.dispersed,
            s.disk_fraction,
            s.mean_disk_mass,
            s.encounters
        );
    }
    Ok(())
}
