use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use simple_vqs::{bloch_vector, IntegratorKind, Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// McLachlan variational simulation compared against exact evolution
#[derive(Parser, Debug)]
#[command(name = "simple-vqs")]
struct Args {
    /// JSON run configuration. The rotating-field demo runs when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the final time
    #[arg(long)]
    t_max: Option<f64>,

    /// Override the time step
    #[arg(long)]
    dt: Option<f64>,

    /// Integrate with forward Euler instead of RK4
    #[arg(long)]
    euler: bool,

    /// Print the full trajectory record as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SimulationConfig::from_json_str(&json)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(t_max) = args.t_max {
        config = config.with_t_max(t_max);
    }
    if let Some(dt) = args.dt {
        config = config.with_dt(dt);
    }
    if args.euler {
        config = config.with_integrator(IntegratorKind::Euler);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let simulation = Simulation::new(&config).context("failed to set up simulation")?;
    let output = simulation.run_detailed().context("simulation failed")?;
    let record = &output.record;

    if args.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let mean = record.mean_fidelity().context("empty trajectory")?;
    let worst = record.min_fidelity().context("empty trajectory")?;
    println!("Average fidelity: {:.6}", mean);
    println!("Worst-case fidelity: {:.6}", worst);

    if let (Some(var), Some(exact)) = (output.variational_states.last(), output.exact_states.last()) {
        let [x, y, z] = bloch_vector(var, 0)?;
        let [ex, ey, ez] = bloch_vector(exact, 0)?;
        println!("Final Bloch vector (variational): ({:.4}, {:.4}, {:.4})", x, y, z);
        println!("Final Bloch vector (exact):       ({:.4}, {:.4}, {:.4})", ex, ey, ez);
    }

    let warnings = record.warnings().count();
    if warnings > 0 {
        info!("{} steps had an ill-conditioned metric", warnings);
    }

    Ok(())
}
