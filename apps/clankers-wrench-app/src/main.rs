//! Clankers wrench distribution CLI.
//!
//! Provides two modes of operation:
//! - `solve`: Load a TOML contact scene, distribute a desired wrench and
//!   print the per-contact result
//! - `info`: Print workspace crate versions

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nalgebra::Vector3;
use tracing_subscriber::EnvFilter;

use clankers_contact::{Contact, VertexRegistry};
use clankers_core::{ClankersError, SceneConfig, Wrench};
use clankers_wrench::WrenchDistribution;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Distribute a desired wrench over a set of contacts.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one wrench distribution problem.
    Solve {
        /// Scene file with vertex tables, contacts and solver settings.
        #[arg(short, long)]
        scene: PathBuf,

        /// Desired force (N).
        #[arg(long, required = true, num_args = 3, value_names = ["FX", "FY", "FZ"],
              allow_negative_numbers = true)]
        force: Vec<f64>,

        /// Desired moment (N·m).
        #[arg(long, num_args = 3, value_names = ["MX", "MY", "MZ"], allow_negative_numbers = true,
              default_values_t = [0.0, 0.0, 0.0])]
        moment: Vec<f64>,

        /// Point about which moments are expressed.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values_t = [0.0, 0.0, 0.0])]
        origin: Vec<f64>,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn vector3(values: &[f64]) -> Vector3<f64> {
    Vector3::from_column_slice(values)
}

fn run_solve(
    scene_path: &Path,
    desired: &Wrench,
    origin: &Vector3<f64>,
) -> Result<(), ClankersError> {
    let scene = SceneConfig::from_file(scene_path)?;
    let registry = VertexRegistry::from_scene(&scene)?;
    if registry.is_empty() {
        tracing::warn!(scene = %scene_path.display(), "scene has no vertex tables");
    }

    let contacts = scene
        .contacts
        .iter()
        .map(|config| Contact::from_config(config, &registry).map(Contact::into_shared))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        scene = %scene_path.display(),
        contacts = contacts.len(),
        "scene loaded"
    );

    let mut dist = WrenchDistribution::new(contacts, scene.wrench_distribution)?;
    let result = dist.run(desired, origin)?;

    println!("state:   {:?}", dist.state());
    println!("desired: {desired}");
    println!("result:  {result}");
    println!("error:   {:.6}", (result - *desired).norm());
    println!();

    let wrenches = dist.result_wrench_list();
    let local_wrenches = dist.result_local_wrench_list();
    for ((contact, wrench), local) in dist.contacts().iter().zip(wrenches).zip(local_wrenches) {
        let contact = contact.borrow();
        println!(
            "{} ({}, {} ridges)",
            contact.name(),
            contact.kind(),
            contact.ridge_num()
        );
        println!("  global: {wrench}");
        println!("  local:  {local}");
    }
    Ok(())
}

fn run_info() {
    println!("clankers-wrench v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  clankers-core    {}", env!("CARGO_PKG_VERSION"));
    println!("  clankers-contact {}", env!("CARGO_PKG_VERSION"));
    println!("  clankers-wrench  {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve {
            scene,
            force,
            moment,
            origin,
        } => {
            let desired = Wrench::new(vector3(&moment), vector3(&force));
            match run_solve(&scene, &desired, &vector3(&origin)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Info => {
            run_info();
            ExitCode::SUCCESS
        }
    }
}
