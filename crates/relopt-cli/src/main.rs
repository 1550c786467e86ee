//! relopt CLI: estimate and optimize a query against a catalogue.

use clap::{Args, Parser, Subcommand};
use relopt_core::config::PlannerConfig;
use relopt_core::dag::Operator;
use relopt_core::error::Error as CoreError;
use relopt_planner::{
    estimated, explain, parse_query, parse_yaml_catalogue, plan_cost, Optimizer, ParseError,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relopt")]
#[command(about = "Heuristic logical query optimizer with cardinality estimates", long_about = None)]
struct Cli {
    /// Log every rewrite pass (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical and optimized plans with estimates (EXPLAIN)
    Explain {
        /// Path to the catalogue YAML file
        #[arg(short, long)]
        catalogue: PathBuf,

        /// Path to the query file (reads stdin if omitted)
        #[arg(short, long)]
        query: Option<PathBuf>,

        /// Print the optimized plan as JSON instead of a tree
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        passes: PassFlags,
    },

    /// Check that the catalogue and query parse and every name resolves
    Validate {
        /// Path to the catalogue YAML file
        #[arg(short, long)]
        catalogue: PathBuf,

        /// Path to the query file (reads stdin if omitted)
        #[arg(short, long)]
        query: Option<PathBuf>,
    },
}

/// Pass toggles; these override RELOPT_* environment variables.
#[derive(Args)]
struct PassFlags {
    #[arg(long)]
    no_left_deep: bool,

    #[arg(long)]
    no_push_selections: bool,

    #[arg(long)]
    no_form_joins: bool,

    #[arg(long)]
    no_push_projections: bool,

    /// Verify plan invariants after every pass
    #[arg(long)]
    check_invariants: bool,
}

impl PassFlags {
    fn apply(&self, mut config: PlannerConfig) -> PlannerConfig {
        config.left_deep &= !self.no_left_deep;
        config.push_selections &= !self.no_push_selections;
        config.form_joins &= !self.no_form_joins;
        config.push_projections &= !self.no_push_projections;
        config.check_invariants |= self.check_invariants;
        config
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Explain {
            catalogue,
            query,
            json,
            passes,
        } => {
            let config = passes.apply(PlannerConfig::from_env());
            if let Err(e) = explain_query(&catalogue, query.as_deref(), json, config) {
                report("Error", e.as_ref());
                std::process::exit(1);
            }
        }
        Commands::Validate { catalogue, query } => {
            if let Err(e) = validate_query(&catalogue, query.as_deref()) {
                report("Validation failed", e.as_ref());
                std::process::exit(1);
            }
            println!("✓ Query is valid");
        }
    }
}

fn report(prefix: &str, e: &(dyn std::error::Error + 'static)) {
    eprintln!("{}: {}", prefix, e);
    let hints = match e.downcast_ref::<ParseError>() {
        Some(p) => p.suggestions(),
        None => e
            .downcast_ref::<CoreError>()
            .map(CoreError::suggestions)
            .unwrap_or_default(),
    };
    for hint in hints {
        eprintln!("  hint: {}", hint);
    }
}

fn read_query(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut src = String::new();
            std::io::stdin().read_to_string(&mut src)?;
            Ok(src)
        }
    }
}

fn load(catalogue: &Path, query: Option<&Path>) -> Result<Operator, Box<dyn std::error::Error>> {
    let yaml = fs::read_to_string(catalogue)?;
    let catalogue = parse_yaml_catalogue(&yaml)?;
    let src = read_query(query)?;
    Ok(parse_query(&src, &catalogue)?)
}

fn validate_query(catalogue: &Path, query: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load(catalogue, query)?;
    // Estimation resolves every predicate against its input.
    estimated(plan)?;
    Ok(())
}

fn explain_query(
    catalogue: &Path,
    query: Option<&Path>,
    json: bool,
    config: PlannerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let canonical = load(catalogue, query)?;
    let optimized = Optimizer::new(config)
        .optimize(&canonical)
        .map_err(|e| e.with_context("optimizing query"))?;

    let canonical = estimated(canonical)?;
    let optimized = estimated(optimized)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&optimized)?);
        return Ok(());
    }

    for (title, plan) in [("Canonical plan", &canonical), ("Optimized plan", &optimized)] {
        let cost = plan_cost(plan)?;
        println!("{}", title);
        println!("{}", "=".repeat(title.len()));
        print!("{}", explain(plan));
        println!(
            "Cost: {} tuples across {} nodes ({} at root)",
            cost.total_tuples, cost.nodes, cost.root_tuples
        );
        println!("Fingerprint: {}", plan.fingerprint()?.short());
        println!();
    }
    Ok(())
}
