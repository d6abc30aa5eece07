use std::collections::HashSet;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dietopt_core::{Catalog, Report, Target, catalog};
use dietopt_solver::SolutionStatus;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dietopt")]
#[command(about = "Least-cost diet planning with linear programming", long_about = None)]
struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the cheapest daily diet from the built-in catalog
    Solve {
        /// Minimum calories (kcal)
        #[arg(long, default_value_t = Target::reference().min_calories)]
        calories: f64,
        /// Minimum protein (g)
        #[arg(long, default_value_t = Target::reference().min_protein)]
        protein: f64,
        /// Maximum fat (g)
        #[arg(long, default_value_t = Target::reference().max_fat)]
        fat: f64,
        /// Maximum daily spend
        #[arg(long, default_value_t = Target::reference().max_budget)]
        budget: f64,
        /// Maximum carbohydrate (g)
        #[arg(long)]
        carbs: Option<f64>,
        /// Item to leave out (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
        /// Apply per-category serving limits
        #[arg(short, long)]
        portion_limits: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// List the built-in catalog
    Catalog {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    /// Compact, human-readable logs.
    Compact,
    /// Structured JSON logs.
    Json,
}

/// Logging settings. Logs go to stderr.
#[derive(Debug, Args)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (compact, json)
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match config.log_format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.logging);

    match cli.command {
        Commands::Solve {
            calories,
            protein,
            fat,
            budget,
            carbs,
            exclude,
            portion_limits,
            format,
        } => {
            let catalog = catalog::builtin();
            let mut target = Target::new(calories, protein, fat, budget);
            target.max_carbohydrate = carbs;
            let excluded = resolve_exclusions(&catalog, &exclude);

            info!(?target, excluded = excluded.len(), portion_limits, "solving");
            let report = match dietopt_core::optimize(catalog.items(), &target, &excluded, portion_limits) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Pretty => print_report(&report, &catalog),
            }

            if !report.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Catalog { format } => {
            let catalog = catalog::builtin();
            match format {
                OutputFormat::Json => print_json(&catalog.items()),
                OutputFormat::Pretty => print_catalog(&catalog),
            }
        }
    }
}

/// Maps user-supplied names onto catalog names, ignoring case. Unknown names are dropped.
fn resolve_exclusions(catalog: &Catalog, names: &[String]) -> HashSet<String> {
    names
        .iter()
        .filter_map(|name| match catalog.get(name) {
            Some(item) => Some(item.name.clone()),
            None => {
                warn!(name = %name, "excluded item is not in the catalog");
                None
            }
        })
        .collect()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &Report, catalog: &Catalog) {
    match report.status {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            println!();
            println!("  Calories:     {:10.1} kcal", report.total_calories);
            println!("  Protein:      {:10.1} g", report.total_protein);
            println!("  Fat:          {:10.1} g", report.total_fat);
            if report.total_carbohydrate > 0.0 {
                println!("  Carbohydrate: {:10.1} g", report.total_carbohydrate);
            }
            println!("  Total cost:   {:10.2}", report.total_cost);
            println!();
            println!("Items:");
            for line in &report.items {
                let category = catalog
                    .category_of(&line.name)
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                println!(
                    "  {:20} {:8.2} servings {:8.1} kcal {:7.1} g protein {:8.2}  {}",
                    line.name, line.quantity, line.calories, line.protein, line.cost, category
                );
            }
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No combination of items satisfies every requirement.");
            println!();
            println!("Suggestions:");
            println!("  - raise the maximum budget");
            println!("  - lower the minimum calories or protein");
            println!("  - raise the maximum fat");
            println!("  - exclude fewer items or drop --portion-limits");
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    for (category, names) in catalog.categories() {
        println!("{}:", category);
        for name in names {
            if let Some(item) = catalog.get(name) {
                println!(
                    "  {:20} {:6.0} kcal {:5.1} g protein {:5.1} g fat {:6.2}",
                    item.name, item.calories, item.protein, item.fat, item.price
                );
            }
        }
    }
}
