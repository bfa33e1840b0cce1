//! Concolic Trace CLI
//!
//! # Usage
//!
//! ```bash
//! # Instrument every class of a JSON classpath
//! cargo run --bin concolic-trace -- instrument --program program.json --output instrumented.json
//!
//! # Run Main.abs(5) with argument 0 symbolic and print the concolic trace
//! cargo run --bin concolic-trace -- run --program program.json --class Main --method abs --arg 5 --symbolic 0
//! ```
//!
//! Logging follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand, ValueEnum};
use concolic_ir::features::interpreter::{ConcolicSession, EntryCall};
use concolic_ir::shared::models::InMemoryClasspath;
use concolic_ir::{ConcreteValue, InstrumentationConfig};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "concolic-trace")]
#[command(about = "Instrument raw IR and trace concolic executions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument every class of a classpath
    Instrument {
        /// Classpath as JSON
        #[arg(short, long)]
        program: PathBuf,

        /// YAML v1 config (defaults to the concolic preset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the instrumented classpath here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Instrument, execute one method and print its trace
    Run {
        #[arg(short, long)]
        program: PathBuf,

        /// Entry class
        #[arg(long)]
        class: String,

        /// Entry method (overload chosen by argument count)
        #[arg(short, long)]
        method: String,

        /// Integer arguments, in order
        #[arg(short, long = "arg", allow_negative_numbers = true)]
        args: Vec<i32>,

        /// Argument indices to mark symbolic
        #[arg(short, long)]
        symbolic: Vec<u32>,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Instrument {
            program,
            config,
            output,
        } => {
            instrument(program, config, output)?;
        }
        Commands::Run {
            program,
            class,
            method,
            args,
            symbolic,
            config,
            format,
        } => {
            run(program, class, method, args, symbolic, config, format)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<InstrumentationConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(InstrumentationConfig::from_yaml(&path.to_string_lossy())?),
        None => Ok(InstrumentationConfig::concolic()),
    }
}

fn load_program(path: &PathBuf) -> Result<InMemoryClasspath, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    Ok(InMemoryClasspath::from_json(&json)?)
}

fn instrument(
    program: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = ConcolicSession::new(load_program(&program)?, load_config(config)?)?;
    let json = session.instrumented_classpath().to_json()?;

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            let stats = session.stats();
            println!("📄 Instrumented classpath written to {}", path.display());
            println!(
                "   {} → {} instructions ({:.2}x), {} traced",
                stats.original_instructions,
                stats.emitted_instructions,
                stats.expansion_ratio(),
                stats.traced_instructions
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run(
    program: PathBuf,
    class: String,
    method: String,
    args: Vec<i32>,
    symbolic: Vec<u32>,
    config: Option<PathBuf>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let concolic = config.is_concolic();
    let session = ConcolicSession::new(load_program(&program)?, config)?;

    let mut entry = EntryCall::new(class.as_str(), method);
    entry.args = args.into_iter().map(ConcreteValue::Int).collect();
    entry.symbolic_args = symbolic;

    if concolic {
        let mut tracer = session.concolic_tracer();
        let run = session.run_concolic(&mut tracer, &entry)?;
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&run.trace)?),
            Format::Text => {
                println!("Outcome: {:?} ({} steps)", run.outcome, run.steps);
                for traced in &run.trace.instructions {
                    let inst = &traced.instruction;
                    print!("  [{:>3}] {}", inst.index, inst.instruction);
                    if !traced.concrete_arguments.is_empty() {
                        let snapshot: Vec<String> = traced
                            .concrete_arguments
                            .iter()
                            .map(|(ordinal, value)| format!("#{}={}", ordinal, value))
                            .collect();
                        print!("   ⟵ {}", snapshot.join(", "));
                    }
                    println!();
                }
            }
        }
    } else {
        let mut tracer = session.instruction_tracer();
        let run = session.run_coverage(&mut tracer, &entry)?;
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&run.trace)?),
            Format::Text => {
                println!("Outcome: {:?} ({} steps)", run.outcome, run.steps);
                for inst in &run.trace.trace {
                    println!("  [{:>3}] {}", inst.index, inst.instruction);
                }
                for access in &run.trace.statics {
                    println!("  static {:?} {}.{}", access.kind, access.class_name, access.field.name);
                }
            }
        }
    }
    Ok(())
}
