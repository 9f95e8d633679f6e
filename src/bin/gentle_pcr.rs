use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use gentle_pcr::{about, parameters::PcrParameters, session::ResultStore};
use serde::Serialize;
use std::{fs, io::Read};

/// PCR simulation, melting temperatures and primer design
#[derive(Parser)]
#[command(name = "gentle_pcr")]
#[command(about = "PCR simulation, melting temperature and primer design", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version and build
    #[arg(short = 'V', long)]
    version: bool,

    /// JSON parameter file; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// Nearest-neighbor table (1-4)
    #[arg(long, global = true)]
    table: Option<u8>,

    /// Salt correction (1-7)
    #[arg(long, global = true)]
    salt: Option<u8>,

    /// Minimum exact 3' match in bases
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Any other parameter as NAME=JSON, e.g. mg=2.0 or strict=false
    #[arg(long = "set", global = true, value_name = "NAME=JSON")]
    set: Vec<String>,

    /// More logging (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Melting temperature of every sequence in the input
    Tm {
        /// Sequence text, a file, @file, or - for stdin
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Print FASTA with tm=... descriptions instead of JSON
        #[arg(long)]
        fasta: bool,
    },
    /// Anneal primers to the template (last sequence) and list the products
    Pcr {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Design primers for the template (last sequence), optionally around one given primer
    Design {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Print the effective parameters as JSON
    Params,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn load_input(value: &str) -> Result<String> {
    if value == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Could not read sequences from stdin")?;
        return Ok(text);
    }
    let path = value.strip_prefix('@').unwrap_or(value);
    if value.starts_with('@') || std::path::Path::new(path).is_file() {
        return fs::read_to_string(path).with_context(|| format!("Could not read '{path}'"));
    }
    Ok(value.to_string())
}

fn load_parameters(cli: &Cli) -> Result<PcrParameters> {
    let mut params = match &cli.config {
        Some(path) => PcrParameters::load_from_path(path)?,
        None => PcrParameters::default(),
    };
    if let Some(table) = cli.table {
        params.set_parameter("table", &serde_json::json!(table))?;
    }
    if let Some(salt) = cli.salt {
        params.set_parameter("salt", &serde_json::json!(salt))?;
    }
    if let Some(limit) = cli.limit {
        params.set_parameter("homology_limit", &serde_json::json!(limit))?;
    }
    for assignment in &cli.set {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected NAME=JSON, got '{assignment}'"))?;
        let value: serde_json::Value = serde_json::from_str(raw)
            .with_context(|| format!("Invalid JSON value for '{name}': {raw}"))?;
        params.set_parameter(name.trim(), &value)?;
    }
    Ok(params)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    init_logging(cli.verbose);
    let params = load_parameters(&cli)?;
    let Some(command) = &cli.command else {
        bail!("Missing command, see --help");
    };

    let mut store = ResultStore::new();
    match command {
        Commands::Params => return print_json(&params),
        Commands::Tm { inputs, fasta } => {
            for input in inputs {
                let report = store.annotate_tm(&load_input(input)?, &params)?;
                if *fasta {
                    print!("{}", report.to_fasta());
                }
            }
            if *fasta {
                return Ok(());
            }
        }
        Commands::Pcr { inputs } => {
            for input in inputs {
                store.simulate_pcr(&load_input(input)?, &params)?;
            }
        }
        Commands::Design { inputs } => {
            for input in inputs {
                store.design_primers(&load_input(input)?, &params)?;
            }
        }
    }

    match store.results() {
        [single] => print_json(single),
        results => print_json(results),
    }
}
