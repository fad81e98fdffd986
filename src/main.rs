use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use picolog::parser::parse_query;
use picolog::{format, Database, EngineConfig, LogicEngine};

#[derive(Parser)]
#[command(name = "picolog")]
#[command(about = "Query a database of facts and rules")]
struct Args {
    /// Database file, one clause per line
    database: PathBuf,

    /// Query to solve (repeatable); queries are read from stdin when absent
    #[arg(long, short)]
    query: Vec<String>,

    /// JSON file with engine limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Same capacity for every buffer
    #[arg(long, conflicts_with = "config")]
    capacity: Option<usize>,

    /// Solve AND subgoals in the order they are written
    #[arg(long)]
    no_reorder: bool,

    /// Print each binding as a JSON object of variable values
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = read(&args.database)?;
    let database = Database::parse(&text)
        .with_context(|| format!("Failed to load database: {}", args.database.display()))?;
    info!(
        "loaded {} facts and {} rules from {}",
        database.fact_count(),
        database.rule_count(),
        args.database.display()
    );

    let engine = LogicEngine::with_config(database, load_config(&args)?);

    if !args.query.is_empty() {
        for query in &args.query {
            run(&engine, query, args.json)?;
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read query from stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        if let Err(error) = run(&engine, line, args.json) {
            eprintln!("error: {error:#}");
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match (&args.config, args.capacity) {
        (Some(path), _) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("Invalid engine config: {}", path.display()))?,
        (None, Some(capacity)) => EngineConfig::bounded(capacity),
        (None, None) => EngineConfig::default(),
    };
    if args.no_reorder {
        config.reorder_conjunctions = false;
    }
    Ok(config)
}

fn run(engine: &LogicEngine, input: &str, json: bool) -> Result<()> {
    let query = parse_query(input)?;
    let result = engine
        .solve(&query)
        .with_context(|| format!("Failed to solve {query}"))?;

    if json {
        println!("{}", serde_json::to_string(&result.named(&query))?);
    } else {
        println!("{}", format::render_result(&query, &result));
    }
    Ok(())
}
