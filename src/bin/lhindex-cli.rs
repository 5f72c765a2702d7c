//! lhindex console front-end
//!
//! Builds an index from a delimited employee file, then answers lookups by
//! id until `-1`, `.exit` or end of input.

use anyhow::Context;
use clap::Parser;
use lhindex::{load_from_path, IndexConfig, LinearHashIndex};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::Level;

const PROMPT: &str = "Enter an ID to lookup (-1 to quit): ";

#[derive(Parser, Debug)]
#[command(name = "lhindex-cli", version, about = "Linear hash index over an employee file")]
struct Args {
    /// Input rows `id,name,bio,managerId`
    #[arg(long, default_value = "Employee.csv")]
    csv: PathBuf,

    /// Index file to create (replaced if it exists)
    #[arg(long, default_value = "EmployeeIndex")]
    index: PathBuf,

    /// JSON index configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => IndexConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IndexConfig::default(),
    };

    let mut index = LinearHashIndex::create(&args.index, config)
        .with_context(|| format!("creating index {}", args.index.display()))?;
    let loaded = load_from_path(&mut index, &args.csv)
        .with_context(|| format!("loading {}", args.csv.display()))?;
    println!(
        "Loaded {} records into {} ({} buckets)",
        loaded,
        args.index.display(),
        index.bucket_count()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    lookup_loop(&index, stdin.lock(), &mut stdout.lock())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// One line of console input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Lookup(u32),
    Stats,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

fn parse_command(input: &str) -> Command {
    match input.trim() {
        "" => Command::Empty,
        "-1" | ".exit" | ".quit" => Command::Quit,
        ".stats" => Command::Stats,
        ".help" => Command::Help,
        other => match other.parse::<u32>() {
            Ok(id) => Command::Lookup(id),
            Err(_) => Command::Invalid(other.to_string()),
        },
    }
}

fn lookup_loop<R: BufRead, W: Write>(
    index: &LinearHashIndex,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut buffer = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        buffer.clear();
        if input.read_line(&mut buffer)? == 0 {
            writeln!(out)?;
            break;
        }

        match parse_command(&buffer) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Lookup(id) => match index.lookup(id)? {
                Some(record) => writeln!(out, "{}", record)?,
                None => writeln!(out, "Record {} not found", id)?,
            },
            Command::Stats => {
                let stats = index.stats()?;
                writeln!(
                    out,
                    "records={} buckets={} bits={} pages={} overflow={} fill={:.3}",
                    stats.records,
                    stats.buckets,
                    stats.address_bits,
                    stats.pages,
                    stats.overflow_pages,
                    stats.fill_ratio
                )?;
            }
            Command::Help => {
                writeln!(out, "  <id>     look up a record by id")?;
                writeln!(out, "  .stats   show index shape")?;
                writeln!(out, "  -1       quit (also .exit)")?;
            }
            Command::Invalid(raw) => writeln!(out, "Invalid ID '{}'", raw)?,
        }
    }
    Ok(())
}
