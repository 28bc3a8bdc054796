mod logic;
mod util;

use anyhow::{Context, Result, bail};
use asha_game::{JourneyEngine, JsonSource, MissionCatalog, MissionSource};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{MissionTester, RunSummary, Strategy, resolve_seed_inputs};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "asha-tester", version = "0.1.0")]
#[command(about = "Headless autopilot for Asha's Bitcoin Journey missions")]
struct Args {
    /// Missions to play (comma-separated ids, or `all`)
    #[arg(long, default_value = "all")]
    missions: String,

    /// List all available missions and exit
    #[arg(long)]
    list_missions: bool,

    /// Autopilot strategy
    #[arg(long, value_enum, default_value_t = Strategy::Scholar)]
    strategy: Strategy,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Maximum simulation actions per mission run
    #[arg(long, default_value_t = 2_000)]
    max_steps: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Mission catalog JSON to load instead of the embedded one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Simulation defaults JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drive inflation missions from a live ticker
    #[arg(long)]
    realtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let engine = JourneyEngine::new(load_source(&args)?);
    let catalog = engine
        .source()
        .load_catalog()
        .context("failed to load mission catalog")?;

    if maybe_list_missions(&args, &catalog)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let missions = expand_missions(&args.missions, &catalog)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let tester = MissionTester::new(args.strategy, args.max_steps, args.realtime, args.verbose);
    let summary = tester.run_all(&engine, &missions, &seeds).await?;

    write_reports(&args, &summary, start_time)?;

    if args.strategy == Strategy::Scholar && !summary.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|path| {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    })
    .transpose()
}

fn load_source(args: &Args) -> Result<JsonSource> {
    Ok(JsonSource::new(
        read_optional(args.catalog.as_deref())?,
        read_optional(args.config.as_deref())?,
    ))
}

fn maybe_list_missions(args: &Args, catalog: &MissionCatalog) -> Result<bool> {
    if !args.list_missions {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available missions:")?;
    for realm in catalog.realms() {
        writeln!(output_target.writer(), "{}", realm.name)?;
        for mission in catalog.missions_in_realm(realm.id) {
            writeln!(
                output_target.writer(),
                "  {:>4}  {:12} {}",
                mission.id,
                mission.simulation_type,
                mission.title
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "₿ Asha's Bitcoin Journey Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_missions(missions_arg: &str, catalog: &MissionCatalog) -> Result<Vec<u32>> {
    let tokens = split_csv(missions_arg);
    if tokens.iter().any(|token| token.eq_ignore_ascii_case("all")) {
        return Ok(catalog.missions().iter().map(|mission| mission.id).collect());
    }
    let mut ids = Vec::with_capacity(tokens.len());
    for token in tokens {
        let id: u32 = token
            .parse()
            .with_context(|| format!("invalid mission id '{token}'"))?;
        catalog.get(id)?;
        ids.push(id);
    }
    if ids.is_empty() {
        bail!("no missions selected");
    }
    Ok(ids)
}

fn write_reports(args: &Args, summary: &RunSummary, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, summary)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, summary)?,
        _ => logic::reports::generate_console_report(
            &mut output_target,
            summary,
            start_time.elapsed(),
        )?,
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
