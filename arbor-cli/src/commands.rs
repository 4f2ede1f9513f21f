use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use arbor_config::{AllocStrategyConfig, ArborConfig, PipelineModeConfig};
use arbor_json::{Element, ParseOptions, Reader};
use arbor_telemetry::{EventLogger, MetricsRecorder};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "arbor", version, about)]
pub struct Cli {
    /// Configuration file; `config/arbor.yaml` and `ARBOR_*` variables otherwise
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a document and write it back out
    Parse(ParseArgs),
    /// Validate a document and summarize its root
    Check(CheckArgs),
    /// Time repeated parses of a document in every pipeline mode
    Bench(BenchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    pub file: PathBuf,
    /// Indent the output, two spaces per level unless `--indent` or `--tabs` says otherwise
    #[arg(short, long)]
    pub pretty: bool,
    #[arg(long, default_value_t = 2)]
    pub indent: usize,
    /// Indent pretty output with one tab per level
    #[arg(long, conflicts_with = "indent")]
    pub tabs: bool,
    #[command(flatten)]
    pub tuning: Tuning,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub tuning: Tuning,
}

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    pub file: PathBuf,
    /// Parses per pipeline mode
    #[arg(short, long, default_value_t = 100)]
    pub iterations: usize,
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

/// Per-invocation overrides of the loaded configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct Tuning {
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Sync,
    Channel,
    Ring,
}

impl From<ModeArg> for PipelineModeConfig {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sync => PipelineModeConfig::Sync,
            ModeArg::Channel => PipelineModeConfig::Channel,
            ModeArg::Ring => PipelineModeConfig::Ring,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Direct,
    FreeList,
    Slab,
}

impl From<StrategyArg> for AllocStrategyConfig {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Direct => AllocStrategyConfig::Direct,
            StrategyArg::FreeList => AllocStrategyConfig::FreeList,
            StrategyArg::Slab => AllocStrategyConfig::Slab,
        }
    }
}

impl ParseArgs {
    fn indent_unit(&self) -> String {
        if self.tabs {
            "\t".to_owned()
        } else {
            " ".repeat(self.indent)
        }
    }
}

impl Tuning {
    fn apply(&self, config: &mut ArborConfig) {
        if let Some(mode) = self.mode {
            config.parser.pipeline.mode = mode.into();
        }
        if let Some(strategy) = self.strategy {
            config.memory.strategy = strategy.into();
        }
    }
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => ArborConfig::load_from_path(path)?,
        None => ArborConfig::load()?,
    };
    EventLogger::init(&config.telemetry)?;
    let metrics = MetricsRecorder::new().map_err(arbor_telemetry::TelemetryError::from)?;

    match cli.command {
        Commands::Parse(args) => run_parse(config, &args, &metrics)?,
        Commands::Check(args) => run_check(config, &args, &metrics)?,
        Commands::Bench(args) => run_bench(config, &args, &metrics)?,
    }

    if cli.metrics {
        let text = metrics
            .gather_metrics()
            .map_err(arbor_telemetry::TelemetryError::from)?;
        eprint!("{text}");
    }
    Ok(())
}

fn run_parse(
    mut config: ArborConfig,
    args: &ParseArgs,
    metrics: &MetricsRecorder,
) -> Result<(), CliError> {
    args.tuning.apply(&mut config);
    let reader = Reader::new(ParseOptions::from(&config))?;
    let src = read_document(&args.file)?;
    let root = parse_recorded(&reader, &args.file, &src, metrics)?;

    if args.pretty {
        println!("{}", root.pretty_serialize(&args.indent_unit()));
    } else {
        println!("{}", root.serialize());
    }
    Ok(())
}

fn run_check(
    mut config: ArborConfig,
    args: &CheckArgs,
    metrics: &MetricsRecorder,
) -> Result<(), CliError> {
    args.tuning.apply(&mut config);
    let reader = Reader::new(ParseOptions::from(&config))?;
    let src = read_document(&args.file)?;
    let root = parse_recorded(&reader, &args.file, &src, metrics)?;
    println!("{}: {}", args.file.display(), summarize(&root));
    Ok(())
}

fn run_bench(
    mut config: ArborConfig,
    args: &BenchArgs,
    metrics: &MetricsRecorder,
) -> Result<(), CliError> {
    if let Some(strategy) = args.strategy {
        config.memory.strategy = strategy.into();
    }
    let src = read_document(&args.file)?;
    let iterations = args.iterations.max(1);

    for mode in [ModeArg::Sync, ModeArg::Channel, ModeArg::Ring] {
        config.parser.pipeline.mode = mode.into();
        let reader = Reader::new(ParseOptions::from(&config))?;
        let mut total = Duration::ZERO;
        for _ in 0..iterations {
            let started = Instant::now();
            let result = reader.parse(&src);
            let elapsed = started.elapsed();
            metrics.record_parse(src.len(), elapsed, result.is_ok());
            drop(result?);
            total += elapsed;
        }

        let mean = mean_per_parse(total, iterations);
        let seconds = total.as_secs_f64().max(f64::EPSILON);
        let throughput = (src.len() * iterations) as f64 / seconds / 1e6;
        info!(mode = reader.options().mode.name(), iterations, ?mean, "bench finished");
        println!(
            "{:<8} {:>12.3?} per parse {:>10.1} MB/s",
            reader.options().mode.name(),
            mean,
            throughput
        );
    }
    Ok(())
}

fn mean_per_parse(total: Duration, iterations: usize) -> Duration {
    total.div_f64(iterations.max(1) as f64)
}

fn read_document(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_recorded(
    reader: &Reader,
    path: &Path,
    src: &str,
    metrics: &MetricsRecorder,
) -> Result<Element, CliError> {
    let name = path.display().to_string();
    let started = Instant::now();
    let result = reader.parse(src);
    metrics.record_parse(src.len(), started.elapsed(), result.is_ok());

    match &result {
        Ok(root) => EventLogger::log_document(&name, src.len(), Ok(root.type_name())),
        Err(err) => EventLogger::log_document(&name, src.len(), Err(&err.to_string())),
    }
    Ok(result?)
}

fn summarize(root: &Element) -> String {
    match root {
        Element::Array(array) => format!("array of {} elements", array.len()),
        Element::Object(object) => format!("object with {} keys", object.len()),
        Element::Value(value) => format!("{} value", value.type_name()),
    }
}
