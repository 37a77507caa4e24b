mod output;
mod progress;
mod resolve;

use clap::Parser;
use hdeval::code::io::ImageCodec;
use hdeval::stats::report::{self, Delimiter};
use hdeval::{
    distribution, equal_error_rate, roc_curve, Algorithm, EnumerationPolicy, EvalConfig,
    Evaluator, MaskRules, NoProgress, NullSink, Progress, ShiftMode, ShiftRange,
};
use output::{write_report, ScoreFiles};
use progress::TimedProgress;
use resolve::FsResolver;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Iris code evaluation (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable debug tracing of the comparison sweep.
    #[arg(long)]
    trace: bool,
    /// Only report warnings and errors.
    #[arg(short, long)]
    quiet: bool,
    /// Show progress with elapsed and remaining time.
    #[arg(short, long)]
    progress: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AlgorithmConfig {
    #[default]
    MinHd,
    MaxHd,
    Ssf,
}

impl From<AlgorithmConfig> for Algorithm {
    fn from(value: AlgorithmConfig) -> Self {
        match value {
            AlgorithmConfig::MinHd => Algorithm::MinHd,
            AlgorithmConfig::MaxHd => Algorithm::MaxHd,
            AlgorithmConfig::Ssf => Algorithm::Ssf,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PolicyConfig {
    #[default]
    All,
    Balanced,
}

impl From<PolicyConfig> for EnumerationPolicy {
    fn from(value: PolicyConfig) -> Self {
        match value {
            PolicyConfig::All => EnumerationPolicy::AllPairs,
            PolicyConfig::Balanced => EnumerationPolicy::Balanced,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DelimiterConfig {
    #[default]
    Space,
    Semicolon,
}

impl From<DelimiterConfig> for Delimiter {
    fn from(value: DelimiterConfig) -> Self {
        match value {
            DelimiterConfig::Space => Delimiter::Space,
            DelimiterConfig::Semicolon => Delimiter::Semicolon,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RangeConfig {
    min: i32,
    max: i32,
    step: i32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        let range = ShiftRange::default();
        Self {
            min: range.min(),
            max: range.max(),
            step: range.step(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ShiftsConfig {
    Range(RangeConfig),
    Precomputed(String),
}

impl Default for ShiftsConfig {
    fn default() -> Self {
        ShiftsConfig::Range(RangeConfig::default())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InputConfig {
    pattern: String,
    class: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaskConfig {
    sample: String,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OutputConfig {
    genuine: Option<PathBuf>,
    impostor: Option<PathBuf>,
    roc: Option<PathBuf>,
    distribution: Option<PathBuf>,
    eer: Option<PathBuf>,
    delimiter: DelimiterConfig,
    labels: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    input: InputConfig,
    mask: Option<MaskConfig>,
    shifts: ShiftsConfig,
    algorithm: AlgorithmConfig,
    policy: PolicyConfig,
    bits: Option<[usize; 2]>,
    bins: usize,
    parallel: bool,
    output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = EvalConfig::default();
        Self {
            input: InputConfig::default(),
            mask: None,
            shifts: ShiftsConfig::default(),
            algorithm: AlgorithmConfig::default(),
            policy: PolicyConfig::default(),
            bits: None,
            bins: cfg.bins,
            parallel: cfg.parallel,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    fn eval_config(self) -> Result<(EvalConfig, String, OutputConfig), Box<dyn std::error::Error>> {
        if self.input.pattern.is_empty() || self.input.class.is_empty() {
            return Err("input.pattern and input.class must be set in the config".into());
        }
        if self.output.genuine.is_some() != self.output.impostor.is_some() {
            return Err("output.genuine and output.impostor must be given together".into());
        }
        let shifts = match self.shifts {
            ShiftsConfig::Range(range) => {
                ShiftMode::Range(ShiftRange::new(range.min, range.max, range.step)?)
            }
            ShiftsConfig::Precomputed(rule) => ShiftMode::Precomputed { rule },
        };
        let config = EvalConfig {
            input_pattern: self.input.pattern,
            algorithm: self.algorithm.into(),
            policy: self.policy.into(),
            shifts,
            masks: self.mask.map(|m| MaskRules {
                sample: m.sample,
                reference: m.reference,
            }),
            bits: self.bits.map(|[start, stop]| (start, stop)),
            bins: self.bins,
            parallel: self.parallel,
        };
        Ok((config, self.input.class, self.output))
    }
}

fn init_tracing(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let directive = if cli.trace {
        "hdeval=debug"
    } else if cli.quiet {
        "warn"
    } else {
        "hdeval=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }
    init_tracing(&cli)?;

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let (eval_config, class_rule, out) = config.eval_config()?;
    let delimiter = Delimiter::from(out.delimiter);

    let evaluator = Evaluator::new(eval_config, ImageCodec, FsResolver)?;
    tracing::info!("organizing matches");
    let group = evaluator.discover(&class_rule)?;

    let mut progress: Box<dyn Progress> = if cli.progress && !cli.quiet {
        Box::new(TimedProgress::new())
    } else {
        Box::new(NoProgress)
    };
    tracing::info!(
        users = group.user_count(),
        templates = group.template_count(),
        "executing matches"
    );
    let histogram = match (&out.genuine, &out.impostor) {
        (Some(genuine), Some(impostor)) => {
            let mut files = ScoreFiles::create(genuine, impostor, delimiter, out.labels)?;
            let histogram = evaluator.run(&group, &mut files, &mut *progress)?;
            files.finish()?;
            histogram
        }
        _ => evaluator.run(&group, &mut NullSink, &mut *progress)?,
    };

    if let Some(path) = &out.distribution {
        let rows = distribution(&histogram);
        write_report(path, |w| report::write_distribution(w, delimiter, &rows))?;
    }
    if let Some(path) = &out.roc {
        let points = roc_curve(&histogram);
        write_report(path, |w| report::write_roc(w, delimiter, &points))?;
    }

    match equal_error_rate(&histogram) {
        Some(eer) => {
            if !cli.quiet {
                println!("EER = {}% at threshold t = {}", eer.percent, eer.threshold);
            }
            if let Some(path) = &out.eer {
                write_report(path, |w| report::write_eer(w, delimiter, &eer))?;
            }
        }
        None => tracing::warn!(
            genuine = histogram.genuine_total(),
            impostor = histogram.impostor_total(),
            "no equal error rate: a score population is empty"
        ),
    }

    Ok(())
}
