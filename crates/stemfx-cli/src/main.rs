use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use stemfx_cli::config::RackConfigFile;
use stemfx_cli::pipeline::Pipeline;
use stemfx_cli::separator::StemDirectorySeparator;
use stemfx_rack::{
    InstrumentFamily, PassthroughSeparator, Preset, RandomRange, Settings, SourceSeparator,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Process(args) => execute_process(args),
        Commands::Batch(args) => execute_batch(args),
        Commands::Presets(args) => execute_presets(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

#[derive(Parser)]
#[command(author, version, about = "Per-instrument effect racks for separated stems")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Separate one mix and process every stem.
    Process(ProcessArgs),
    /// Process several mixes, each into its own sub-directory.
    Batch(BatchArgs),
    /// Print presets, defaults and randomization ranges as JSON.
    Presets(PresetsArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// Mix to separate (wav, flac or mp3).
    input: PathBuf,
    /// Directory receiving `separated/` and `processed/`.
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    rack: RackArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Mixes to process, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    rack: RackArgs,
}

#[derive(Args)]
struct PresetsArgs {
    /// Only list this family.
    #[arg(long)]
    family: Option<InstrumentFamily>,
}

#[derive(Args)]
struct RackArgs {
    #[arg(long)]
    vocal_preset: Option<String>,
    #[arg(long)]
    bass_preset: Option<String>,
    /// Defaults to `clean`.
    #[arg(long)]
    guitar_preset: Option<String>,
    #[arg(long)]
    synth_preset: Option<String>,
    /// Randomize every rack from this seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Rack config file; defaults to `<config dir>/stemfx/racks.json` if present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = SeparatorKind::Passthrough)]
    separator: SeparatorKind,
    /// Directory of `<stem>.wav` files for `--separator stem-dir`.
    #[arg(long)]
    stems_dir: Option<PathBuf>,
    /// Families to process; all of them when omitted.
    #[arg(long, value_delimiter = ',')]
    families: Vec<InstrumentFamily>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeparatorKind {
    /// Every stem is the unseparated mix.
    Passthrough,
    /// Read pre-separated stems from `--stems-dir`.
    StemDir,
}

impl RackArgs {
    fn config(&self) -> Result<RackConfigFile> {
        let file = RackConfigFile::load(self.config.as_deref())?;
        Ok(file.with_presets([
            (InstrumentFamily::Vocal, self.vocal_preset.as_deref()),
            (InstrumentFamily::Bass, self.bass_preset.as_deref()),
            (InstrumentFamily::Guitar, self.guitar_preset.as_deref()),
            (InstrumentFamily::Synth, self.synth_preset.as_deref()),
        ]))
    }

    fn separator(&self) -> Result<Box<dyn SourceSeparator>> {
        match self.separator {
            SeparatorKind::Passthrough => Ok(Box::new(PassthroughSeparator)),
            SeparatorKind::StemDir => {
                let dir = self
                    .stems_dir
                    .clone()
                    .context("--separator stem-dir needs --stems-dir")?;
                Ok(Box::new(StemDirectorySeparator::new(dir)))
            }
        }
    }

    fn pipeline<'a>(&self, separator: &'a dyn SourceSeparator) -> Result<Pipeline<'a>> {
        let mut pipeline = Pipeline::new(separator, self.config()?).with_seed(self.seed);
        if !self.families.is_empty() {
            pipeline = pipeline.with_families(self.families.clone());
        }
        Ok(pipeline)
    }
}

fn execute_process(args: ProcessArgs) -> Result<()> {
    let separator = args.rack.separator()?;
    let pipeline = args.rack.pipeline(separator.as_ref())?;
    let report = pipeline.process_file(&args.input, &args.output)?;
    for output in &report.outputs {
        println!("{}: {}", output.family, output.processed.display());
    }
    if !report.failures.is_empty() {
        bail!("{} of the stems failed", report.failures.len());
    }
    Ok(())
}

fn execute_batch(args: BatchArgs) -> Result<()> {
    let separator = args.rack.separator()?;
    let pipeline = args.rack.pipeline(separator.as_ref())?;
    let report = pipeline.process_batch(&args.inputs, &args.output);
    println!(
        "Processed {} of {} files",
        report.files.len(),
        args.inputs.len()
    );
    for (input, error) in &report.failed {
        println!("  {}: {error}", input.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct FamilyListing {
    family: InstrumentFamily,
    default_preset: &'static str,
    defaults: Settings,
    presets: &'static [Preset],
    random_ranges: &'static [RandomRange],
}

fn execute_presets(args: PresetsArgs) -> Result<()> {
    let listings: Vec<FamilyListing> = InstrumentFamily::ALL
        .into_iter()
        .filter(|family| args.family.map_or(true, |only| only == *family))
        .map(|family| FamilyListing {
            family,
            default_preset: family.default_preset(),
            defaults: family.layout().defaults(),
            presets: family.presets(),
            random_ranges: family.random_ranges(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&listings).context("failed to encode presets")?;
    println!("{json}");
    Ok(())
}
