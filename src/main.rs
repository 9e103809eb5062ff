use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use promptwheel::config::EngineDefaults;
use promptwheel::engine::{IterateRequest, LoopMode, NamingMode, SeedMode, TraversalMode};
use promptwheel::logging::{init_logging, LoggingConfig};
use promptwheel::runner::{Runner, RunnerConfig};

/// Prompts file used when none is given.
const DEFAULT_PROMPTS_FILE: &str = "prompts.txt";

/// Traversal mode selecting the item index
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTraversalMode {
    /// Walk the batch in order
    Sequential,
    /// Return the requested index, clamped into range
    Manual,
    /// Draw from a reshuffled permutation each step
    Random,
    /// Always return the first prompt
    Single,
}

impl From<CliTraversalMode> for TraversalMode {
    fn from(mode: CliTraversalMode) -> Self {
        match mode {
            CliTraversalMode::Sequential => TraversalMode::Sequential,
            CliTraversalMode::Manual => TraversalMode::Manual,
            CliTraversalMode::Random => TraversalMode::Random,
            CliTraversalMode::Single => TraversalMode::Single,
        }
    }
}

/// Boundary behavior for sequential traversal
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLoopMode {
    /// Freeze on the last prompt
    Once,
    /// Wrap back to the first prompt
    Loop,
    /// Bounce between the ends
    PingPong,
}

impl From<CliLoopMode> for LoopMode {
    fn from(mode: CliLoopMode) -> Self {
        match mode {
            CliLoopMode::Once => LoopMode::Once,
            CliLoopMode::Loop => LoopMode::Loop,
            CliLoopMode::PingPong => LoopMode::PingPong,
        }
    }
}

/// Filename derivation mode
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNamingMode {
    /// `{base}_{index:03}`
    AutoIndex,
    /// Entry from the filename list
    FilenameList,
    /// Base plus the suffix entry
    SuffixList,
    /// Caller-supplied template
    Template,
}

impl From<CliNamingMode> for NamingMode {
    fn from(mode: CliNamingMode) -> Self {
        match mode {
            CliNamingMode::AutoIndex => NamingMode::AutoIndex,
            CliNamingMode::FilenameList => NamingMode::FilenameList,
            CliNamingMode::SuffixList => NamingMode::SuffixList,
            CliNamingMode::Template => NamingMode::Template,
        }
    }
}

/// Seed policy
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSeedMode {
    /// Carry the seed unchanged
    Fixed,
    /// Bump once per repeat pass
    IncrementBatch,
    /// Bump on every step
    IncrementPrompt,
    /// Fresh draw each step
    Random,
}

impl From<CliSeedMode> for SeedMode {
    fn from(mode: CliSeedMode) -> Self {
        match mode {
            CliSeedMode::Fixed => SeedMode::Fixed,
            CliSeedMode::IncrementBatch => SeedMode::IncrementBatch,
            CliSeedMode::IncrementPrompt => SeedMode::IncrementPrompt,
            CliSeedMode::Random => SeedMode::Random,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "promptwheel")]
#[command(version)]
#[command(about = "Stateful prompt iteration with filename and seed derivation")]
struct Cli {
    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Defaults file (falls back to promptwheel.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Step through prompts (default behavior if no command given)
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// File with one prompt per line, `-` for stdin [default: prompts.txt]
    #[arg(long, short)]
    prompts: Option<PathBuf>,

    /// Number of steps to run
    #[arg(long)]
    steps: Option<u32>,

    /// Traversal mode
    #[arg(long, value_enum)]
    mode: Option<CliTraversalMode>,

    /// Loop mode for sequential traversal
    #[arg(long, value_enum)]
    loop_mode: Option<CliLoopMode>,

    /// Filename derivation mode
    #[arg(long, value_enum)]
    filename_mode: Option<CliNamingMode>,

    /// Base filename stem
    #[arg(long, short)]
    base_filename: Option<String>,

    /// File with one filename per line (filename-list mode)
    #[arg(long)]
    filenames: Option<PathBuf>,

    /// File with one suffix per line (suffix-list and template modes)
    #[arg(long)]
    suffixes: Option<PathBuf>,

    /// Filename template with {base}, {index}, {suffix} placeholders
    #[arg(long)]
    template: Option<String>,

    /// Text added before each prompt
    #[arg(long, default_value = "")]
    prepend: String,

    /// Text added after each prompt
    #[arg(long, default_value = "")]
    append: String,

    /// Prompt index for manual mode
    #[arg(long, default_value = "0")]
    manual_index: usize,

    /// Reset workflow state before the first step
    #[arg(long)]
    reset: bool,

    /// Generation seed; -1 draws a fresh one
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    seed: i64,

    /// Seed policy
    #[arg(long, value_enum)]
    seed_mode: Option<CliSeedMode>,

    /// Workflow id partitioning iteration state
    #[arg(long, short)]
    workflow_id: Option<String>,

    /// Print the debug payload after each step
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(LoggingConfig::from_verbosity(cli.verbose));
    }

    let defaults = match EngineDefaults::discover(cli.config.as_deref()) {
        Ok(defaults) => defaults,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let args = match cli.command {
        Some(Commands::Run(args)) => args,
        None => cli.run,
    };

    match run_steps(args, &defaults, cli.quiet) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Build the engine request from flags and defaults, then run the steps.
///
/// Returns `Ok(false)` when the run stopped early (the runner already
/// reported why).
fn run_steps(args: RunArgs, defaults: &EngineDefaults, quiet: bool) -> Result<bool, String> {
    let prompts_path = args
        .prompts
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_FILE));
    let prompts = read_lines(&prompts_path)?;
    let filenames = match &args.filenames {
        Some(path) => read_lines(path)?,
        None => Vec::new(),
    };
    let suffixes = match &args.suffixes {
        Some(path) => read_lines(path)?,
        None => Vec::new(),
    };

    let mut request = IterateRequest::new(prompts)
        .with_mode(args.mode.map(Into::into).unwrap_or(defaults.mode))
        .with_loop_mode(args.loop_mode.map(Into::into).unwrap_or(defaults.loop_mode))
        .with_filename_mode(
            args.filename_mode
                .map(Into::into)
                .unwrap_or(defaults.filename_mode),
        )
        .with_base_filename(
            args.base_filename
                .unwrap_or_else(|| defaults.base_filename.clone()),
        )
        .with_filenames(filenames)
        .with_suffixes(suffixes)
        .with_affixes(args.prepend, args.append)
        .with_manual_index(args.manual_index)
        .with_reset(args.reset)
        .with_seed_mode(args.seed_mode.map(Into::into).unwrap_or(defaults.seed_mode))
        .with_workflow_id(
            args.workflow_id
                .unwrap_or_else(|| defaults.workflow_id.clone()),
        );
    if let Some(template) = args.template {
        request = request.with_template(template);
    }
    if args.seed >= 0 {
        request = request.with_generation_seed(args.seed);
    }

    let runner = Runner::new(RunnerConfig {
        request,
        steps: args.steps.unwrap_or(defaults.steps),
        quiet,
        show_debug: args.json,
    });

    Ok(runner.run().completed)
}

/// Read input lines from a file, or stdin for `-`.
fn read_lines(path: &Path) -> Result<Vec<String>, String> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?
    };
    Ok(content.lines().map(String::from).collect())
}
