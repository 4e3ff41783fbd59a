use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_renamer_core::{
    app_paths, default_workers, load_config, save_config, AppConfig, ExifReader,
    ProgressListener, RenameConfig, RenameResult, RenameSummary, Renamer,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "photo-renamer")]
#[command(about = "Rename photos after their EXIF capture time and camera settings")]
struct Cli {
    /// Log every per-file decision
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the config file location and its effective contents
    Show,
    /// Write a config file with default values if none exists
    Init,
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// Folder containing the photos
    target: PathBuf,
    /// Descend into subfolders (default from config)
    #[arg(long, overrides_with = "no_recursive")]
    recursive: bool,
    /// Only look at the top-level folder
    #[arg(long, overrides_with = "recursive")]
    no_recursive: bool,
    /// Rename files on disk; without this only a preview is produced
    #[arg(long, default_value_t = false)]
    apply: bool,
    /// Worker pool size (default from config, then the number of cores)
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let recursive = resolve_recursive(&args, &config);
    let workers = args
        .workers
        .or(config.workers)
        .unwrap_or_else(default_workers);
    let crop_factors = config
        .crop_factor_table()
        .context("invalid crop_factors entry in config")?;

    let renamer = Renamer::with_workers(Arc::new(ExifReader), Arc::new(crop_factors), workers)?;
    let run = RenameConfig {
        target_folder: args.target,
        recursive,
        dry_run: !args.apply,
    };

    let outcome = match args.output {
        OutputFormat::Table => {
            let mut listener = TableListener;
            renamer.rename_photos(&run, &mut listener).map(|_| ())
        }
        OutputFormat::Json => {
            let mut listener = JsonListener::default();
            renamer.rename_photos(&run, &mut listener).and_then(|summary| {
                let report = JsonReport {
                    results: &listener.results,
                    summary,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            })
        }
    };

    if !renamer.shutdown(config.shutdown_timeout()) {
        log::warn!("worker pool did not drain within {:?}", config.shutdown_timeout());
    }
    outcome?;

    if run.dry_run {
        eprintln!("dry-run: no files were changed. Pass --apply to rename.");
    }
    Ok(())
}

fn resolve_recursive(args: &RenameArgs, config: &AppConfig) -> bool {
    if args.recursive {
        true
    } else if args.no_recursive {
        false
    } else {
        config.recursive_default
    }
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() {
        println!("config already exists: {}", paths.config_path.display());
        return Ok(());
    }
    save_config(&AppConfig::default())?;
    println!("wrote defaults to {}", paths.config_path.display());
    Ok(())
}

/// Prints one line per file as results arrive.
struct TableListener;

impl ProgressListener for TableListener {
    fn on_start(&mut self, total: usize) {
        println!("{total} file(s) to process");
    }

    fn on_progress(&mut self, result: RenameResult) {
        println!("{}", result.log_line());
    }

    fn on_complete(&mut self, renamed: usize, skipped: usize, errors: usize) {
        println!("\nsummary: renamed={renamed} skipped={skipped} errors={errors}");
    }
}

#[derive(Default)]
struct JsonListener {
    results: Vec<RenameResult>,
}

impl ProgressListener for JsonListener {
    fn on_start(&mut self, total: usize) {
        self.results.reserve(total);
    }

    fn on_progress(&mut self, result: RenameResult) {
        self.results.push(result);
    }

    fn on_complete(&mut self, _renamed: usize, _skipped: usize, _errors: usize) {}
}

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [RenameResult],
    summary: RenameSummary,
}
