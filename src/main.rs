//! # id-watermark CLI
//!
//! Command-line interface for watermarking ID cards and documents.
//!
//! ## Usage
//!
//! ```bash
//! # Watermark a single image
//! id-watermark process id.jpg id-marked.jpg --company "ACME Corp"
//!
//! # Watermark a whole directory tree with 8 workers
//! id-watermark batch ./scans ./marked --company "ACME Corp" --workers 8 --recursive
//!
//! # Write an example settings file (default: ~/.config/id-watermark/config.yaml)
//! id-watermark config generate
//!
//! # Show the effective settings
//! id-watermark config show
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use id_watermark::{
    BatchOptions, BatchProcessor, BatchResult, Renderer, Settings, WatermarkConfig,
    WatermarkError, logging, pipeline,
    settings::{Overrides, default_path},
};

/// id-watermark - diagonal watermarks for ID cards and sensitive documents
///
/// Applies a repeating diagonal pattern of company name and date across the
/// entire image to discourage unauthorized reuse.
#[derive(Parser, Debug)]
#[command(name = "id-watermark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (default: ./id-watermark.yaml, then ~/.config/id-watermark/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Verbose output with timestamps
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Watermark options shared by `process` and `batch`
#[derive(Args, Debug)]
struct WatermarkArgs {
    /// Company name for the watermark
    #[arg(short, long)]
    company: String,

    /// Path to a TTF font file
    #[arg(short, long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Font size for the watermark (10-200)
    #[arg(short, long)]
    size: Option<f32>,

    /// Watermark opacity (0-255)
    #[arg(short, long)]
    opacity: Option<u8>,

    /// Horizontal spacing between watermarks (5-200)
    #[arg(short = 'x', long)]
    text_spacing: Option<f32>,

    /// Vertical spacing between watermark lines (5-200)
    #[arg(short = 'y', long)]
    line_spacing: Option<f32>,

    /// JPEG output quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,
}

impl WatermarkArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            font_path: self.font.clone(),
            font_size: self.size,
            opacity: self.opacity,
            text_spacing: self.text_spacing,
            line_spacing: self.line_spacing,
            quality: self.quality,
            log_level: None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark a single image file
    Process {
        /// Input image (.jpg, .jpeg, .png)
        input: PathBuf,

        /// Output image; format follows the extension
        output: PathBuf,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Watermark every image in a directory
    Batch {
        /// Directory to scan for images
        input_dir: PathBuf,

        /// Directory to write watermarked copies to
        output_dir: PathBuf,

        #[command(flatten)]
        watermark: WatermarkArgs,

        /// Number of parallel workers (default from settings)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Process subdirectories recursively
        #[arg(short, long)]
        recursive: bool,
    },

    /// Settings file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write an example settings file
    Generate {
        /// Target file (default: ~/.config/id-watermark/config.yaml)
        filename: Option<PathBuf>,
    },

    /// Show the effective settings
    Show,
}

fn main() {
    if let Err(e) = run() {
        error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), WatermarkError> {
    let cli = Cli::parse();

    let loaded = Settings::load(cli.config.as_deref());
    let level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|s| s.log_level.clone()))
        .unwrap_or_else(|| logging::DEFAULT_LOG_LEVEL.to_string());
    if let Err(e) = logging::init(&level, cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let mut settings = usable_settings(&cli.command, loaded)?;
    settings.apply_overrides(&Overrides {
        log_level: cli.log_level,
        ..Default::default()
    });

    match cli.command {
        Commands::Process {
            input,
            output,
            watermark,
        } => {
            info!(input = %input.display(), output = %output.display(), "processing single image");

            settings.apply_overrides(&watermark.overrides());
            let renderer = Renderer::new(build_config(&settings, &watermark.company)?)?;
            pipeline::process_file(&renderer, &input, &output)?;

            info!("image processed successfully");
        }

        Commands::Batch {
            input_dir,
            output_dir,
            watermark,
            workers,
            recursive,
        } => {
            info!(
                input_dir = %input_dir.display(),
                output_dir = %output_dir.display(),
                "processing directory"
            );

            settings.apply_overrides(&watermark.overrides());
            let config = build_config(&settings, &watermark.company)?;
            let workers = workers
                .filter(|&w| w > 0)
                .unwrap_or(settings.default_workers);

            let processor = BatchProcessor::new(config, BatchOptions::new(workers, recursive))?;
            let result = processor.process_directory(&input_dir, &output_dir)?;
            report(&result);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Generate { filename } => {
                let path = filename.unwrap_or_else(default_path);
                generate_config(&path)?;
            }
            ConfigCommands::Show => show_config(&settings),
        },
    }

    Ok(())
}

/// `config generate` replaces the settings file, so an unreadable one only
/// warns there; every other command fails on it.
fn usable_settings(
    command: &Commands,
    loaded: Result<Settings, WatermarkError>,
) -> Result<Settings, WatermarkError> {
    match loaded {
        Ok(settings) => Ok(settings),
        Err(e)
            if matches!(
                command,
                Commands::Config {
                    command: ConfigCommands::Generate { .. }
                }
            ) =>
        {
            warn!(error = %e, "ignoring unreadable settings file");
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}

/// Load the font and build validated watermark parameters
fn build_config(settings: &Settings, company: &str) -> Result<WatermarkConfig, WatermarkError> {
    let font = settings.load_font()?;
    settings.watermark_config(company, font)
}

/// Log the batch summary and every failed file
fn report(result: &BatchResult) {
    if result.error_count > 0 {
        warn!(
            "completed with {} errors out of {} files",
            result.error_count, result.total_count
        );
        for failure in &result.errors {
            error!(file = %failure.file_path.display(), error = %failure.error, "processing failed");
        }
    } else {
        info!("successfully processed all {} files", result.success_count);
    }
}

fn generate_config(path: &Path) -> Result<(), WatermarkError> {
    info!(file = %path.display(), "generating configuration file");
    Settings::example().save(path)?;
    info!("configuration file generated: {}", path.display());
    Ok(())
}

fn show_config(settings: &Settings) {
    let color = settings.watermark_color;

    println!("Current Configuration:");
    println!("  Font Path:         {}", settings.font_path.display());
    println!("  Font Size:         {:.1}", settings.font_size);
    println!("  Opacity:           {}", settings.opacity);
    println!("  Text Spacing:      {:.1}", settings.text_spacing);
    println!("  Line Spacing:      {:.1}", settings.line_spacing);
    println!("  Quality:           {}", settings.quality);
    println!("  Log Level:         {}", settings.log_level);
    println!("  Default Workers:   {}", settings.default_workers);
    println!("  Watermark Color:   RGB({}, {}, {})", color.r, color.g, color.b);

    println!("\nSystem Font Paths:");
    for path in &settings.system_font_paths {
        let marker = if path.exists() { "" } else { " (missing)" };
        println!("  - {}{}", path.display(), marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn broken_settings() -> Result<Settings, WatermarkError> {
        Settings::from_file(Path::new("/nonexistent/id-watermark.yaml"))
    }

    #[test]
    fn test_generate_survives_broken_settings() {
        let cli = parse(&["id-watermark", "config", "generate", "fresh.yaml"]);
        let settings = usable_settings(&cli.command, broken_settings()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_other_commands_fail_on_broken_settings() {
        for args in [
            &["id-watermark", "config", "show"][..],
            &["id-watermark", "process", "a.png", "b.png", "--company", "ACME"][..],
            &["id-watermark", "batch", "in", "out", "-c", "ACME", "-w", "2", "-r"][..],
        ] {
            let cli = parse(args);
            let result = usable_settings(&cli.command, broken_settings());
            assert!(matches!(result, Err(WatermarkError::ConfigFile(_))), "{:?}", args);
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
