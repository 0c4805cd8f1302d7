//! boundarycam — streaming scoreboard-OCR event detector and highlight
//! assembler for cricket match video.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use boundarycam_assembler::{check_ffmpeg, FfmpegMediaTool};
use boundarycam_core::{save_events_csv, LoggingProgressSink, Pipeline, RoiConfig, RunConfig};
use boundarycam_ocr::WindowsScoreReader;

#[derive(Parser)]
#[command(name = "boundarycam")]
#[command(about = "Scoreboard-OCR cricket event detector and highlight assembler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a source video
    Run {
        /// Path to the source video
        video_path: PathBuf,

        /// Directory for clips, supercut, and events.csv
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// ROI configuration JSON file; defaults are used if absent
        #[arg(long)]
        roi_config: Option<PathBuf>,

        /// Run configuration TOML file; defaults are used if absent
        #[arg(long)]
        run_config: Option<PathBuf>,

        /// OCR language tag, e.g. "en-US"
        #[arg(long)]
        language: Option<String>,
    },

    /// Write a default ROI configuration file
    Roi {
        /// Output path for the ROI JSON file
        #[arg(default_value = "roi.json")]
        path: PathBuf,
    },

    /// Check external dependencies (ffmpeg)
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    boundarycam_core::colored_logger::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run {
            video_path,
            output_dir,
            roi_config,
            run_config,
            language,
        } => cmd_run(video_path, output_dir, roi_config, run_config, language),
        Commands::Roi { path } => cmd_roi(path),
        Commands::Check => cmd_check(),
    }
}

fn cmd_run(
    video_path: PathBuf,
    output_dir: PathBuf,
    roi_config_path: Option<PathBuf>,
    run_config_path: Option<PathBuf>,
    language: Option<String>,
) -> Result<()> {
    if !check_ffmpeg() {
        error!("ffmpeg not found in PATH - please install FFmpeg");
        return Err(anyhow::anyhow!("FFmpeg not found"));
    }

    let roi_config = match roi_config_path {
        Some(path) => RoiConfig::from_file(&path).context("failed to load ROI config")?,
        None => RoiConfig::default(),
    };
    let run_config = match run_config_path {
        Some(path) => RunConfig::from_file(&path).context("failed to load run config")?,
        None => RunConfig::default(),
    };

    info!("starting run over {:?}", video_path);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("received shutdown signal, stopping between observations");
        r.store(false, Ordering::SeqCst);
    })?;

    let reader = WindowsScoreReader::new(language.as_deref(), run_config.min_confidence, run_config.use_gpu)
        .context("failed to initialize OCR engine")?;
    let mut pipeline = Pipeline::new(reader, FfmpegMediaTool, &run_config, "mp4");

    let mut progress = LoggingProgressSink::default();
    let output = pipeline.run(
        &video_path,
        &roi_config,
        &run_config,
        &output_dir,
        &mut progress,
        || !running.load(Ordering::SeqCst),
    )?;

    info!(
        "done: {} events, {} clips, supercut: {:?}",
        output.events.len(),
        output.clip_paths.len(),
        output.supercut_path
    );

    let csv_path = output_dir.join("events.csv");
    save_events_csv(&output.events, &csv_path)?;

    Ok(())
}

fn cmd_roi(path: PathBuf) -> Result<()> {
    let config = RoiConfig::default();
    config.save(&path)?;
    info!("wrote default ROI configuration to {:?}", path);
    Ok(())
}

fn cmd_check() -> Result<()> {
    println!("checking dependencies...\n");

    let ffmpeg_ok = check_ffmpeg();
    println!("  ffmpeg: {}", if ffmpeg_ok { "OK" } else { "NOT FOUND" });

    println!();
    if !ffmpeg_ok {
        println!("WARNING: FFmpeg is required for frame sampling and clip assembly.");
        println!("Please install FFmpeg and ensure it's in your PATH.");
    } else {
        println!("all checks passed!");
    }

    Ok(())
}
