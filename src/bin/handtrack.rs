use clap::Parser;
use color_eyre::eyre::Result;
use handtrack::backend::{Camera, Display, KeyPress, OpenCvVision};
use handtrack::{Pipeline, TrackerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Track an open hand in a video stream", long_about = None)]
struct Cli {
    /// TOML configuration file, command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read frames from a video file instead of the camera
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Camera device index
    #[arg(long)]
    camera: Option<i32>,

    /// Recorded output video
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write per-frame hand reports as JSON lines
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Run without windows; stops at the end of the input only
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn config(&self) -> Result<TrackerConfig> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::from_file(path)?,
            None => TrackerConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(camera) = self.camera {
            config.camera = camera;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if self.headless {
            config.show_windows = false;
        }

        config.validate()?;

        Ok(config)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    let mut camera = Camera::open(&config)?;
    let fps = camera.fps()?.unwrap_or(config.fallback_fps);
    let (width, height) = camera.size()?;
    info!("capture {}x{} @ {} fps", width, height, fps);

    let mut display = Display::open(&config.output, fps, (width, height), config.show_windows)?;
    info!("recording to {}", config.output.display());

    let mut pipeline = Pipeline::from_config(OpenCvVision::new(&config)?, &config);
    if let Some(path) = &cli.report {
        pipeline = pipeline.with_reports(std::io::BufWriter::new(std::fs::File::create(path)?));
        info!("writing hand reports to {}", path.display());
    }

    let mut quit = KeyPress::new('q', config.show_windows);
    let stats = pipeline.run(&mut camera, &mut display, &mut quit)?;
    display.release()?;

    info!(
        "processed {} frames, {} with an open hand",
        stats.frames, stats.complete
    );

    Ok(())
}
