use appstore_preview_builder::{BatchRequest, PreviewOptions, run_batch};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Create App Store preview videos and screenshots.
#[derive(Parser)]
#[command(name = "appstore-preview", version, about)]
struct Cli {
    /// Input iPhone video file (.mov, .m4v, .mp4)
    #[arg(long, value_name = "PATH")]
    iphone: PathBuf,
    /// Input iPad video file (.mov, .m4v, .mp4)
    #[arg(long, value_name = "PATH")]
    ipad: PathBuf,
    /// Input audio file (.mp3, .wav, .aac)
    #[arg(long, value_name = "PATH")]
    audio: PathBuf,
    /// Output directory
    #[arg(long, value_name = "DIR", default_value = "output")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = PreviewOptions::from_env().wrap_err("invalid environment configuration")?;
    info!("Using preset {}", options.preset);

    let request = BatchRequest {
        iphone_video: cli.iphone,
        ipad_video: cli.ipad,
        audio: cli.audio,
        output_dir: cli.output,
    };

    let report = match run_batch(&request, &options).await {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if report.is_success() {
        info!("All processing completed successfully!");
        Ok(ExitCode::SUCCESS)
    } else {
        for (device, e) in report.failures() {
            error!("{} assets were not generated: {e}", device.label());
        }
        Ok(ExitCode::FAILURE)
    }
}
