use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use text2speech::SynthesisConfig;
use text2speech::config::{DEFAULT_MODEL, DEFAULT_OUTPUT, DEFAULT_TEXT};

#[derive(Parser, Debug)]
#[command(name = "text2speech")]
#[command(
    about = "Convert text to speech with a pretrained VITS model",
    long_about = "Convert text to speech with a pretrained VITS model.\n\n\
        Runs without arguments: the default model is downloaded from the \
        HuggingFace Hub and the default sentence is saved as output.wav in \
        the current directory."
)]
struct Cli {
    /// Text2speech model location (HuggingFace repo id or local directory)
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Path to the output file
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Text to be transformed into speech
    #[arg(long, default_value = DEFAULT_TEXT)]
    text: String,
}

impl Cli {
    fn into_config(self) -> SynthesisConfig {
        SynthesisConfig::new(self.model, self.output, self.text)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Cli::parse().into_config();
    log::debug!("resolved configuration: {config:?}");

    let report = text2speech::run(&config, |stage| println!(">>>> {stage} <<<<"))
        .with_context(|| {
            format!(
                "Failed to synthesize speech with model '{}' into {}",
                config.model,
                config.output.display()
            )
        })?;

    log::info!(
        "{} frames x {} channel(s) at {} Hz ({} ms)",
        report.frames,
        report.channels,
        report.sample_rate,
        report.duration_ms
    );

    Ok(())
}
