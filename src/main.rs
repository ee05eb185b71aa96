use std::env;

use anyhow::{anyhow, Context, Result};
use log::info;

use shape_scene::{print_summary, run_headless, run_interactive, AppConfig, ShapeKind, WindowInitError};

const DEFAULT_HEADLESS_FRAMES: u32 = 100;
const USAGE: &str =
    "Usage: shape-scene [--shape star|hexagon] [--config <file.xml>] [--frames N] [--summary-only]";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let mut config = match &options.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {path}"))?,
        None => AppConfig::default(),
    };
    if let Some(kind) = options.shape {
        config.shape.kind = kind;
    }
    info!("starting with {} shape", config.shape.kind);

    if options.summary_only {
        return summarize(&config, options.frames);
    }

    match run_interactive(config.clone(), options.frames) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                summarize(&config, options.frames)
            } else {
                Err(err)
            }
        }
    }
}

fn summarize(config: &AppConfig, frames: Option<u32>) -> Result<()> {
    let frames = frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
    let controller = run_headless(config, frames)?;
    print_summary(config, &controller);
    println!("Rendered {} frame(s)", controller.surface().frames());
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    shape: Option<ShapeKind>,
    config: Option<String>,
    frames: Option<u32>,
    summary_only: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--shape" => {
                    let value = args.next().ok_or_else(|| anyhow!("--shape needs a value. {USAGE}"))?;
                    options.shape = Some(value.parse()?);
                }
                "--config" => {
                    let value = args.next().ok_or_else(|| anyhow!("--config needs a path. {USAGE}"))?;
                    options.config = Some(value);
                }
                "--frames" => {
                    let value = args.next().ok_or_else(|| anyhow!("--frames needs a count. {USAGE}"))?;
                    let frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value}"))?;
                    options.frames = Some(frames);
                }
                "--summary-only" => options.summary_only = true,
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_every_flag() {
        let options = parse(&[
            "--shape",
            "hexagon",
            "--config",
            "scene.xml",
            "--frames",
            "12",
            "--summary-only",
        ])
        .unwrap();
        assert_eq!(
            options,
            CliOptions {
                shape: Some(ShapeKind::Hexagon),
                config: Some("scene.xml".into()),
                frames: Some(12),
                summary_only: true,
            }
        );
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(parse(&["--spin"]).is_err());
        assert!(parse(&["--frames"]).is_err());
        assert!(parse(&["--frames", "many"]).is_err());
        assert!(parse(&["--shape", "circle"]).is_err());
    }
}
