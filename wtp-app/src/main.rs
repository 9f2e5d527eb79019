mod app;
mod pointer;

pub use app::App;

use anyhow::{Context, Result};
use wtp_experiment::TaskConfig;

struct Args {
    config: Option<String>,
    font: String,
    output: String,
}

fn parse_args() -> Result<Args> {
    let mut config = None;
    let mut font = None;
    let mut output = "task_log.json".to_owned();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next().context("--config needs a path")?),
            "--font" => font = Some(args.next().context("--font needs a path")?),
            "--output" => output = args.next().context("--output needs a path")?,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Args {
        config,
        font: font.context("--font <path to a .ttf> is required")?,
        output,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {path}"))?;
            TaskConfig::from_json_str(&text)?
        }
        None => TaskConfig::default(),
    };
    let font_bytes =
        std::fs::read(&args.font).with_context(|| format!("reading font {}", args.font))?;

    let app = App::new(config, font_bytes, args.output)?;
    app.run()?;

    Ok(())
}
