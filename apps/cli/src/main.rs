use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, error::ErrorKind};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ytcefr_core::{Analysis, CaptionOutcome, Config, Pipeline, RunReport, Stage, YoutubeCaptions};

#[derive(Parser)]
#[command(name = "ytcefr")]
#[command(about = "Fetch YouTube captions, grade their CEFR level with an LLM and render a summary")]
struct Cli {
    /// YouTube video URL
    url: String,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_directive()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_summary(report: &RunReport) {
    let ok = style("✓").green().bold();
    let degraded = style("✗").yellow().bold();

    match report.captions {
        Some(CaptionOutcome::Cached) => {
            println!("{} Captions {}", ok, style("(cached)").dim())
        }
        Some(CaptionOutcome::Fetched { entries, sentences }) => println!(
            "{} Captions: {} entries, {} sentences",
            ok, entries, sentences
        ),
        None => println!("{} Captions unavailable", degraded),
    }

    match &report.info {
        Some(info) => println!("{} Video info: {}", ok, style(&info.title).dim()),
        None => println!("{} Video info unavailable", degraded),
    }

    match &report.analysis {
        Analysis::Present(record) => println!(
            "{} Analysis: {} {}",
            ok,
            style(record.cefr).yellow(),
            style(format!("({} WPM)", record.kpm)).dim()
        ),
        Analysis::Absent { reason } => {
            println!("{} Analysis unavailable {}", degraded, style(reason).dim())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    // A wrong argument count is not an error: warn and exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            warn!("Usage: ytcefr <YouTube URL>");
            return Ok(());
        }
    };

    println!(
        "\n{}  {}\n",
        style("ytcefr").cyan().bold(),
        style("Video Level Analyzer").dim()
    );

    let captions = YoutubeCaptions::new()?;
    let pipeline = Pipeline::new(&config, &captions);
    let provider = config.provider;

    let total_start = Instant::now();
    let spinner = create_spinner("Preparing...");
    let result = pipeline
        .run(&cli.url, |stage| match stage {
            Stage::Start => spinner.set_message("Fetching captions..."),
            Stage::Captioned => {
                spinner.set_message(format!("Analyzing with {}...", provider.name()))
            }
            Stage::Analyzed => {
                spinner.set_message(format!("Rendering with {}...", provider.name()))
            }
            Stage::Rendered | Stage::Done => {}
        })
        .await;
    spinner.finish_and_clear();

    let report = result?;
    print_summary(&report);

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!("{}", style("─".repeat(60)).dim());

    println!("{}", report.rendered);

    Ok(())
}
