use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vidquiz_core::{
    Analysis, BatchOptions, GeminiClient, GeminiConfig, ProcessorConfig, VideoDescriptor,
    VideoProcessor, YtDlp, format_analysis_readable, format_duration, format_stats,
    load_descriptors, provider::DEFAULT_MODEL, run_batch, save_descriptors,
    source::DEFAULT_FORMAT,
};

#[derive(Parser)]
#[command(name = "vidquiz")]
#[command(about = "Download videos, analyze them with Gemini, and extract summaries with Q&A")]
struct Cli {
    /// JSON file with an array of video objects, each carrying a "url"
    input: PathBuf,

    /// Where to write the annotated video objects
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Gemini model used for analysis
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Number of videos processed concurrently
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Seconds between readiness checks of an uploaded video
    #[arg(long, default_value_t = 1)]
    poll_interval: u64,

    /// Give up on an uploaded video that is not ready after this many seconds
    #[arg(long, default_value_t = 600)]
    ready_timeout: u64,

    /// Let the model ground answers with Google Search
    #[arg(long)]
    search: bool,

    /// yt-dlp format selector
    #[arg(long, default_value = DEFAULT_FORMAT)]
    format: String,

    /// Print each analysis as readable text when done
    #[arg(short, long)]
    print: bool,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vidquiz={level},vidquiz_core={level}")));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false),
            )
            .with(env_filter)
            .init();
    }
}

fn create_progress(total: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_msg} {elapsed:.dim}")?
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    pb.set_message("Analyzing videos...");
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

fn report_line(descriptor: &VideoDescriptor) -> String {
    let title = descriptor
        .title()
        .or(descriptor.url())
        .unwrap_or("Unknown Title");

    match descriptor.analysis() {
        Some(Analysis::Completed(result)) => format!(
            "{} {} {}",
            style("✓").green().bold(),
            title,
            style(format!("({} questions)", result.qa.len())).dim()
        ),
        Some(Analysis::Failed(failure)) => format!(
            "{} {} {}",
            style("✗").red().bold(),
            title,
            style(failure.error).red()
        ),
        None => format!("{} {}", style("?").yellow().bold(), title),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Validate API key early
    let gemini_config = match GeminiConfig::from_env() {
        Ok(config) => config.with_model(&cli.model).with_search(cli.search),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "\n{}  {}\n",
        style("vidquiz").cyan().bold(),
        style("Video Q&A").dim()
    );

    let descriptors = load_descriptors(&cli.input).await?;
    let runnable = descriptors.iter().filter(|d| d.url().is_some()).count();
    println!(
        "{} Loaded {} videos from {}",
        style("✓").green().bold(),
        runnable,
        style(cli.input.display()).dim()
    );

    let client = GeminiClient::new(gemini_config).context("failed to build Gemini client")?;
    let processor = VideoProcessor::new(
        YtDlp::new().with_format(&cli.format),
        client,
        ProcessorConfig {
            poll_interval: Duration::from_secs(cli.poll_interval.max(1)),
            ready_timeout: Duration::from_secs(cli.ready_timeout),
            ..ProcessorConfig::default()
        },
    );

    info!(
        model = %cli.model,
        jobs = cli.jobs,
        search = cli.search,
        output = %cli.output.display(),
        "starting batch"
    );
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let progress = create_progress(runnable)?;
    let options = BatchOptions { jobs: cli.jobs };
    let (annotated, stats) = run_batch(&processor, descriptors, options, |descriptor| {
        progress.println(report_line(descriptor));
        progress.inc(1);
    })
    .await;
    progress.finish_and_clear();

    save_descriptors(&annotated, &cli.output)
        .await
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!("{}", style("─".repeat(60)).dim());
    println!("{} {}", style("Done:").dim(), format_stats(&stats));
    println!(
        "{} {}",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!(
        "{} {}\n",
        style("Saved:").dim(),
        style(cli.output.display()).cyan()
    );

    if cli.print {
        for descriptor in &annotated {
            let Some(analysis) = descriptor.analysis() else {
                continue;
            };
            let readable = format_analysis_readable(
                descriptor.title().unwrap_or("Unknown Title"),
                descriptor.url().unwrap_or_default(),
                &analysis,
            );
            println!("{}", readable);
        }
    }

    Ok(())
}
