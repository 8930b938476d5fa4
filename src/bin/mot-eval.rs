use std::path::PathBuf;
use std::process;

use clap::Parser;

use motchallenge_rs::{AnnotationMode, DataLoader, LoaderConfig, MetricsReport, SequenceLoader};

/// Walk a MOTChallenge dataset and report MOT metrics per sequence.
///
/// Each frame's annotations are fed back as predictions, which checks the
/// dataset and the evaluation loop end to end.
#[derive(Parser)]
#[command(name = "mot-eval")]
struct Cli {
    /// Dataset root containing split directories (train/, test/).
    root: PathBuf,

    /// Group annotations as box midpoints instead of full boxes.
    #[arg(long)]
    midpoints: bool,

    /// Sequence directory prefix.
    #[arg(long, default_value = "MOT16")]
    challenge: String,

    /// Print reports as JSON lines instead of tables.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mode = if cli.midpoints {
        AnnotationMode::Midpoints
    } else {
        AnnotationMode::Boxes
    };
    let config = LoaderConfig::new(&cli.root)
        .with_challenge(cli.challenge)
        .with_mode(mode);
    let loader = DataLoader::new(config);

    let mut evaluated = 0;
    for sequence in &loader {
        let report = evaluate(sequence?)?;
        print_report(&report, cli.json)?;
        evaluated += 1;
    }

    if evaluated == 0 {
        log::warn!("no sequences found under {}", cli.root.display());
    } else {
        log::info!("evaluated {evaluated} sequences under {}", cli.root.display());
    }
    Ok(())
}

fn evaluate(mut sequence: SequenceLoader) -> Result<MetricsReport, Box<dyn std::error::Error>> {
    while let Some(frame) = sequence.next() {
        let frame = frame?;
        let predictions = frame.annotations.midpoints();
        sequence.update_metrics(&predictions)?;
    }
    Ok(sequence.display_metrics())
}

fn print_report(report: &MetricsReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{report}\n");
    }
    Ok(())
}
