use clap::Parser;
use dcmsplit_core::analysis::{analyze_compression, analyze_tag_sizes, compare_dicom_files};
use dcmsplit_core::api::{extract_folder, process_folder};
use dcmsplit_core::cli::report::{BatchReport, ComparisonReport, CompressionReport, TagSizeReport};
use dcmsplit_core::cli::{Cli, Command};
use dcmsplit_core::{LogReporter, Recombiner, Result};
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Runs a command, returning whether everything it touched succeeded
fn run(command: Command) -> Result<bool> {
    let reporter = LogReporter;

    match command {
        Command::Extract(args) => {
            info!("Extracting {} into {}", args.input.display(), args.output.display());
            let summary = extract_folder(&args.input, &args.output, args.options(), &reporter)?;
            println!("{}", BatchReport::new(&summary));
            Ok(summary.failed.is_empty())
        }
        Command::Process(args) => {
            info!("Processing {} into {}", args.input.display(), args.output.display());
            let summary = process_folder(&args.input, &args.output, args.options(), &reporter)?;
            println!("{}", BatchReport::new(&summary));
            Ok(summary.failed.is_empty() && summary.identical_count() == summary.comparisons.len())
        }
        Command::Recombine {
            metadata,
            pixels,
            output,
        } => {
            let summary = Recombiner::new(&reporter).recombine(&metadata, pixels.as_deref(), &output)?;
            println!(
                "Wrote {} ({} elements, {} skipped)",
                summary.output_path.display(),
                summary.elements_written,
                summary.elements_skipped
            );
            Ok(summary.elements_skipped == 0)
        }
        Command::Analyze { input, output } => {
            let compression = analyze_compression(&input)?;
            println!("{}", CompressionReport::new(&compression));
            let sizes = analyze_tag_sizes(&input)?;
            println!("{}", TagSizeReport::new(&sizes));

            match output {
                Some(recombined) => {
                    let result = compare_dicom_files(&input, &recombined);
                    println!("{}", ComparisonReport::new(&result));
                    Ok(result.is_identical)
                }
                None => Ok(true),
            }
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
