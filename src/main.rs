use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use exif_footer::{
    generate_output_path, inspect, render_exif_listing, render_selected_listing, Cli, Commands,
    FooterProcessor, FooterStyle, MetadataStatus,
};
use log::LevelFilter;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Help and usage errors exit with status 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match cli.command() {
        Commands::PrintExif => process_inspect(&cli.input, false),
        Commands::SpecificExif => process_inspect(&cli.input, true),
        Commands::Footer(style) => process_footer(cli, style),
    }
}

fn process_inspect(input: &Path, selected_only: bool) -> anyhow::Result<()> {
    let extracted = inspect(input)
        .with_context(|| format!("Failed to read metadata from {}", input.display()))?;

    let listing = if selected_only {
        render_selected_listing(&extracted.record)
    } else {
        render_exif_listing(&extracted.record)
    };
    print!("{}", listing);

    Ok(())
}

fn process_footer(cli: &Cli, style: FooterStyle) -> anyhow::Result<()> {
    let output_path = generate_output_path(&cli.input, cli.output.as_deref(), cli.output_suffix());
    let config = cli.footer_config(style);

    let processor =
        FooterProcessor::new(config).context("Failed to set up the footer processor")?;

    let report = processor
        .process(&cli.input, &output_path)
        .with_context(|| format!("Failed to add footer to {}", cli.input.display()))?;

    // unreadable EXIF is already reported while extracting
    if report.metadata == MetadataStatus::Absent {
        log::warn!("No EXIF in {}, footer shows Unknown", cli.input.display());
    }

    println!("Image saved to: {}", report.output_path.display());

    Ok(())
}
