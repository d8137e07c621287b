use clap::Parser;
use cxr_extract::{
    Cli, CliSelection, CxrExtract, CxrExtractError, NullElementSource, OutputFormatter,
    OutputMode, SelectionSource, UserFriendlyError,
};
use std::path::Path;
use std::process;

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create CxrExtract instance
    let app = match CxrExtract::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    // clap enforces the positional unless --generate-config was given
    let Some(input) = cli.input.as_deref() else {
        print_startup_error(&CxrExtractError::InvalidPath {
            path: "<missing input>".to_string(),
        });
        return 1;
    };

    let selector = CliSelection::from_config(&app.config().selection);

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&app, input, &selector);
    }

    // Execute main extraction workflow
    match app.run(input, &selector, &NullElementSource) {
        Ok(report) => {
            app.output_formatter().print_extraction_report(&report);

            if report.is_clean() {
                0 // Success
            } else {
                2 // Completed, but some sequences failed
            }
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &CxrExtractError) -> i32 {
    match error {
        CxrExtractError::Cancelled => 130, // Interrupted (SIGINT)
        CxrExtractError::Config { .. } => 2,
        CxrExtractError::NoFilesFound { .. } => 3,
        CxrExtractError::NoSelectionMade => 4,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "cxr-extract.toml".to_string());

    match CxrExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  cxr-extract <input> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(app: &CxrExtract, input: &Path, selector: &dyn SelectionSource) -> i32 {
    let formatter = app.output_formatter();

    formatter.info("DRY RUN MODE - the conversion tool will not be invoked");
    formatter.print_separator();

    let sequences = match app.discover(input, &NullElementSource) {
        Ok(sequences) => sequences,
        Err(e) => {
            app.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    let request = match selector.select(&sequences) {
        Ok(request) => request,
        Err(e) => {
            app.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    if request.is_empty() {
        let error = CxrExtractError::NoSelectionMade;
        app.handle_error(&error);
        return exit_code_for(&error);
    }

    let config = app.config();

    formatter.info("Configuration that would be used:");
    println!("  Tool: {}", config.tool.path.display());
    println!("  Format: {}", config.output.format);
    println!("  Overwrite: {}", config.output.overwrite);
    formatter.print_separator();

    formatter.info("Extraction plan:");
    for (name, frames) in &sequences {
        let Some(selection) = request.get(name) else {
            println!("  {} -> skipped (no elements selected)", name);
            continue;
        };

        let output_dir = config
            .output
            .base_directory
            .clone()
            .unwrap_or_else(|| frames[0].directory_path.clone());
        let folder = match config.output.prefix.as_deref() {
            Some(p) if !p.is_empty() => format!("{}_{}", p, name),
            _ => name.clone(),
        };

        println!(
            "  {} [{:04}-{:04}] {} frame(s), {} -> {}",
            name,
            frames.first().map(|f| f.frame_number).unwrap_or(0),
            frames.last().map(|f| f.frame_number).unwrap_or(0),
            frames.len(),
            selection.describe(),
            output_dir.join(folder).display()
        );
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the extraction");

    0
}

fn print_startup_error(error: &CxrExtractError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
