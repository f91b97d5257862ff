use clap::Parser;
use deepscan::{cli, config, errors};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, 0) => "warn",
        (_, 0) => "info",
        (_, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let result = match cli.command {
        cli::Commands::Serve(args) => cli::serve::handle_serve(args).await,
        cli::Commands::Add(args) => cli::add::handle_add(args).await,
        cli::Commands::Scan(args) => cli::scan::handle_scan(args, cli.quiet).await,
        cli::Commands::Status(args) => cli::status::handle_status(args).await,
        cli::Commands::Report(args) => cli::report::handle_report(args).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                errors::DeepScanError::Config(_) => 2,
                errors::DeepScanError::SubjectNotFound(_) | errors::DeepScanError::ReportNotFound(_) => 3,
                errors::DeepScanError::InvalidTarget(_) => 4,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), errors::DeepScanError> {
    let path = std::path::PathBuf::from(&args.config);
    let parsed = config::parse_config(&path).await?;
    let settings = config::ScanSettings::resolve(&parsed);
    println!("Configuration is valid: {}", args.config);
    println!(
        "  tools: {} / {} / {} / {}",
        settings.enumerator.program,
        settings.port_prober.program,
        settings.vuln_matcher.program,
        settings.web_fingerprinter.program,
    );
    Ok(())
}
