use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "deepscan", version, about = "Deep-scan orchestration over subdomain, port, vulnerability and web tooling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP REST API server
    Serve(ServeArgs),
    /// Register a scan subject
    Add(AddArgs),
    /// Run a deep scan in the foreground
    Scan(ScanArgs),
    /// Show a subject's scan status
    Status(StatusArgs),
    /// Render the latest report as Markdown
    Report(ReportArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Options shared by every command that opens the store.
#[derive(Args, Clone, Default)]
pub struct StoreArgs {
    /// SQLite database path (overrides storage.path)
    #[arg(long)]
    pub db: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Clone)]
pub struct AddArgs {
    /// Subject URL, e.g. https://example.com
    pub url: String,

    /// Display name (defaults to the domain)
    #[arg(long)]
    pub name: Option<String>,

    /// Address alerts are sent to
    #[arg(long)]
    pub email: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Subject ID
    pub subject_id: String,

    /// Output the report summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Clone)]
pub struct StatusArgs {
    /// Subject ID (omit to list all subjects)
    pub subject_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    /// Subject ID
    pub subject_id: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
