use anyhow::Result;
use clap::{CommandFactory, Parser};
use color_eyre::config::HookBuilder;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

mod handlers;
mod wizard;

/// cloudfiles - manage Cloud Files object storage from your terminal
#[derive(Parser, Debug)]
#[command(name = "cloudfiles")]
#[command(version)]
#[command(about = "Manage Cloud Files containers, objects and CDN from your terminal", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (table, json); defaults to the configured format
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Initial setup (interactive wizard)
    Init,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Account totals
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Container management
    Containers {
        #[command(subcommand)]
        action: ContainerAction,
    },

    /// Object (storage item) management
    Objects {
        #[command(subcommand)]
        action: ObjectAction,
    },

    /// CDN publishing
    Cdn {
        #[command(subcommand)]
        action: CdnAction,
    },

    /// Shell completion
    Completion {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: String,
    },

    /// Diagnostics
    Doctor {
        #[command(subcommand)]
        action: DoctorAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Edit the configuration in $EDITOR
    Edit,
    /// Validate the configuration file
    Validate,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum AccountAction {
    /// Container count and bytes used
    Info,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ContainerAction {
    /// List containers
    List {
        /// Include object count and size
        #[arg(short, long)]
        detailed: bool,
        /// Only names starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,
        /// Start after this name
        #[arg(long)]
        marker: Option<String>,
    },
    /// Create a container
    Create { name: String },
    /// Delete an empty container
    Delete { name: String },
    /// Object count and bytes used
    Info { name: String },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ObjectAction {
    /// List objects
    Ls {
        /// Only names starting with this prefix
        prefix: Option<String>,
        /// Container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
        /// Include size, type and modification date
        #[arg(short, long)]
        detailed: bool,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,
        /// Start after this name
        #[arg(long)]
        marker: Option<String>,
    },
    /// Upload a file
    Upload {
        /// Local file to upload
        file: String,
        /// Object name (defaults to the file name)
        object: Option<String>,
        /// Container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
        /// Metadata as key=value, repeatable
        #[arg(short, long = "meta")]
        meta: Vec<String>,
        /// Override the content type resolved from the file extension
        #[arg(long)]
        content_type: Option<String>,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Download an object
    Download {
        /// Object name
        object: String,
        /// Local destination (defaults to the object name)
        dest: Option<String>,
        /// Container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
        /// Byte range, e.g. bytes=0-1023
        #[arg(long)]
        range: Option<String>,
    },
    /// Delete an object
    Delete {
        /// Object name
        object: String,
        /// Container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
    },
    /// Object headers and metadata
    Info {
        /// Object name
        object: String,
        /// Container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
    },
    /// Replace an object's metadata
    SetMeta {
        /// Object name
        object: String,
        /// Metadata as key=value, repeatable
        #[arg(short, long = "meta", required = true)]
        meta: Vec<String>,
        /// Container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
    },
    /// Server-side copy
    Copy {
        /// Source object name
        source: String,
        /// Destination object name
        destination: String,
        /// Source container (uses the default container)
        #[arg(short, long)]
        container: Option<String>,
        /// Destination container (defaults to the source container)
        #[arg(long)]
        to_container: Option<String>,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum CdnAction {
    /// List CDN-enabled containers
    List {
        /// Skip containers that were disabled
        #[arg(long)]
        enabled_only: bool,
    },
    /// Publish a container on the CDN
    Enable {
        name: String,
        /// Edge cache TTL in seconds (uses the configured TTL)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Stop publishing a container
    Disable { name: String },
    /// CDN state of a container
    Info { name: String },
    /// Update CDN settings
    Set {
        name: String,
        /// Edge cache TTL in seconds
        #[arg(long)]
        ttl: Option<u64>,
        /// Keep CDN access logs
        #[arg(long)]
        log_retention: Option<bool>,
        /// Enable or disable publishing
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum DoctorAction {
    /// Check the installation
    Check,
    /// Authenticate and reach the storage service
    TestConnection,
}

/// Install the tracing subscriber: RUST_LOG wins, then --verbose, then the config file
fn init_tracing(verbose: u8) {
    let config = cloudfiles_core::load_config().ok();
    let logging = config.as_ref().map(|config| config.logging()).unwrap_or_default();
    let ansi = match &config {
        Some(config) => handlers::color_enabled(config),
        None => std::io::stderr().is_terminal(),
    };

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("cloudfiles_core={0},cloudfiles={0}", logging.level))),
        1 => EnvFilter::new("cloudfiles_core=debug,cloudfiles=debug"),
        _ => EnvFilter::new("cloudfiles_core=trace,cloudfiles=trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output.as_deref();
    match cli.command {
        Commands::Init => handlers::handle_init().await,
        Commands::Config { action } => handlers::handle_config(action).await,
        Commands::Account { action } => handlers::handle_account(action, output).await,
        Commands::Containers { action } => handlers::handle_containers(action, output).await,
        Commands::Objects { action } => handlers::handle_objects(action, output).await,
        Commands::Cdn { action } => handlers::handle_cdn(action, output).await,
        Commands::Completion { shell } => handlers::handle_completion(&shell, &mut Cli::command()).await,
        Commands::Doctor { action } => handlers::handle_doctor(action).await,
    }
}
