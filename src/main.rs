use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kong::config::{KongConfig, SchemaBackend};

mod cmd;

#[derive(Parser)]
#[command(name = "kong")]
#[command(version, about = "Write-side column filtering for Kong entities")]
pub struct Cli {
    /// Path to kong.toml (defaults to $KONG_CONFIG, ./kong.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the runtime schema backend: none, sqlite, rest
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter a JSON payload down to an entity's writable columns
    Pick {
        /// Entity name (asset, shot, published_file, ...)
        #[arg(short, long)]
        entity: String,

        /// Extra columns to deny (comma-separated)
        #[arg(long, value_delimiter = ',')]
        deny: Vec<String>,

        /// JSON object file (stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Skip the runtime schema lookup
        #[arg(long)]
        static_only: bool,
    },
    /// Filter a payload with the call-site deny profile for an insert or update
    Prepare {
        #[arg(short, long)]
        entity: String,

        /// insert or update
        #[arg(short, long, default_value = "insert")]
        kind: String,

        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Row id; when set, the write is recorded in the local activity log
        #[arg(long)]
        id: Option<i64>,

        #[arg(long)]
        project: Option<i64>,

        #[arg(long)]
        actor: Option<String>,

        /// JSON object with the row before an update
        #[arg(long)]
        old: Option<PathBuf>,
    },
    /// List entities, or show one entity's fields
    Schema {
        entity: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage custom fields in the local store
    Fields {
        #[command(subcommand)]
        command: FieldsCommands,
    },
    /// Build or list activity events
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum FieldsCommands {
    /// Create the custom-field table and runtime view
    Provision,
    /// Register (or re-activate) a custom field
    Add {
        #[arg(short, long)]
        entity: String,
        /// Column name
        column: String,
        /// Register the field as inactive
        #[arg(long)]
        inactive: bool,
    },
    /// List custom fields
    List {
        #[arg(short, long)]
        entity: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ActivityCommands {
    /// Print the events an update would produce
    Diff {
        #[arg(short, long)]
        entity: String,
        #[arg(long)]
        id: i64,
        /// JSON object with the row before the update
        #[arg(long)]
        old: PathBuf,
        /// JSON object with the written columns
        #[arg(long)]
        new: PathBuf,
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        actor: Option<String>,
        /// Also store the events in the local activity log
        #[arg(long)]
        record: bool,
    },
    /// List recent events from the local activity log
    List {
        #[arg(short, long)]
        entity: Option<String>,
        #[arg(long)]
        id: Option<i64>,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default kong.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let backend = cli
        .backend
        .as_deref()
        .map(str::parse::<SchemaBackend>)
        .transpose()?;
    let config = KongConfig::discover(cli.config.as_deref())?.with_cli_backend(backend);

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.toml.log_level()
    };
    kong::logging::init(&level, config.toml.logging.format);

    match &cli.command {
        Commands::Pick {
            entity,
            deny,
            input,
            static_only,
        } => cmd::cmd_pick(&config, entity, deny, input.as_deref(), *static_only).await?,
        Commands::Prepare {
            entity,
            kind,
            input,
            id,
            project,
            actor,
            old,
        } => {
            let record = id.map(|id| cmd::pick::RecordArgs {
                id,
                project: *project,
                actor: actor.clone(),
                old: old.clone(),
            });
            cmd::cmd_prepare(&config, entity, kind, input.as_deref(), record).await?
        }
        Commands::Schema { entity, json } => cmd::cmd_schema(entity.as_deref(), *json)?,
        Commands::Fields { command } => cmd::cmd_fields(&config, command.clone()).await?,
        Commands::Activity { command } => cmd::cmd_activity(&config, command.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
