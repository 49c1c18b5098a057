use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use asset_register::cli::auth::prompt_password;
use asset_register::cli::{
    self, handle_audit_command, handle_batch_command, handle_item_command, handle_login,
    handle_logout, handle_record_command, handle_stamps_command, handle_whoami, RegisterApp,
};
use asset_register::config::{RegisterPaths, Settings};
use asset_register::logging::init_logging;
use asset_register::models::resources::USERS;
use asset_register::storage::{seed_defaults, ListQuery, Store};

#[derive(Parser)]
#[command(
    name = "register",
    version,
    about = "Asset register with automatic batch and item numbering",
    long_about = "Keeps a register of received media batches and the items in them. \
                  Batch numbers (V01/2025) and item numbers (V01/2025/04) are assigned \
                  automatically, and every change made while logged in is written to \
                  an audit trail."
)]
struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the register with an admin user and reference data
    Init {
        /// Password for the initial admin user
        #[arg(long, env = "ASSET_REGISTER_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },

    /// Log in; later commands are audited as this user
    Login {
        name: String,
        #[arg(long, env = "ASSET_REGISTER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Batch management commands
    #[command(subcommand)]
    Batch(cli::BatchCommands),

    /// Item management commands
    #[command(subcommand)]
    Item(cli::ItemCommands),

    /// Generic commands for any resource
    #[command(subcommand)]
    Record(cli::RecordCommands),

    /// Audit trail commands
    #[command(subcommand)]
    Audit(cli::AuditCommands),

    /// Inspect or retry codes that could not be written
    #[command(subcommand)]
    Stamps(cli::StampsCommands),

    /// Show or change configuration
    Config {
        /// Enable or disable the audit trail
        #[arg(long)]
        audit: Option<bool>,
        /// Delete a batch's items together with the batch
        #[arg(long)]
        cascade_item_deletes: Option<bool>,
        /// Timeout for stamping writes, in milliseconds
        #[arg(long)]
        stamp_timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = RegisterPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    init_logging(cli.log_level.as_deref().unwrap_or(&settings.log_level));
    debug!(base_dir = %paths.base_dir().display(), "Starting register");

    let Some(command) = cli.command else {
        println!("register - asset register");
        println!();
        println!("Run 'register --help' for usage information.");
        println!("Run 'register init' to set up a new register.");
        return Ok(());
    };

    let mut app = RegisterApp::open(paths, settings)?;

    match command {
        Commands::Init { admin_password } => {
            println!("Initializing register at: {}", app.paths.base_dir().display());

            let raw = app.raw();
            let has_users = raw.list(USERS, &ListQuery::all().paginate(1, 1)).await?.total > 0;
            let password = match (has_users, admin_password) {
                (true, _) => String::new(),
                (false, Some(password)) => password,
                (false, None) => prompt_password("Password for the admin user: ")?,
            };

            let written = seed_defaults(raw.as_ref(), &password).await?;
            app.settings.save(&app.paths)?;

            println!("Initialization complete! ({} record(s) created)", written);
            if !has_users {
                println!();
                println!("Run 'register login admin' to start an audited session.");
            }
        }
        Commands::Login { name, password } => handle_login(&app, &name, password).await?,
        Commands::Logout => handle_logout(&app).await?,
        Commands::Whoami => handle_whoami(&app)?,
        Commands::Batch(cmd) => handle_batch_command(&app, cmd).await?,
        Commands::Item(cmd) => handle_item_command(&app, cmd).await?,
        Commands::Record(cmd) => handle_record_command(&app, cmd).await?,
        Commands::Audit(cmd) => handle_audit_command(&app, cmd).await?,
        Commands::Stamps(cmd) => handle_stamps_command(&app, cmd).await?,
        Commands::Config {
            audit,
            cascade_item_deletes,
            stamp_timeout_ms,
        } => handle_config(&mut app, audit, cascade_item_deletes, stamp_timeout_ms)?,
    }

    Ok(())
}

fn handle_config(
    app: &mut RegisterApp,
    audit: Option<bool>,
    cascade_item_deletes: Option<bool>,
    stamp_timeout_ms: Option<u64>,
) -> Result<()> {
    let settings = &mut app.settings;
    let changed = audit.is_some() || cascade_item_deletes.is_some() || stamp_timeout_ms.is_some();
    if let Some(audit) = audit {
        settings.audit_enabled = audit;
    }
    if let Some(cascade) = cascade_item_deletes {
        settings.cascade_item_deletes = cascade;
    }
    if let Some(timeout) = stamp_timeout_ms {
        settings.stamp_timeout_ms = timeout;
    }
    if changed {
        settings.save(&app.paths)?;
        println!("Configuration saved.");
        println!();
    }

    println!("Asset Register Configuration");
    println!("============================");
    println!("Base directory:   {}", app.paths.base_dir().display());
    println!("Data directory:   {}", app.paths.data_dir().display());
    println!("Initialized:      {}", app.paths.is_initialized());
    println!();
    println!("Settings:");
    println!("  Log level:            {}", settings.log_level);
    println!("  Audit enabled:        {}", settings.audit_enabled);
    println!("  Cascade item deletes: {}", settings.cascade_item_deletes);
    println!("  Stamp timeout:        {} ms", settings.stamp_timeout_ms);
    println!("  Page size:            {}", settings.default_page_size);
    Ok(())
}
