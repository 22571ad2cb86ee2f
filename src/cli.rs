use clap::{Args, Parser, Subcommand};

use crate::api::EntityId;
use crate::controller::PageSize;
use crate::entities::ResourceKind;

#[derive(Parser)]
#[command(name = "mlm-console")]
#[command(about = "Administrative console for an MLM commerce backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by every command.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Print machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the managed collections
    Resources {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List one page of a collection
    #[command(visible_alias = "list")]
    Ls {
        /// Collection key (see `resources`)
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Rows per page, or "all" (default: from config)
        #[arg(short = 'n', long, value_parser = parse_page_size)]
        page_size: Option<PageSize>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Create a record from a JSON form
    Create {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        /// Form fields as a JSON object
        #[arg(short, long)]
        data: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Update a record from a JSON form
    Update {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        /// Record id
        id: EntityId,

        /// Complete form as a JSON object
        #[arg(short, long)]
        data: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Delete a record
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        /// Record id
        id: EntityId,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show the options available for a collection's foreign-key fields
    Options {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Manage the products and trainings bundled in a package
    Package {
        #[command(subcommand)]
        action: PackageAction,
    },

    /// Log in and store the access token
    Login {
        /// Account email
        email: String,

        /// Password (prompted on stdin if omitted)
        #[arg(long, env = "MLM_CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Forget the stored access token
    Logout {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum PackageAction {
    /// List product ids linked to a package
    Products {
        package_id: EntityId,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// List training ids linked to a package
    Trainings {
        package_id: EntityId,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Link products to a package
    AddProducts {
        package_id: EntityId,

        /// Product ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<EntityId>,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Link trainings to a package
    AddTrainings {
        package_id: EntityId,

        /// Training ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<EntityId>,

        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        #[command(flatten)]
        output: OutputOptions,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, page_size, search_debounce_ms, request_timeout_secs)
        key: String,
        /// Value to set
        value: String,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (base_url, page_size, search_debounce_ms, request_timeout_secs)
        key: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}

fn parse_resource(s: &str) -> Result<ResourceKind, String> {
    s.parse().map_err(|e: crate::error::ConsoleError| e.to_string())
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    s.parse().map_err(|e: crate::error::ConsoleError| e.to_string())
}
