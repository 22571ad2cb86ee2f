use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mlm_console::cli::{Cli, Commands, ConfigAction, PackageAction};
use mlm_console::commands::{
    ListOptions, cmd_config_get, cmd_config_set, cmd_config_show, cmd_create, cmd_delete,
    cmd_login, cmd_logout, cmd_ls, cmd_options, cmd_package_add_products,
    cmd_package_add_trainings, cmd_package_products, cmd_package_trainings, cmd_resources,
    cmd_update,
};
use mlm_console::display::format_field_errors;
use mlm_console::error::ConsoleError;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resources { output } => cmd_resources(output),

        Commands::Ls {
            resource,
            page,
            page_size,
            search,
            output,
        } => {
            cmd_ls(
                resource,
                ListOptions {
                    page,
                    page_size,
                    search,
                },
                output,
            )
            .await
        }
        Commands::Create {
            resource,
            data,
            output,
        } => cmd_create(resource, &data, output).await,
        Commands::Update {
            resource,
            id,
            data,
            output,
        } => cmd_update(resource, id, &data, output).await,
        Commands::Delete {
            resource,
            id,
            output,
        } => cmd_delete(resource, id, output).await,
        Commands::Options { resource, output } => cmd_options(resource, output).await,

        Commands::Package { action } => match action {
            PackageAction::Products { package_id, output } => {
                cmd_package_products(package_id, output).await
            }
            PackageAction::Trainings { package_id, output } => {
                cmd_package_trainings(package_id, output).await
            }
            PackageAction::AddProducts {
                package_id,
                ids,
                output,
            } => cmd_package_add_products(package_id, &ids, output).await,
            PackageAction::AddTrainings {
                package_id,
                ids,
                output,
            } => cmd_package_add_trainings(package_id, &ids, output).await,
        },

        Commands::Login {
            email,
            password,
            output,
        } => cmd_login(&email, password, output).await,
        Commands::Logout { output } => cmd_logout(output),

        Commands::Config { action } => match action {
            ConfigAction::Show { output } => cmd_config_show(output),
            ConfigAction::Set { key, value, output } => cmd_config_set(&key, &value, output),
            ConfigAction::Get { key, output } => cmd_config_get(&key, output),
        },
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(ConsoleError::Validation(errors)) => {
            eprintln!("{}", "Validation failed:".red());
            eprintln!("{}", format_field_errors(&errors));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
