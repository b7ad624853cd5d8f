//! Inspect and validate the tasks bundled in modules.
//!
//! Modules are located through `modtasks.toml` (environment directory plus
//! shared module paths). Results go to stdout; task errors are printed to
//! stderr as `{message, kind, details}` JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modtasks::error::{ErrorKind, TaskError};
use modtasks::exit_codes;
use modtasks::io::config::{CONFIG_FILE, TasksConfig, load_config};
use modtasks::io::modules::{DirectoryRegistry, ModuleRegistry};
use modtasks::logging;
use modtasks::show::show_task;
use modtasks::validate::{list_tasks, validate_module};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "modtasks",
    version,
    about = "Discover, validate, and resolve module tasks"
)]
struct Cli {
    /// Path to the lookup configuration.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the names of the tasks in a module.
    List {
        module: String,
        /// Environment to look the module up in (defaults to the configured one).
        #[arg(short, long)]
        environment: Option<String>,
    },
    /// Print a task's implementations and files as JSON.
    Show {
        /// `<module>` for the default task, or `<module>::<task>`.
        task: String,
        #[arg(short, long)]
        environment: Option<String>,
    },
    /// Resolve every task of a module and report failures.
    Validate {
        module: String,
        #[arg(short, long)]
        environment: Option<String>,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => report_error(&err),
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).context("load config")?;
    let registry: Arc<dyn ModuleRegistry> = Arc::new(DirectoryRegistry::from_config(&config));

    match cli.command {
        Command::List {
            module,
            environment,
        } => cmd_list(registry, &module, &environment_or_default(environment, &config)),
        Command::Show { task, environment } => {
            cmd_show(registry, &task, &environment_or_default(environment, &config))
        }
        Command::Validate {
            module,
            environment,
        } => cmd_validate(registry, &module, &environment_or_default(environment, &config)),
    }
}

fn environment_or_default(environment: Option<String>, config: &TasksConfig) -> String {
    environment.unwrap_or_else(|| config.default_environment.clone())
}

fn cmd_list(registry: Arc<dyn ModuleRegistry>, module: &str, environment: &str) -> Result<i32> {
    for task in list_tasks(registry, module, environment)? {
        println!("{}", task.name());
    }
    Ok(exit_codes::OK)
}

fn cmd_show(registry: Arc<dyn ModuleRegistry>, task: &str, environment: &str) -> Result<i32> {
    let report = show_task(registry, task, environment)?;
    println!("{}", to_pretty_json(&report)?);
    Ok(exit_codes::OK)
}

fn cmd_validate(registry: Arc<dyn ModuleRegistry>, module: &str, environment: &str) -> Result<i32> {
    let outcome = validate_module(registry, module, environment)?;
    for check in &outcome.checks {
        match &check.outcome {
            Ok(()) => println!("ok {}", check.name),
            Err(err) => {
                println!("invalid {} ({})", check.name, err.kind);
                eprintln!("{}", to_pretty_json(err)?);
            }
        }
    }
    if outcome.is_valid() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::INVALID)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serialize json")
}

fn report_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<TaskError>() {
        Some(task_err) => {
            match to_pretty_json(task_err) {
                Ok(payload) => eprintln!("{payload}"),
                Err(_) => eprintln!("{task_err}"),
            }
            if task_err.kind == ErrorKind::TaskNotFound {
                exit_codes::NOT_FOUND
            } else {
                exit_codes::INVALID
            }
        }
        None => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_show_with_environment() {
        let cli = Cli::parse_from(["modtasks", "show", "apache::restart", "-e", "staging"]);
        assert!(matches!(
            cli.command,
            Command::Show { ref task, environment: Some(ref env) }
                if task == "apache::restart" && env == "staging"
        ));
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["modtasks", "list", "apache", "--config", "/tmp/m.toml"]);
        assert!(matches!(
            cli.command,
            Command::List { ref module, environment: None } if module == "apache"
        ));
        assert_eq!(cli.config, PathBuf::from("/tmp/m.toml"));
    }

    #[test]
    fn task_not_found_maps_to_not_found_code() {
        let err = anyhow::Error::new(TaskError::new(ErrorKind::TaskNotFound, "gone"));
        assert_eq!(report_error(&err), exit_codes::NOT_FOUND);
        let err = anyhow::Error::new(TaskError::invalid_file("missing"));
        assert_eq!(report_error(&err), exit_codes::INVALID);
        assert_eq!(report_error(&anyhow::anyhow!("config")), exit_codes::INVALID);
    }
}
