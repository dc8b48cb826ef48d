//! Flowsmith CLI Entry Point
//!
//! Opens a workflow template, applies step configurations and reports the
//! resulting step order and save readiness.
//!
//! # Usage
//!
//! ```bash
//! # List the built-in templates
//! flowsmith --list-templates
//!
//! # Open a built-in template and show what still needs configuring
//! flowsmith --template tpl_form_sheets
//!
//! # Configure steps and print the save snapshot
//! flowsmith --template tpl_form_sheets --connections accounts.yaml \
//!     --configs steps.yaml --snapshot json
//!
//! # Use templates from a file
//! flowsmith my_templates.yaml --template tpl_custom
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info, warn};

use flowsmith::workflow::{
    find_template, instantiate, load_templates, Connection, NodeConfig, Template, WorkflowGraph,
    BUILTIN_TEMPLATES,
};
use flowsmith::{APP_NAME, VERSION};

/// Output format of the save snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SnapshotFormat {
    Json,
    Yaml,
}

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    templates_path: Option<String>,
    template_id: Option<String>,
    connections_path: Option<String>,
    configs_path: Option<String>,
    snapshot: Option<SnapshotFormat>,
    list_templates: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Workflow Graph Consistency Engine");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: flowsmith [OPTIONS] [TEMPLATES_FILE]");
    println!();
    println!("Arguments:");
    println!("  [TEMPLATES_FILE]      YAML list of templates (default: built-in gallery)");
    println!();
    println!("Options:");
    println!("  --template ID         Template to open (default: first in the list)");
    println!("  --list-templates      List available templates and exit");
    println!("  --connections FILE    YAML list of linked accounts");
    println!("  --configs FILE        YAML map of step number -> configuration");
    println!("  --snapshot FORMAT     Print the save snapshot (json or yaml)");
    println!("  --verbose             Enable debug logging");
    println!("  --help                Show this help message");
    println!("  --version             Show version information");
    println!();
    println!("Examples:");
    println!("  flowsmith --list-templates");
    println!("  flowsmith --template tpl_email_ai");
    println!("  flowsmith --template tpl_email_ai --configs steps.yaml --snapshot json");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    let value_of = |i: usize, flag: &str| -> Result<String, String> {
        args.get(i)
            .cloned()
            .ok_or_else(|| format!("{} requires an argument", flag))
    };

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => config.verbose = true,
            "--list-templates" => config.list_templates = true,
            "--template" => {
                i += 1;
                config.template_id = Some(value_of(i, "--template")?);
            }
            "--connections" => {
                i += 1;
                config.connections_path = Some(value_of(i, "--connections")?);
            }
            "--configs" => {
                i += 1;
                config.configs_path = Some(value_of(i, "--configs")?);
            }
            "--snapshot" => {
                i += 1;
                config.snapshot = Some(match value_of(i, "--snapshot")?.as_str() {
                    "json" => SnapshotFormat::Json,
                    "yaml" => SnapshotFormat::Yaml,
                    other => return Err(format!("Unknown snapshot format: {}", other)),
                });
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.templates_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.templates_path = Some(arg.clone());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Loads the template list from a file, or the built-in gallery.
fn available_templates(path: Option<&str>) -> Result<Vec<Template>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_templates(path)?),
        None => Ok(BUILTIN_TEMPLATES.to_vec()),
    }
}

fn select_template(
    templates: &[Template],
    id: Option<&str>,
) -> Result<Template, Box<dyn std::error::Error>> {
    match id {
        Some(id) => match templates.iter().find(|t| t.id == id) {
            Some(template) => Ok(template.clone()),
            None => Ok(find_template(id)?.clone()),
        },
        None => templates
            .first()
            .cloned()
            .ok_or_else(|| "No templates available".into()),
    }
}

fn load_connections(path: &str) -> Result<Vec<Connection>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read connections file '{}': {}", path, e))?;
    let connections: Vec<Connection> = serde_yaml::from_str(&content)?;
    info!("Loaded {} linked account(s)", connections.len());
    Ok(connections)
}

fn load_step_configs(path: &str) -> Result<BTreeMap<usize, NodeConfig>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read configs file '{}': {}", path, e))?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Applies configs by step number; rejected payloads are reported, not fatal.
fn apply_configs(graph: &mut WorkflowGraph, configs: BTreeMap<usize, NodeConfig>) {
    for (step, config) in configs {
        let Some(id) = graph.node_by_step(step).map(|n| n.id.clone()) else {
            warn!("No step {} in this workflow, config ignored", step);
            continue;
        };
        if let Err(e) = graph.set_config(&id, config) {
            error!("Step {}: {}", step, e);
        }
    }
}

fn print_templates(templates: &[Template]) {
    for template in templates {
        println!("  {:<24} {}", template.id.bold(), template.name);
        println!("  {:<24} {}", "", template.steps.join(" -> ").dimmed());
    }
}

fn print_steps(graph: &WorkflowGraph) {
    println!("{:>4}  {:<24} {:<20} {}", "Step", "Label", "Kind", "Status");
    for node in graph.nodes() {
        let status = if node.is_configured() {
            "configured".green()
        } else {
            "needs configuration".red()
        };
        println!(
            "{:>4}  {:<24} {:<20} {}",
            node.step_number,
            node.label,
            node.kind.slug(),
            status
        );
    }
    println!();
}

/// Main application entry point.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);
    print_banner();

    let templates = available_templates(config.templates_path.as_deref())?;
    if config.list_templates {
        print_templates(&templates);
        return Ok(true);
    }

    let template = select_template(&templates, config.template_id.as_deref())?;
    info!("Opening template: {}", template.name);
    let mut graph = instantiate(&template)?;

    if let Some(path) = &config.connections_path {
        graph.set_connections(load_connections(path)?);
    }

    if let Some(path) = &config.configs_path {
        apply_configs(&mut graph, load_step_configs(path)?);
    }

    print_steps(&graph);

    let Some(format) = config.snapshot else {
        let check = graph.check_saveable();
        if check.is_saveable() {
            println!("{}", "Workflow is ready to save".green());
        } else {
            println!("{} step(s) still need configuration", check.unconfigured.len());
        }
        return Ok(true);
    };

    match graph.prepare_save() {
        Ok(snapshot) => {
            let output = match format {
                SnapshotFormat::Json => snapshot.to_json()?,
                SnapshotFormat::Yaml => snapshot.to_yaml()?,
            };
            println!("{}", output);
            Ok(true)
        }
        Err(e) => {
            error!("{}", e);
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("flowsmith")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse_arguments(&args(&[])).unwrap();
        assert!(config.templates_path.is_none());
        assert!(config.snapshot.is_none());
        assert!(!config.list_templates);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_arguments(&args(&[
            "extra.yaml",
            "--template",
            "tpl_custom",
            "--snapshot",
            "yaml",
            "--verbose",
        ]))
        .unwrap();

        assert_eq!(config.templates_path.as_deref(), Some("extra.yaml"));
        assert_eq!(config.template_id.as_deref(), Some("tpl_custom"));
        assert_eq!(config.snapshot, Some(SnapshotFormat::Yaml));
        assert!(config.verbose);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_arguments(&args(&["--template"])).is_err());
        assert!(parse_arguments(&args(&["--snapshot", "xml"])).is_err());
        assert!(parse_arguments(&args(&["--bogus"])).is_err());
        assert!(parse_arguments(&args(&["a.yaml", "b.yaml"])).is_err());
    }

    #[test]
    fn test_select_template_falls_back_to_builtin() {
        let template = select_template(&[], Some("tpl_email_ai")).unwrap();
        assert_eq!(template.steps, vec!["Gmail", "AI Generate", "Discord"]);
        assert!(select_template(&[], None).is_err());
    }

    #[test]
    fn test_apply_configs_by_step_number() {
        let mut graph = instantiate(find_template("tpl_webhook_validate").unwrap()).unwrap();
        let mut configs = BTreeMap::new();
        configs.insert(3, NodeConfig::new().with("url", "https://api.example.com"));
        configs.insert(4, NodeConfig::new().with("message", "done"));
        configs.insert(9, NodeConfig::new());

        apply_configs(&mut graph, configs);

        assert!(graph.is_saveable());
    }
}
