//! Hybrid Navigation Engine CLI
//!
//! Offline tooling around the engine: validate a route configuration, resolve
//! paths against it, replay navigation scripts, and watch a configuration
//! file for hot reloads.
//!
//! # Script Format
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! push <url> [json-state]
//! replace <url> [json-state]
//! back
//! forward
//! go <delta>
//! ready <path> [json-detail]
//! host-pop <count>
//! premount <path>
//! ```

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use hybrid_nav::config::watcher::ConfigWatcher;
use hybrid_nav::config::{load_config, NavConfig};
use hybrid_nav::navigation::{NavigationCoordinator, NavigationOutcome};
use hybrid_nav::observability::logging::init_logging;
use hybrid_nav::routing::{RouteNode, RouteTable, RouteTree};

#[derive(Parser)]
#[command(name = "hybrid-nav")]
#[command(about = "Route matching and hybrid history tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and print its route tree
    Check { config: PathBuf },
    /// Print the match chain for a path as JSON
    Resolve { config: PathBuf, path: String },
    /// Replay a navigation script and print emitted events
    Simulate {
        config: PathBuf,
        script: PathBuf,
        /// Run against a host-backed history handle
        #[arg(long)]
        host: bool,
    },
    /// Watch a configuration file and swap route trees on change
    Watch { config: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => {
            let config = load(&config)?;
            let tree = RouteTree::from_config(&config.routes)?;
            for root in tree.roots() {
                print_node(root, 0);
            }
            println!("ok: {} top-level routes", tree.roots().len());
        }
        Commands::Resolve { config, path } => {
            let config = load(&config)?;
            let tree = RouteTree::from_config(&config.routes)?;
            let matches = tree.resolve(&path);
            if matches.is_empty() {
                tracing::warn!(path = %path, "No route matched");
            }
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Commands::Simulate {
            config,
            script,
            host,
        } => {
            let config = load(&config)?;
            let script = fs::read_to_string(&script)?;
            simulate(&config, &script, host)?;
        }
        Commands::Watch { config: path } => {
            let config = load(&path)?;
            watch(&path, &config).await?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<NavConfig, Box<dyn Error>> {
    let config = load_config(path)?;
    init_logging(&config.observability);
    tracing::debug!(path = ?path, routes = config.routes.len(), "Configuration loaded");
    Ok(config)
}

fn print_node(node: &RouteNode, depth: usize) {
    let mut line = format!("{}{} -> {}", "  ".repeat(depth), node.path(), node.element());
    if let Some(title) = node.title() {
        line.push_str(&format!(" \"{title}\""));
    }
    if node.prerender() {
        line.push_str(" [prerender]");
    }
    println!("{line}");
    for child in node.children() {
        print_node(child, depth + 1);
    }
}

/// One line of a navigation script.
#[derive(Debug, Clone, PartialEq)]
enum ScriptCommand {
    Push { url: String, state: Value },
    Replace { url: String, state: Value },
    Back,
    Forward,
    Go(isize),
    Ready { path: String, detail: Option<Value> },
    HostPop(usize),
    Premount(String),
}

fn parse_command(line: &str) -> Result<ScriptCommand, String> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let arg = parts.next();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let json_arg = |raw: Option<&str>| -> Result<Option<Value>, String> {
        raw.map(|s| serde_json::from_str(s).map_err(|e| format!("bad JSON `{s}`: {e}")))
            .transpose()
    };
    let required = |name: &str| arg.ok_or_else(|| format!("`{verb}` needs {name}"));

    match verb {
        "push" => Ok(ScriptCommand::Push {
            url: required("a url")?.to_string(),
            state: json_arg(rest)?.unwrap_or(Value::Null),
        }),
        "replace" => Ok(ScriptCommand::Replace {
            url: required("a url")?.to_string(),
            state: json_arg(rest)?.unwrap_or(Value::Null),
        }),
        "back" => Ok(ScriptCommand::Back),
        "forward" => Ok(ScriptCommand::Forward),
        "go" => required("a delta")?
            .parse()
            .map(ScriptCommand::Go)
            .map_err(|e| format!("bad delta: {e}")),
        "ready" => Ok(ScriptCommand::Ready {
            path: required("a path")?.to_string(),
            detail: json_arg(rest)?,
        }),
        "host-pop" => required("a count")?
            .parse()
            .map(ScriptCommand::HostPop)
            .map_err(|e| format!("bad count: {e}")),
        "premount" => Ok(ScriptCommand::Premount(required("a path")?.to_string())),
        other => Err(format!("unknown command `{other}`")),
    }
}

fn parse_script(script: &str) -> Result<Vec<ScriptCommand>, String> {
    script
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| parse_command(line).map_err(|e| format!("line {n}: {e}")))
        .collect()
}

fn simulate(config: &NavConfig, script: &str, host: bool) -> Result<(), Box<dyn Error>> {
    let commands = parse_script(script)?;

    let handle = host.then(|| {
        json!({
            "path": config.history.initial_path,
            "state": null,
            "buildContextStack": [],
        })
    });
    let mut nav = NavigationCoordinator::from_config(config, handle.as_ref())?;

    nav.add_popstate_listener(|event| {
        println!("  popstate {}", serde_json::to_string(event).unwrap_or_default());
    });
    nav.add_route_change_listener(|event| {
        println!("  route-change {}", serde_json::to_string(event).unwrap_or_default());
    });

    for command in commands {
        println!("> {command:?}");
        let outcome = match command {
            ScriptCommand::Push { url, state } => nav.push_state(state, "", Some(&url))?,
            ScriptCommand::Replace { url, state } => nav.replace_state(state, "", Some(&url))?,
            ScriptCommand::Back => nav.back(),
            ScriptCommand::Forward => nav.forward(),
            ScriptCommand::Go(delta) => nav.go(delta),
            ScriptCommand::Ready { path, detail } => match nav.dispatch_prerendering(&path, detail) {
                Some(id) => NavigationOutcome::Committed(id),
                None => NavigationOutcome::Ignored,
            },
            ScriptCommand::HostPop(count) => host_pop(&mut nav, count),
            ScriptCommand::Premount(path) => {
                let mounted = nav.ensure_mounted(&path).is_some();
                println!("  premount {path} mounted={mounted}");
                continue;
            }
        };

        println!(
            "  {:?} location={} committed={} phase={:?}",
            outcome,
            nav.location().pathname,
            nav.context().path,
            nav.phase()
        );
    }

    Ok(())
}

/// Pop entries on the host side, then let the engine notice.
fn host_pop(nav: &mut NavigationCoordinator, count: usize) -> NavigationOutcome {
    let Some(handle) = nav.history().host_handle() else {
        tracing::warn!("host-pop needs --host");
        return NavigationOutcome::Ignored;
    };
    {
        let mut handle = handle.borrow_mut();
        let keep = handle.build_context_stack.len().saturating_sub(count).max(1);
        handle.build_context_stack.truncate(keep);
    }
    nav.sync_from_host().unwrap_or(NavigationOutcome::Ignored)
}

async fn watch(path: &Path, config: &NavConfig) -> Result<(), Box<dyn Error>> {
    let table = Arc::new(RouteTable::new(RouteTree::from_config(&config.routes)?));
    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(tree) = updates.recv() => {
                table.swap(tree);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
