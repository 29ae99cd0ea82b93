//! CLI binary for lineage: load repository exports and print object ancestries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lineage_core::ancestry::Lineage;
use lineage_core::config::{LineageConfig, OutputConfig, OutputFormat};
use lineage_core::graph::Graph;
use lineage_core::node::Node;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lineage", about = "Repository object ancestry explorer")]
struct Cli {
    /// Project root directory holding .lineage/config.toml (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Relationship export: `child,parent` per line
    #[arg(short, long, global = true)]
    relationships: Option<PathBuf>,

    /// Model export: `pid,content-model,state` per line
    #[arg(short, long, global = true)]
    models: Option<PathBuf>,

    /// Output format: text, json (overrides config)
    #[arg(short, long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node, edge, missing, and root counts
    Info,

    /// Print every root-to-object lineage for each pid
    Ancestry {
        /// Object pids (with or without the info:fedora/ prefix)
        #[arg(required = true)]
        pids: Vec<String>,
    },

    /// Print one object and its resolved parents
    Show {
        /// Object pid
        pid: String,
    },

    /// List objects with no declared parents
    Roots,

    /// Print lineages for every object in the graph
    All,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let mut config = LineageConfig::load(&project_root)?;
    if let Some(format) = &cli.format {
        config.output.format = format.parse()?;
    }

    let mut graph = load_graph(
        &config,
        cli.relationships.as_deref(),
        cli.models.as_deref(),
    )?;

    match cli.command {
        Commands::Info => cmd_info(&mut graph, &config.output),
        Commands::Ancestry { pids } => cmd_ancestry(&mut graph, &pids, &config.output),
        Commands::Show { pid } => cmd_show(&mut graph, &pid, &config.output),
        Commands::Roots => cmd_roots(&graph, &config.output),
        Commands::All => cmd_all(&mut graph, &config.output),
    }
}

/// Load relationships first, then models.
fn load_graph(
    config: &LineageConfig,
    relationships: Option<&Path>,
    models: Option<&Path>,
) -> Result<Graph> {
    if relationships.is_none() && models.is_none() {
        anyhow::bail!("No input given. Pass --relationships and/or --models.");
    }

    let mut graph = config.new_graph();
    if let Some(path) = relationships {
        let accepted = graph
            .load_relationships_file(path)
            .with_context(|| format!("failed to load relationships from {}", path.display()))?;
        tracing::info!(accepted, path = %path.display(), "relationships loaded");
    }
    if let Some(path) = models {
        let accepted = graph
            .load_models_file(path)
            .with_context(|| format!("failed to load models from {}", path.display()))?;
        tracing::info!(accepted, path = %path.display(), "models loaded");
    }
    Ok(graph)
}

fn cmd_info(graph: &mut Graph, output: &OutputConfig) -> Result<()> {
    graph.materialize_parents();
    let stats = graph.stats();
    match output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Nodes: {}", stats.nodes);
            println!("Edges: {}", stats.edges);
            println!("Missing: {}", stats.missing);
            println!("Roots: {}", stats.roots);
        }
    }
    Ok(())
}

fn cmd_ancestry(graph: &mut Graph, pids: &[String], output: &OutputConfig) -> Result<()> {
    let mut results = Vec::with_capacity(pids.len());
    for raw in pids {
        let pid = lineage_core::load::clean_pid(raw);
        let Some(lineages) = graph.ancestries_of(pid) else {
            anyhow::bail!("Object not found: {}", pid);
        };
        results.push((pid.to_string(), lineages));
    }

    match output.format {
        OutputFormat::Json => {
            let json: serde_json::Map<String, serde_json::Value> = results
                .into_iter()
                .map(|(pid, lineages)| -> Result<(String, serde_json::Value)> {
                    Ok((pid, serde_json::to_value(lineages)?))
                })
                .collect::<Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            for (pid, lineages) in &results {
                println!("{} ({} lineage(s))", pid, lineages.len());
                for lineage in lineages {
                    println!("  {}", render_lineage(lineage, output.show_content_models));
                }
            }
        }
    }
    Ok(())
}

fn cmd_show(graph: &mut Graph, pid: &str, output: &OutputConfig) -> Result<()> {
    let pid = lineage_core::load::clean_pid(pid);
    let node = graph
        .lookup(pid)
        .cloned()
        .with_context(|| format!("Object not found: {}", pid))?;
    let parents = graph.parents_of(&node);

    match output.format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "node": node, "parents": parents });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("{}", node);
            for parent in &parents {
                println!("  parent: {}", parent);
            }
        }
    }
    Ok(())
}

fn cmd_roots(graph: &Graph, output: &OutputConfig) -> Result<()> {
    let roots = graph.roots();
    match output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&roots)?),
        OutputFormat::Text => {
            for pid in roots {
                println!("{}", pid);
            }
        }
    }
    Ok(())
}

fn cmd_all(graph: &mut Graph, output: &OutputConfig) -> Result<()> {
    // Snapshot first: the walk adds missing parents to the graph.
    let mut targets: Vec<Node> = Vec::with_capacity(graph.node_count());
    graph.for_each(|node| targets.push(node.clone()));

    let mut lines = Vec::new();
    for node in &targets {
        lines.extend(graph.ancestries(node));
    }

    match output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lines)?),
        OutputFormat::Text => {
            for lineage in &lines {
                println!("{}", render_lineage(lineage, output.show_content_models));
            }
        }
    }
    eprintln!(
        "{} lineage(s) across {} object(s)",
        lines.len(),
        targets.len()
    );
    Ok(())
}

fn render_lineage(lineage: &Lineage, show_content_models: bool) -> String {
    if !show_content_models {
        return lineage.to_string();
    }
    lineage
        .nodes()
        .iter()
        .map(|node| match &node.state {
            Some(state) if state.is_synthetic() => format!("{} [{}]", node.pid, state),
            _ if node.content_models.is_empty() => node.pid.clone(),
            _ => format!("{} ({})", node.pid, node.content_models.join(", ")),
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_render_with_content_models() {
        let mut graph = Graph::new();
        graph.load_relationships(Cursor::new("page:1,book:1\n")).unwrap();
        graph
            .load_models(Cursor::new(
                "info:fedora/page:1,info:fedora/islandora:pageCModel,info:fedora/fedora-system:def/model#Active\n",
            ))
            .unwrap();
        let lineages = graph.ancestries_of("page:1").unwrap();

        assert_eq!(
            render_lineage(&lineages[0], true),
            "book:1 [missing] -> page:1 (pageCModel)"
        );
        assert_eq!(
            render_lineage(&lineages[0], false),
            "book:1 [missing] -> page:1"
        );
    }

    #[test]
    fn test_load_graph_requires_input() {
        let config = LineageConfig::default();
        assert!(load_graph(&config, None, None).is_err());
    }

    #[test]
    fn test_load_graph_reports_unreadable_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = LineageConfig::default();
        let missing = tmp.path().join("missing.csv");
        let err = load_graph(&config, Some(&missing), None).unwrap_err();
        assert!(err.to_string().contains("failed to load relationships"));
    }
}
