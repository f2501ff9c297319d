use clap::Parser;
use flowlens::prelude::*;
use std::fs;
use std::path::PathBuf;

// --- Project Crawler (CLI-Specific) ---
// The library consumes an already-crawled ProjectNode tree; this minimal
// walker plays that collaborator role for command-line use.

fn crawl(root: &Path) -> std::io::Result<ProjectNode> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    crawl_entry(root, name, String::new())
}

fn crawl_entry(path: &Path, name: String, relative: String) -> std::io::Result<ProjectNode> {
    if path.is_dir() {
        let mut node = ProjectNode::directory(name, path, relative.clone());
        let mut entries: Vec<_> = fs::read_dir(path)?.filter_map(|entry| entry.ok()).collect();
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let child_name = entry.file_name().to_string_lossy().into_owned();
            let child_relative = if relative.is_empty() {
                child_name.clone()
            } else {
                format!("{relative}/{child_name}")
            };
            node = node.with_child(crawl_entry(&entry.path(), child_name, child_relative)?);
        }
        Ok(node)
    } else {
        Ok(ProjectNode::file(name, path, relative))
    }
}

/// Analyze an integration project and render its flows as PlantUML text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the integration project root
    project_path: PathBuf,

    /// Maximum nesting depth to render (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Label components with their full qualified type names
    #[arg(long)]
    full_names: bool,

    /// Render only components carrying integration content
    #[arg(long)]
    integration_only: bool,

    /// Render a single flow by name instead of every flow
    #[arg(long)]
    flow: Option<String>,

    /// Write one .puml file per flow into this directory instead of stdout
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = crawl(&cli.project_path)?;
    let analysis = Analyzer::new().analyze(root)?;
    for warning in &analysis.warnings {
        eprintln!("warning: {warning}");
    }

    let index = analysis.flow_index();
    let options = RenderOptions {
        full_names: cli.full_names,
        integration_only: cli.integration_only,
    };
    let synthesizer = DiagramSynthesizer::new();

    let flows: Vec<&Flow> = match &cli.flow {
        Some(name) => {
            let flow = index
                .get(name.as_str())
                .copied()
                .ok_or_else(|| format!("flow '{name}' not found in project"))?;
            vec![flow]
        }
        None => analysis.flows(),
    };

    if let Some(out_dir) = &cli.out_dir {
        fs::create_dir_all(out_dir)?;
        for flow in flows {
            let text = synthesizer.render(flow, cli.max_depth, options, &index);
            let file = out_dir.join(format!("{}.puml", sanitize(&flow.name)));
            fs::write(&file, text)?;
            println!("wrote {}", file.display());
        }
    } else {
        for flow in flows {
            println!(
                "' flow: {} ({}, {} components)",
                flow.name,
                flow.file_name,
                flow.component_count()
            );
            println!("{}", synthesizer.render(flow, cli.max_depth, options, &index));
        }
    }
    Ok(())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
