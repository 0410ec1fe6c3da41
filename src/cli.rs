use crate::config::load_config;
use crate::export::{Document, export_view};
use crate::view::Workspace;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "c4puml", version, about = "Export C4 workspace views as C4-PlantUML")]
pub struct Args {
    /// Workspace JSON file or '-' for stdin
    #[arg(short = 'w', long = "workspace")]
    pub workspace: Option<PathBuf>,

    /// Export config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Output directory. Documents are printed to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Only export these view keys
    #[arg(short = 'v', long = "view")]
    pub views: Vec<String>,

    /// File extension of written documents
    #[arg(short = 'e', long = "extension", default_value = "puml")]
    pub extension: String,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let workspace = read_workspace(args.workspace.as_deref())?;

    for key in &args.views {
        if workspace.view(key).is_none() {
            return Err(anyhow::anyhow!("view `{key}` not found in workspace"));
        }
    }
    let selected: Vec<_> = workspace
        .views
        .iter()
        .filter(|view| args.views.is_empty() || args.views.contains(&view.key))
        .collect();
    if selected.is_empty() {
        return Err(anyhow::anyhow!("workspace has no views to export"));
    }

    let ctx = config.into_context(&workspace);
    let mut failed = 0;
    for view in selected {
        match export_view(&ctx, &workspace, view) {
            Ok(document) => write_document(&document, args.output.as_deref(), &args.extension)?,
            Err(err) => {
                eprintln!("error: view `{}`: {err}", view.key);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow::anyhow!("{failed} view(s) failed to export"));
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Keep a subscriber installed by an embedding process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_workspace(path: Option<&Path>) -> Result<Workspace> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading workspace {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_workspace(&contents)
}

fn parse_workspace(contents: &str) -> Result<Workspace> {
    serde_json::from_str(contents).context("parsing workspace JSON")
}

fn write_document(document: &Document, output: Option<&Path>, extension: &str) -> Result<()> {
    match output {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(document.file_name(extension));
            std::fs::write(&path, &document.content)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote view");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
