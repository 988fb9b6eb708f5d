use std::io::Write;

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use runboard::config::DashboardConfig;
use runboard::model::NodeType;
use runboard::overlay::{ChecklistSummary, visible_checklist};
use runboard::scene::build_scene;
use runboard::session::{DashboardSession, open_fs_session};
use runboard::source::FsSource;
use runboard::svg::scene_to_svg;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a training pipeline dashboard from the command line", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PathArgs {
    /// JSON config file; flags below override its values
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// Layout document
    #[arg(long, global = true, value_name = "FILE")]
    layout: Option<Utf8PathBuf>,

    /// Runtime status document
    #[arg(long, global = true, value_name = "FILE")]
    status: Option<Utf8PathBuf>,

    /// Run history directory (contains index.json)
    #[arg(long, global = true, value_name = "DIR")]
    runs_dir: Option<Utf8PathBuf>,

    /// Zipped run history, read instead of --runs-dir
    #[arg(long, global = true, value_name = "ZIP")]
    runs_bundle: Option<Utf8PathBuf>,

    /// Job status document
    #[arg(long, global = true, value_name = "FILE")]
    job_status: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print views, node statuses, checklist progress and run history
    Summary,
    /// Render a view to SVG
    Render {
        /// View id; the configured default or first view when omitted
        #[arg(short, long)]
        view: Option<String>,
        /// Only show these node types (pi, function, agent, tool)
        #[arg(short, long, value_delimiter = ',')]
        types: Vec<String>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<Utf8PathBuf>,
    },
    /// Compare two runs ("current" is the live snapshot)
    Compare {
        #[arg(long, default_value = "current")]
        current: String,
        /// Baseline run id; the most recent other run when omitted
        #[arg(long)]
        baseline: Option<String>,
        /// Emit the delta summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open the native viewer (requires the `egui` feature)
    View,
}

fn load_config(paths: &PathArgs) -> Result<DashboardConfig> {
    let mut config = match &paths.config {
        Some(path) => DashboardConfig::load(&mut FsSource, path)?,
        None => DashboardConfig::default(),
    };
    if let Some(p) = &paths.layout {
        config.layout_path = p.clone();
    }
    if let Some(p) = &paths.status {
        config.status_path = p.clone();
    }
    if let Some(p) = &paths.runs_dir {
        config.runs_dir = p.clone();
    }
    if let Some(p) = &paths.runs_bundle {
        config.runs_bundle = Some(p.clone());
    }
    if let Some(p) = &paths.job_status {
        config.job_status_path = Some(p.clone());
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.paths)?;

    match cli.command {
        Command::Summary => {
            let session = open_fs_session(config)?;
            print_summary(&session)
        }
        Command::Render { view, types, out } => {
            let mut session = open_fs_session(config)?;
            let canvas = session.canvas_mut();
            if let Some(id) = view {
                canvas.select_view(&id)?;
            }
            if !types.is_empty() {
                let mut parsed = Vec::with_capacity(types.len());
                for t in &types {
                    match NodeType::parse(t) {
                        Some(nt) => parsed.push(nt),
                        None => bail!("Unknown node type '{}'", t),
                    }
                }
                canvas.set_active_types(parsed);
            }
            let svg = scene_to_svg(&build_scene(canvas));
            match out {
                Some(path) => std::fs::write(&path, svg).with_context(|| format!("Write {}", path))?,
                None => std::io::stdout().write_all(svg.as_bytes())?,
            }
            Ok(())
        }
        Command::Compare {
            current,
            baseline,
            json,
        } => {
            let mut session = open_fs_session(config)?;
            session.select_current(&current);
            if let Some(b) = &baseline {
                session.select_baseline(b);
            }
            let selection = session.comparison_selection().clone();
            let summary = session.comparison();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} vs {}",
                    selection.current.key(),
                    selection.baseline.as_ref().map_or("n/a", |b| b.key())
                );
                for (name, value, tag) in summary.rows() {
                    println!("  {name:<24} {value:<24} {tag}");
                }
            }
            Ok(())
        }
        Command::View => run_viewer(config),
    }
}

fn print_summary(session: &DashboardSession<FsSource>) -> Result<()> {
    let canvas = session.canvas();
    let layout = canvas.layout();
    println!(
        "{}",
        layout.meta.title.as_deref().unwrap_or("Pipeline dashboard")
    );
    if let Some(sub) = &layout.meta.subtitle {
        println!("{sub}");
    }
    println!();
    println!("Views:");
    for v in &layout.views {
        let marker = if v.id == canvas.view().id { "*" } else { " " };
        println!(
            " {marker} {:<16} {} ({} nodes, {} connections)",
            v.id,
            v.name,
            v.nodes.len(),
            v.connections.len()
        );
    }

    println!();
    println!("Runtime status: {}", canvas.runtime_availability().label());
    let statuses = canvas.effective_status();
    for (id, entry) in statuses.for_view(canvas.view()) {
        match entry.message.as_deref() {
            Some(msg) => println!("  {:<20} {:<8} {}", id, entry.status, msg),
            None => println!("  {:<20} {}", id, entry.status),
        }
    }

    if let Some(runtime) = canvas.runtime() {
        let summary = ChecklistSummary::of(&runtime.checklist);
        println!();
        println!("Checklist: {}/{} passed", summary.passed, summary.total);
        for item in visible_checklist(&runtime.checklist) {
            println!("  [{}] {}", if item.passed { "x" } else { " " }, item.title);
        }
        let ready: Vec<&str> = runtime.artifacts.ready_flags().collect();
        if !ready.is_empty() {
            println!("Ready: {}", ready.join(", "));
        }
    }

    if let Some(job) = session.job() {
        println!();
        println!(
            "Job: {:?}{}",
            job.state,
            job.progress_label()
                .map(|p| format!(" ({p})"))
                .unwrap_or_default()
        );
    }

    println!();
    println!("Run history: {}", session.history_availability().label());
    if let Some(history) = session.history() {
        for run in &history.index().runs {
            let checks = run
                .checklist
                .map(|c| format!("{}/{}", c.passed, c.total))
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<36} checks {}", run.display_label(), checks);
        }
    }
    Ok(())
}

#[cfg(feature = "egui")]
fn run_viewer(config: DashboardConfig) -> Result<()> {
    let session = open_fs_session(config)?;
    runboard::egui_app::run(session)
}

#[cfg(not(feature = "egui"))]
fn run_viewer(_config: DashboardConfig) -> Result<()> {
    bail!("runboard was built without the `egui` feature; rebuild with --features egui")
}
