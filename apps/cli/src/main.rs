mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use rtext_core::{next_focus_target, DockLayout, DockRegion, FocusDirection, FocusState, MainView};
use rtext_settings::{Preferences, PreferencesStore};
use rtext_tasks::{TaskRow, TaskTagParser, TaskWindow};
use serde_json::json;
use walkdir::WalkDir;

const BINARY_SNIFF_LEN: usize = 8 * 1024;

#[derive(Parser)]
#[command(
    name = "rtext-cli",
    about = "Headless task listing and dock focus tools for RText",
    author,
    version
)]
struct Cli {
    /// 偏好設定 JSON 檔案。 / Preferences JSON file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 記錄層級（覆寫設定與 RUST_LOG）。 / Log level; overrides preferences and RUST_LOG.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出檔案中的任務標記。 / List task tags (TODO, FIXME, ...) found in files.
    Tasks(TasksArgs),
    /// 計算下一個取得焦點的停駐區域。 / Compute the next dock region to focus.
    Focus(FocusArgs),
}

#[derive(Args)]
struct TasksArgs {
    /// 檔案或資料夾。 / Files or directories to scan.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// 以逗號分隔的任務標記，覆寫設定。 / Comma-separated task identifiers; overrides preferences.
    #[arg(long, value_delimiter = ',', value_name = "IDENTS")]
    identifiers: Option<Vec<String>>,

    /// 以 JSON 輸出。 / Emit rows as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FocusArgs {
    /// 目前的焦點區域。 / Region that currently has focus.
    #[arg(long, default_value = "editor", value_name = "REGION")]
    from: FocusState,

    /// 移動方向。 / Direction to move focus in.
    #[arg(long, value_enum, default_value_t = DirectionChoice::Left)]
    direction: DirectionChoice,

    /// 以逗號分隔的現有區域，覆寫設定。 / Comma-separated present regions; overrides preferences.
    #[arg(long, value_delimiter = ',', value_name = "REGIONS")]
    layout: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionChoice {
    Left,
    Right,
}

impl From<DirectionChoice> for FocusDirection {
    fn from(choice: DirectionChoice) -> Self {
        match choice {
            DirectionChoice::Left => FocusDirection::Left,
            DirectionChoice::Right => FocusDirection::Right,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        config,
        log_level,
        command,
    } = Cli::parse();
    let preferences = load_preferences(config.as_deref())?;
    let _logger = logging::init_logging(log_level.as_deref(), &preferences.logging.level)?;
    match command {
        Commands::Tasks(args) => execute_tasks(args, &preferences),
        Commands::Focus(args) => execute_focus(args, &preferences),
    }
}

fn load_preferences(path: Option<&Path>) -> Result<Preferences> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            let store = PreferencesStore::load(path)?;
            Ok(store.preferences().clone())
        }
        None => Ok(Preferences::default()),
    }
}

fn execute_tasks(args: TasksArgs, preferences: &Preferences) -> Result<()> {
    let identifiers = args
        .identifiers
        .unwrap_or_else(|| preferences.tasks.identifiers.clone());
    let parser = TaskTagParser::with_identifiers(&identifiers)
        .with_context(|| format!("invalid task identifiers {identifiers:?}"))?;

    let mut view = MainView::new();
    let mut window = TaskWindow::new(parser);
    window.set_position(preferences.tasks.position);
    window.set_visible(preferences.tasks.visible);
    let (window, _listener) = TaskWindow::install(window, &mut view);

    for file in collect_files(&args.paths)? {
        let Some(text) = read_text(&file)? else {
            debug!("event=scan module=cli status=skipped path={} reason=binary", file.display());
            continue;
        };
        let title = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        view.open(title, Some(file), text);
    }

    let rows = window.borrow().rows();
    if args.json {
        print_rows_json(&rows)?;
    } else {
        for row in &rows {
            println!("{}:{}: {}", row.file, row.display_line(), row.message);
        }
    }
    Ok(())
}

fn print_rows_json(rows: &[TaskRow]) -> Result<()> {
    let payload: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "file": row.file,
                "line": row.display_line(),
                "message": row.message,
                "icon": row.icon.resource_name(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            bail!("path {} does not exist", path.display());
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("failed to walk directory {}", path.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

/// Reads a file as text, returning `None` for files that look binary.
fn read_text(path: &Path) -> Result<Option<String>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn execute_focus(args: FocusArgs, preferences: &Preferences) -> Result<()> {
    let layout = match args.layout {
        Some(names) => parse_layout(&names)?,
        None => preferences.dock.layout(),
    };
    if let Some(region) = args.from.region() {
        if !layout.contains(region) {
            warn!(
                "event=move_focus module=cli status=absent_source region={}",
                region
            );
        }
    }
    let target = next_focus_target(args.from, &layout, args.direction.into());
    println!("{target}");
    Ok(())
}

fn parse_layout(names: &[String]) -> Result<DockLayout> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<DockRegion>().map_err(anyhow::Error::from))
        .collect()
}
