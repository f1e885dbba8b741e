use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use notewidget::config::Config;
use notewidget::links::extract_links;
use notewidget::note::{Note, NoteDeck, toggle_checkbox};
use notewidget::pager::Pager;
use notewidget::render::{RenderOptions, render};
use notewidget::segments::{DisplayRow, render_paragraphs, split_rows};
use notewidget::terminal::{rows_to_ansi, to_ansi};
use notewidget::theme::RenderProfile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "notewidget")]
#[command(about = "Preview how notes render in the home-screen widget", long_about = None)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Render budget to use
    #[arg(long, value_enum, default_value = "full", global = true)]
    profile: RenderProfile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a note as a single document
    Render { file: PathBuf },
    /// Render a note split into paragraph segments
    Paragraphs { file: PathBuf },
    /// Render a note as list rows with interactive checkboxes
    Rows { file: PathBuf },
    /// List the links in a note and where they lead
    Links { file: PathBuf },
    /// Toggle the checkbox on a zero-based line, rewriting the file
    Toggle { file: PathBuf, line: usize },
    /// Show one page of a deck built from several notes
    Deck {
        files: Vec<PathBuf>,
        /// Pages to move from the first note (negative wraps backwards)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        page: isize,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let result = match path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    result.map_err(|e| e.to_string())
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

fn load_note(path: &Path) -> Result<Note, String> {
    let content = read_file(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let modified: DateTime<Utc> = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(Note::new(
        path.display().to_string(),
        name.clone(),
        content,
        name,
        modified,
    ))
}

fn cmd_render(file: &Path, options: &RenderOptions) -> Result<(), String> {
    let content = read_file(file)?;
    println!("{}", to_ansi(&render(&content, options), options.base_text_color));
    Ok(())
}

fn cmd_paragraphs(file: &Path, options: &RenderOptions) -> Result<(), String> {
    let content = read_file(file)?;
    for (i, row) in render_paragraphs(&content, options).iter().enumerate() {
        match row {
            DisplayRow::Text(text) => println!("--- segment {} (line {}) ---", i, text.first_line),
            DisplayRow::Checkbox(_) => println!("--- segment {} ---", i),
        }
        println!("{}", to_ansi(row.content(), options.base_text_color));
    }
    Ok(())
}

fn cmd_rows(file: &Path, options: &RenderOptions) -> Result<(), String> {
    let content = read_file(file)?;
    let rows = split_rows(&content, options);
    println!("{}", rows_to_ansi(&rows, options.base_text_color));
    Ok(())
}

fn cmd_links(file: &Path, config: &Config) -> Result<(), String> {
    let content = read_file(file)?;
    let vault = config.vault.as_deref().unwrap_or_default();
    for (index, line) in content.lines().enumerate() {
        for link in extract_links(line) {
            println!("{}: {} -> {}", index, link.text, link.route(vault));
        }
    }
    Ok(())
}

fn cmd_toggle(file: &Path, line: usize) -> Result<(), String> {
    let content = read_file(file)?;
    let toggled = toggle_checkbox(&content, line).map_err(|e| e.to_string())?;
    fs::write(file, toggled).map_err(|e| format!("Failed to write '{}': {}", file.display(), e))
}

fn cmd_deck(files: &[PathBuf], page: isize, options: &RenderOptions) -> Result<(), String> {
    let mut deck = NoteDeck::new();
    for file in files {
        deck.add(load_note(file)?).map_err(|e| e.to_string())?;
    }

    let mut pager = Pager::new();
    let Some(index) = pager.navigate(page, deck.len()) else {
        println!("(no notes)");
        return Ok(());
    };
    let Some(note) = deck.get(index) else {
        return Ok(());
    };

    println!("{}  {}", note.title, pager.indicator(deck.len()));
    println!();
    println!("{}", rows_to_ansi(&note.rows(options), options.base_text_color));
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let options = config.render_options(args.profile);

    let result = match &args.command {
        Commands::Render { file } => cmd_render(file, &options),
        Commands::Paragraphs { file } => cmd_paragraphs(file, &options),
        Commands::Rows { file } => cmd_rows(file, &options),
        Commands::Links { file } => cmd_links(file, &config),
        Commands::Toggle { file, line } => cmd_toggle(file, *line),
        Commands::Deck { files, page } => cmd_deck(files, *page, &options),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
