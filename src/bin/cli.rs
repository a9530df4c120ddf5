//! CLI binary for college-finder.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use college_finder::render::{render_progress, render_records};
use college_finder::{
    CachedExtractor, FinderConfig, GeminiExtractor, IndiaState, ItemDraft, ProgressEvent, Session,
    SheetFormat, ViewMode,
};
use finder_search::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// College Finder: look up Indian colleges in bulk through Gemini search.
#[derive(Parser)]
#[command(name = "college-finder", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the session file holding items and results.
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Add a college to the pending list.
    Add {
        /// Institution name.
        name: String,
        /// State or union territory (see `states`).
        #[arg(short, long)]
        state: String,
        /// District, if known.
        #[arg(short, long)]
        district: Option<String>,
    },

    /// Remove a pending college by id (or a unique id prefix).
    Remove {
        /// Item id as shown by `list`.
        id: String,
    },

    /// List pending colleges.
    List,

    /// Remove every pending college.
    Clear,

    /// Forget pending colleges, results, and errors.
    Reset,

    /// Append colleges from a .csv, .tsv, .xlsx, or .xls file.
    Import {
        /// File with `College Name` (or `Name`), `State`, and optional `District` columns.
        file: PathBuf,
    },

    /// Look up every pending college and show the results.
    Run {
        /// Gemini API key.
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Maximum requests in flight.
        #[arg(long)]
        concurrency: Option<usize>,
        /// Answer from model knowledge only, without web search.
        #[arg(long)]
        no_web_search: bool,
        /// Results layout.
        #[arg(long)]
        view: Option<ViewMode>,
    },

    /// Show results of the last run.
    Show {
        /// Results layout: cards or table.
        #[arg(long)]
        view: Option<ViewMode>,
        /// Only show colleges whose name, state, or district contains this text.
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Export results of the last run.
    Export {
        /// File format: csv, tsv, xlsx, or json.
        #[arg(long)]
        format: Option<SheetFormat>,
        /// Export only the result with this college name.
        #[arg(long)]
        record: Option<String>,
        /// Directory to write into.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Only export colleges whose name, state, or district contains this text.
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// List the accepted states and union territories.
    States,
}

impl Command {
    /// Whether the command changes the saved session.
    fn mutates_session(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Remove { .. }
                | Self::Clear
                | Self::Reset
                | Self::Import { .. }
                | Self::Run { .. }
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries rendered results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("college_finder=info,finder_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(FinderConfig::default_config_path);
    let config = FinderConfig::load_or_default(&config_path)?;

    let session_path = cli
        .session
        .clone()
        .unwrap_or_else(FinderConfig::default_session_path);
    let mut session = Session::load(&session_path)?;

    let mutates = cli.command.mutates_session();
    let outcome = execute(cli.command, &config, &mut session).await;
    if mutates {
        session.save(&session_path)?;
    }
    outcome
}

async fn execute(
    command: Command,
    config: &FinderConfig,
    session: &mut Session,
) -> anyhow::Result<()> {
    match command {
        Command::Add {
            name,
            state,
            district,
        } => {
            let item = session.add_item(ItemDraft {
                name,
                state,
                district,
            })?;
            println!("Added {} ({}) [{}]", item.name, item.state, item.id);
            Ok(())
        }
        Command::Remove { id } => match session.remove_item(&id) {
            Some(item) => {
                println!("Removed {}", item.name);
                Ok(())
            }
            None => anyhow::bail!("no pending college matches id {id:?}"),
        },
        Command::List => {
            list_items(session);
            Ok(())
        }
        Command::Clear => {
            session.clear_items();
            println!("Pending list cleared.");
            Ok(())
        }
        Command::Reset => {
            session.reset();
            println!("Session reset.");
            Ok(())
        }
        Command::Import { file } => import(session, &file),
        Command::Run {
            api_key,
            concurrency,
            no_web_search,
            view,
        } => {
            run(session, config, api_key.as_deref(), concurrency, no_web_search).await?;
            let view = view.unwrap_or(config.output.view);
            print!("{}", render_records(&session.filtered_results(""), view));
            Ok(())
        }
        Command::Show { view, filter } => {
            if let Some(error) = &session.error {
                eprintln!("{error}");
            }
            let view = view.unwrap_or(config.output.view);
            print!("{}", render_records(&session.filtered_results(&filter), view));
            Ok(())
        }
        Command::Export {
            format,
            record,
            dir,
            filter,
        } => {
            let format = format.unwrap_or(config.output.export_format);
            let path = match record {
                Some(name) => session.export_record(&name, &dir, format)?,
                None => session.export_results(&dir, format, &filter)?,
            };
            println!("Wrote {}", path.display());
            Ok(())
        }
        Command::States => {
            for state in IndiaState::all() {
                println!("{state}");
            }
            Ok(())
        }
    }
}

fn list_items(session: &Session) {
    if session.items.is_empty() {
        println!("No pending colleges. Add one with `college-finder add` or `import`.");
        return;
    }
    for item in &session.items {
        match &item.district {
            Some(district) => println!("{}  {} ({district}, {})", item.id, item.name, item.state),
            None => println!("{}  {} ({})", item.id, item.name, item.state),
        }
    }
    println!("{} pending", session.items.len());
}

fn import(session: &mut Session, file: &Path) -> anyhow::Result<()> {
    let added = session.import_file(file)?;
    println!(
        "Imported {added} colleges from {} ({} pending)",
        file.display(),
        session.items.len()
    );
    Ok(())
}

async fn run(
    session: &mut Session,
    config: &FinderConfig,
    api_key: Option<&str>,
    concurrency: Option<usize>,
    no_web_search: bool,
) -> anyhow::Result<()> {
    let mut extract = config.extract_config();
    if let Some(concurrency) = concurrency {
        extract.concurrency = concurrency;
    }
    if no_web_search {
        extract.web_search = false;
    }
    extract.validate()?;
    let api_key = config.resolve_api_key(api_key)?;

    let extractor = CachedExtractor::new(
        GeminiExtractor::new(api_key, &extract)?,
        extract.cache_ttl_seconds,
    );

    let pb = ProgressBar::new(session.items.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("  [{bar:30}] {pos}/{len} ({percent}%) {msg}") {
        pb.set_style(style);
    }
    let callback = progress_callback(pb.clone());

    match session
        .run_batch(&extractor, extract.concurrency, Some(&callback))
        .await
    {
        Ok(_) => {
            pb.finish_and_clear();
            eprintln!("{}", render_progress(&session.progress));
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            if let Some(message) = &session.error {
                eprintln!("{message}");
            }
            Err(e.into())
        }
    }
}

/// Drive an indicatif bar from batch progress events.
fn progress_callback(pb: ProgressBar) -> ProgressCallback {
    Box::new(move |event| match event {
        ProgressEvent::BatchStarted { total } => pb.set_length(total as u64),
        ProgressEvent::ItemStarted { label } => pb.set_message(label),
        ProgressEvent::ItemCompleted {
            label,
            completed,
            failed,
            ..
        } => {
            pb.set_position(completed as u64);
            if failed {
                pb.println(format!("  failed: {label}"));
            }
        }
        ProgressEvent::BatchCompleted { failed, .. } => {
            pb.set_message(format!("done, {failed} failed"));
        }
    })
}
