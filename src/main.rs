use clap::Parser;
use find_in_files::app::{SearchEvent, SearchSession};
use find_in_files::config::{settings, SearchConfig};
use find_in_files::core::{ResultBuffer, SearchRequest};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Find files by name and, optionally, by content.
#[derive(Parser, Debug)]
#[command(name = "find-in-files", version, about)]
struct Cli {
    /// Directory to search in
    root: PathBuf,

    /// File name pattern; `*` matches any run of characters
    #[arg(default_value = "*")]
    pattern: String,

    /// Only report files containing this text (case-insensitive)
    #[arg(short, long)]
    content: Option<String>,

    /// Also search inside hidden directories
    #[arg(long)]
    hidden: bool,

    /// Read settings from this file instead of the platform config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Prints committed results that have not been printed yet.
fn print_new_results(results: &ResultBuffer, printed: usize) -> usize {
    let fresh = results.committed_since(printed);
    for path in &fresh {
        println!("{}", path.display());
    }
    printed + fresh.len()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = settings::load_config(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Using default settings: {}", e);
        SearchConfig::default()
    });
    if cli.hidden {
        config.include_hidden = true;
    }

    let mut request = SearchRequest::new(cli.root, cli.pattern);
    if let Some(content) = cli.content {
        request = request.with_content(content);
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<SearchEvent>();
    let mut session = SearchSession::new(config, tx);
    let search_id = session.start_search(request)?;
    let results = session.results().clone();
    let mut printed = 0;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if event.search_id() != search_id {
                    continue;
                }
                match event {
                    SearchEvent::Started { root, .. } => {
                        tracing::info!("Searching in {}", root.display());
                    }
                    SearchEvent::Progress { folder, .. } => {
                        eprintln!("{}", folder.display());
                    }
                    SearchEvent::Complete { summary, .. } => {
                        print_new_results(&results, printed);
                        eprintln!("{summary}");
                        break;
                    }
                    SearchEvent::Cancelled { .. } => {
                        printed = print_new_results(&results, printed);
                        eprintln!("Search cancelled, {printed} items found");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tokio::task::block_in_place(|| session.cancel_current_search());
            }
        }
        printed = print_new_results(&results, printed);
    }

    Ok(())
}
