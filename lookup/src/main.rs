mod cli;
mod config;
mod driver;
mod report;
mod storage;
mod transport;

use aspexis_shared::{FavoritesStore, NoopNotifier, SearchHistoryStore};
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use crate::cli::Command;
use crate::storage::FileStorage;
use crate::transport::HttpTransport;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(command).await {
        tracing::error!(error = format!("{e:#}"), "lookup failed");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let storage = FileStorage::new(config::data_dir());
    tracing::debug!(dir = %storage.dir().display(), "using data directory");

    match command {
        Command::Player {
            term,
            options,
            favorite,
        } => {
            let transport = HttpTransport::from_env()?;
            let mut history = SearchHistoryStore::init(storage.clone(), NoopNotifier);
            let session = driver::run_lookup(&transport, &mut history, &term, &options).await?;
            print!("{}", report::render_session(&session));

            if favorite {
                let Some(identity) = session.identity().data().copied() else {
                    anyhow::bail!("cannot favorite {term:?}: player was not resolved");
                };
                let mut favorites = FavoritesStore::init(storage);
                if favorites.add(&identity.uuid, &identity.username, Utc::now()) {
                    println!("Added {} to favorites.", identity.username);
                }
            }
        }
        Command::History => {
            let history = SearchHistoryStore::init(storage, NoopNotifier);
            print!("{}", report::render_history(history.list()));
        }
        Command::ForgetSearch(term) => {
            let mut history = SearchHistoryStore::init(storage, NoopNotifier);
            history.remove(&term);
            print!("{}", report::render_history(history.list()));
        }
        Command::Favorites => {
            let transport = HttpTransport::from_env()?;
            let favorites = FavoritesStore::init(storage);
            let resolved = driver::resolve_favorites(&transport, favorites.list()).await;
            print!("{}", report::render_favorites(&resolved, Utc::now()));
        }
        Command::Unfavorite(uuid) => {
            let mut favorites = FavoritesStore::init(storage);
            if !favorites.remove(&uuid) {
                tracing::warn!(uuid, "not in favorites");
            }
        }
    }
    Ok(())
}
