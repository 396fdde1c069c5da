// src/cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::core::{ConfigManager, JobsApi, KeyValueStore, ServiceClient, SqliteStore};
use crate::matches::MatchBoard;
use crate::render;
use crate::ui::{Navigator, Notifier, Route, TerminalNotifier};
use crate::upload::UploadCoordinator;

#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(about = "Upload a CV, browse AI-matched jobs and fetch cover letters")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./jobmatch.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a PDF CV, trigger matching, then show the matches
    Upload { file: PathBuf },
    /// Show matched jobs (from the local cache when present)
    Matches,
    /// Toggle the saved flag of a matched job
    Save { identifier: String },
    /// List saved jobs
    Saved,
    /// Generate and download a cover letter for a job
    CoverLetter {
        job_id: String,
        /// Directory to write the letter to (overrides configuration)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

/// Remembers where the last flow asked to go.
#[derive(Default)]
pub struct PendingNavigation {
    route: Mutex<Option<Route>>,
}

impl PendingNavigation {
    pub fn take(&self) -> Option<Route> {
        self.route
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Navigator for PendingNavigation {
    fn navigate(&self, route: Route) {
        app_log!(debug, "Navigate to {}", route.path());
        *self
            .route
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(route);
    }
}

struct App {
    config: ConfigManager,
    api: Arc<dyn JobsApi>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    async fn board(&self, download_dir: Option<PathBuf>) -> MatchBoard {
        MatchBoard::open(
            self.api.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.config.storage.save_key,
            download_dir.unwrap_or_else(|| self.config.storage.download_dir.clone()),
        )
        .await
    }

    async fn show_matches(&self) {
        let mut board = self.board(None).await;
        println!("{}", render::board(board.view(), |_| false));
        board.load().await;
        let key = board.save_key();
        print!("{}", render::board(board.view(), |job| board.is_saved(job.save_key(key))));
    }
}

pub async fn handle_command(cli: Cli, config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let store = SqliteStore::open(&config.storage.database_path).await?;
    let api = ServiceClient::new(&config.service.api_url, config.service.timeout_seconds)?;
    app_log!(debug, "Backend: {}", api.base_url());

    let app = App {
        config,
        api: Arc::new(api),
        store: Arc::new(store),
        notifier: Arc::new(TerminalNotifier),
    };

    match cli.command {
        Command::Upload { file } => {
            let navigation = Arc::new(PendingNavigation::default());
            let coordinator =
                UploadCoordinator::new(app.api.clone(), app.notifier.clone(), navigation.clone());

            match coordinator.submit_file(&file).await {
                Ok(state) => {
                    println!("{}", render::upload_state(&state));
                    if navigation.take() == Some(Route::MatchedJobs) {
                        app.show_matches().await;
                    }
                }
                Err(e) => {
                    app_log!(warn, "File not accepted: {}", e);
                    println!("❌ {}", e);
                }
            }
        }

        Command::Matches => app.show_matches().await,

        Command::Save { identifier } => {
            let mut board = app.board(None).await;
            board.load().await;
            if let Some(error) = board.error() {
                println!("❌ {}", error);
                return Ok(());
            }
            match board.toggle_save(&identifier).await {
                Ok(true) => println!("★ Saved {}", identifier),
                Ok(false) => println!("☆ Removed {} from saved jobs", identifier),
                Err(e) => println!("❌ {}", e),
            }
        }

        Command::Saved => {
            let board = app.board(None).await;
            print!("{}", render::saved_list(board.saved_jobs()));
        }

        Command::CoverLetter { job_id, out_dir } => {
            let board = app.board(out_dir).await;
            board.request_cover_letter(&job_id).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cover_letter_args() {
        let cli = Cli::try_parse_from([
            "jobmatch",
            "cover-letter",
            "job-7",
            "--out-dir",
            "/tmp/out",
            "--config",
            "alt.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        match cli.command {
            Command::CoverLetter { job_id, out_dir } => {
                assert_eq!(job_id, "job-7");
                assert_eq!(out_dir, Some(PathBuf::from("/tmp/out")));
            }
            _ => panic!("expected cover-letter"),
        }
    }

    #[test]
    fn test_pending_navigation_is_taken_once() {
        let nav = PendingNavigation::default();
        nav.navigate(Route::MatchedJobs);
        assert_eq!(nav.take(), Some(Route::MatchedJobs));
        assert_eq!(nav.take(), None);
    }
}
