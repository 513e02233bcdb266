use std::sync::Arc;

use anyhow::{bail, Context};
use jobscout_core::{paginate, SessionSnapshot, SessionState, HISTORY_PAGE_SIZE};
use jobscout_engine::{
    export_results, HttpPushSource, HttpScraperApi, SessionController, SessionIdentity,
};
use jobscout_logging::{scout_info, scout_warn};

use super::config::{self, Overrides, ResolvedConfig, BASE_URL_ENV};
use super::credentials::FileIdentity;
use super::ui::progress::Reporter;
use super::ui::prompt::{Prompt, CLEAR_HISTORY_QUESTION, STOP_QUESTION};
use super::ui::render;
use crate::cli::{Cli, Command, ScrapeArgs};

/// What a Ctrl-C means for the live session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Ask the user to confirm stopping the scraper.
    RequestStop,
    /// A confirmation is already pending; a second interrupt answers yes.
    ConfirmStop,
    /// Nothing left to ask; leave the loop and dispose.
    Abandon,
}

fn interrupt_action(snapshot: &SessionSnapshot) -> InterruptAction {
    if snapshot.stop_pending {
        InterruptAction::ConfirmStop
    } else if snapshot.state.is_live() {
        InterruptAction::RequestStop
    } else {
        InterruptAction::Abandon
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = config::load_config(&cli.config)?;
    let export_dir = match &cli.command {
        Command::Scrape(args) => args.export_dir.clone(),
        _ => None,
    };
    let resolved = config::resolve(
        file,
        std::env::var(BASE_URL_ENV).ok(),
        Overrides {
            api_base_url: cli.api_base_url.clone(),
            credentials_path: cli.credentials.clone(),
            export_dir,
        },
    )?;
    scout_info!("Using scraper backend at {}", resolved.settings.base_url);

    match cli.command {
        Command::Platforms => list_platforms(&resolved).await,
        Command::History { page } => show_history(&resolved, page).await,
        Command::ClearHistory { yes } => clear_history(&resolved, yes).await,
        Command::Scrape(args) => scrape(&resolved, &args).await,
    }
}

async fn list_platforms(resolved: &ResolvedConfig) -> anyhow::Result<()> {
    let credentials = FileIdentity::new(resolved.credentials_path.clone()).resolve()?;
    let api = HttpScraperApi::new(resolved.settings.clone())?;
    let platforms = api
        .platforms(&credentials)
        .await
        .context("failed to load available platforms")?;
    println!("{}", render::platform_list(&platforms));
    Ok(())
}

async fn show_history(resolved: &ResolvedConfig, page: usize) -> anyhow::Result<()> {
    let credentials = FileIdentity::new(resolved.credentials_path.clone()).resolve()?;
    let api = HttpScraperApi::new(resolved.settings.clone())?;
    let entries = api
        .history(&credentials)
        .await
        .context("failed to load scraping history")?;
    println!(
        "{}",
        render::history_page(&paginate(&entries, page, HISTORY_PAGE_SIZE))
    );
    Ok(())
}

async fn clear_history(resolved: &ResolvedConfig, yes: bool) -> anyhow::Result<()> {
    let credentials = FileIdentity::new(resolved.credentials_path.clone()).resolve()?;
    if !yes && !Prompt::new().confirm(CLEAR_HISTORY_QUESTION).await {
        println!("History kept.");
        return Ok(());
    }
    let api = HttpScraperApi::new(resolved.settings.clone())?;
    api.clear_history(&credentials)
        .await
        .context("failed to clear scraping history")?;
    println!("All history cleared.");
    Ok(())
}

async fn scrape(resolved: &ResolvedConfig, args: &ScrapeArgs) -> anyhow::Result<()> {
    let api = Arc::new(HttpScraperApi::new(resolved.settings.clone())?);
    let source = Arc::new(HttpPushSource::new(resolved.settings.clone())?);
    let identity = Arc::new(FileIdentity::new(resolved.credentials_path.clone()));
    let mut controller = SessionController::new(api, source, identity);

    controller.start(args.request())?;
    println!("{}", render::status_line(&controller.snapshot()));

    let mut prompt = Prompt::new();
    let mut reporter = Reporter::default();
    loop {
        let awaiting_answer = controller.snapshot().stop_pending;
        tokio::select! {
            event = controller.next_event() => {
                let Some(snapshot) = event else { break };
                for line in reporter.report(&snapshot) {
                    println!("{line}");
                }
                if matches!(snapshot.state, SessionState::Idle | SessionState::Errored) {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for ctrl-c")?;
                match interrupt_action(&controller.snapshot()) {
                    InterruptAction::RequestStop => match controller.request_stop() {
                        Ok(()) => println!("{STOP_QUESTION}"),
                        Err(err) => scout_warn!("Ignoring stop request: {}", err),
                    },
                    InterruptAction::ConfirmStop => {
                        controller.confirm_stop()?;
                        for line in reporter.report(&controller.snapshot()) {
                            println!("{line}");
                        }
                    }
                    InterruptAction::Abandon => {
                        println!("Interrupted again, closing the session locally");
                        break;
                    }
                }
            }
            answer = prompt.answer(), if awaiting_answer => {
                if answer.unwrap_or(false) {
                    controller.confirm_stop()?;
                } else {
                    controller.cancel_stop()?;
                }
                for line in reporter.report(&controller.snapshot()) {
                    println!("{line}");
                }
            }
        }
    }

    let snapshot = controller.snapshot();
    controller.dispose();

    println!("{}", render::results_table(&snapshot, &args.filter()));
    let formats = args.export_formats();
    if !formats.is_empty() && !controller.results().is_empty() {
        let summary = export_results(&resolved.export_dir, controller.results(), &formats)?;
        for file in &summary.files {
            println!("Exported {} jobs to {}", summary.record_count, file.display());
        }
    }

    if snapshot.state == SessionState::Errored {
        bail!(
            "{}",
            snapshot
                .last_error_message()
                .unwrap_or_else(|| "scraping session failed".to_string())
        );
    }
    Ok(())
}
