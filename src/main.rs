use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use teloxide::Bot;
use tracing_subscriber::EnvFilter;

use homework_watchbot::config::{self, Secrets};
use homework_watchbot::notifier::TelegramNotifier;
use homework_watchbot::poller::{PollState, Poller, TokioSleeper};
use homework_watchbot::review_api::ReviewClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "Relay homework review status changes to Telegram")]
struct Args {
    /// Optional YAML file with API and polling tunables
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("homework_watchbot=debug,info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;

    let secrets = config::ensure_secrets(Secrets::from_env())?;

    let api = ReviewClient::new(
        secrets.practicum_token.clone(),
        cfg.endpoint_url()?,
        cfg.request_timeout(),
    )?;
    let bot = Bot::new(secrets.telegram_token.clone());
    let notifier = TelegramNotifier::new(bot, &secrets.telegram_chat_id);

    let poller = Poller::new(
        Box::new(api),
        Box::new(notifier),
        Box::new(TokioSleeper),
        cfg.retry_period(),
    );
    let state = PollState::new(cfg.initial_cursor(chrono::Utc::now().timestamp()));
    poller.run(state).await;

    Ok(())
}
