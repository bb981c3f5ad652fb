use std::io;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use errand::dialogue::{DialogueLoop, LoopConfig};
use errand::providers::{OpenAiChat, OpenAiConfig};
use errand::session::SessionDriver;
use errand::todoist::TodoistClient;
use errand::{ConsoleCapture, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("errand=info")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    tracing::info!(model = %settings.model, mode = ?settings.history, "starting session");

    let chat = Arc::new(OpenAiChat::new(
        OpenAiConfig::new(settings.openai_api_key.clone(), settings.model.clone())
            .with_base_url(settings.openai_base_url.clone()),
    ));
    let tasks = Arc::new(TodoistClient::new(
        settings.todoist_base_url.clone(),
        settings.todoist_api_token.clone(),
    ));

    let config = LoopConfig::new()
        .with_mode(settings.history)
        .with_max_rounds(settings.max_rounds)
        .with_system_prompt(settings.system_prompt.clone());
    let dialogue = DialogueLoop::new(config, chat, tasks);

    let driver = SessionDriver::new(dialogue);
    let mut source = ConsoleCapture::default();
    let mut stdout = io::stdout();
    driver
        .run(&mut source, &mut stdout)
        .await
        .context("session failed")?;

    Ok(())
}
