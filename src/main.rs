use std::sync::Arc;

use clap::{Arg, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use famulus::chat_client::ChatClient;
use famulus::command_advisor::{CommandAdvisor, LlmAdvisor, MockAdvisor};
use famulus::config::Config;
use famulus::http_client::ReqwestHttpClient;
use famulus::task_runner::TaskRunner;

/// Debug mode keeps the full subscriber format; normal mode prints bare
/// messages so the session reads like a conversation. `RUST_LOG` overrides
/// both.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if debug {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .without_time()
            .with_target(false)
            .with_level(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("fam")
        .about("LLM shell helper - describe the task, confirm the commands")
        .long_about(
            "fam turns plain-language tasks into shell commands: it gathers context, \
             asks a model what to run, and executes each command after confirmation",
        )
        .arg(
            Arg::new("task")
                .help("The task to perform; leave empty for an interactive session")
                .num_args(1..),
        )
        .arg(
            Arg::new("trust")
                .long("trust")
                .help("Execute commands without asking for confirmation")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable verbose diagnostic logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("set-api-key")
                .long("set-api-key")
                .help("Set the OpenAI API key")
                .value_name("API_KEY")
                .num_args(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Show configuration information")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    init_tracing(matches.get_flag("debug"));

    // Handle configuration commands
    if let Some(api_key) = matches.get_one::<String>("set-api-key") {
        let mut config = Config::load()?;
        config.set_api_key(api_key.clone())?;
        println!("✅ API key saved successfully");
        return Ok(());
    }

    if matches.get_flag("config") {
        Config::show_config_info()?;
        return Ok(());
    }

    let config = Config::load()?;
    let trust_mode = matches.get_flag("trust");

    let advisor: Box<dyn CommandAdvisor> = if config.is_mock_mode() {
        info!("Using mock advisor (FAMULUS_USE_MOCK=1)");
        Box::new(MockAdvisor::new())
    } else {
        let chat = ChatClient::from_config(Arc::new(ReqwestHttpClient::new()?), &config)?;
        Box::new(LlmAdvisor::new(chat))
    };

    let mut runner = TaskRunner::new(advisor, trust_mode, config.max_retries);

    let task_words: Vec<String> = matches
        .get_many::<String>("task")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    if task_words.is_empty() {
        runner.run_interactive().await?;
    } else {
        let task = task_words.join(" ");
        info!("Processing task: {}", task);
        let done = runner.process_task(&task).await?;
        if !done {
            std::process::exit(1);
        }
    }

    Ok(())
}
