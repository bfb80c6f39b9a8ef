//! Interactive terminal client for a SalesGPT agent service.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local development server
//! salesgpt-chat
//!
//! # Point at another deployment
//! salesgpt-chat --api-url https://agent.example.com
//!
//! # Production profile (reads $SALESGPT_AUTH_KEY)
//! salesgpt-chat --production
//! ```
//!
//! Settings are read from the environment, and from a `.env` file in the
//! working directory when one exists.  Log verbosity follows `RUST_LOG`.
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/trace` - Show the agent's thinking process
//! - `/history` - Reprint the conversation
//! - `/session` - Show session details
//! - `/botname` - Fetch the agent's name again
//! - `/stream on|off` - Toggle streamed replies
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use salesgpt_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
};
use salesgpt_chat::{
    AgentClient, AnalyticsEmitter, ChatTransport, DeploymentConfig, DispatchOutcome,
    SessionController, analytics_for,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("salesgpt-chat [OPTIONS]");
    let config = ChatConfig::resolve(args, DeploymentConfig::from_env()?)?;

    let client = AgentClient::new(config.deployment.clone())?;
    let analytics = analytics_for(&config.deployment)?;
    let controller = SessionController::new(client, analytics, &config.deployment);
    controller.set_stream(config.stream);

    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    let greeting = match controller.mount().await {
        Some(name) => format!("Chat with {name} ({})", config.deployment.api_url),
        None => format!("Chat ({})", config.deployment.api_url),
    };
    println!("{greeting}");
    println!("Session {}", controller.session_id());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    if !run_command(cmd, &controller, &mut renderer).await {
                        break;
                    }
                    continue;
                }

                let pending = controller.submit(line);
                if controller.is_typing() {
                    renderer.print_info(&format!("{} is typing...", agent_label(&controller)));
                }
                match pending.await {
                    Ok(DispatchOutcome::Replied(reply)) => renderer.print_reply(&reply),
                    Ok(DispatchOutcome::Skipped) => {}
                    Err(err) => {
                        renderer.print_error(&err.to_string());
                        if err.is_retryable() {
                            renderer.print_info("The agent may be busy; send the message again to retry.");
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Runs one slash command.  Returns false when the client should exit.
async fn run_command<T: ChatTransport, A: AnalyticsEmitter>(
    cmd: ChatCommand,
    controller: &SessionController<T, A>,
    renderer: &mut PlainTextRenderer,
) -> bool {
    match cmd {
        ChatCommand::Quit => {
            println!("Goodbye!");
            return false;
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::Trace => {
            renderer.print_trace(&controller.bot_name(), &controller.trace().all());
        }
        ChatCommand::History => {
            renderer.print_history(&controller.bot_name(), &controller.conversation().all());
        }
        ChatCommand::Session => {
            renderer.print_session(&controller.snapshot());
        }
        ChatCommand::BotName => match controller.fetch_bot_name().await {
            Ok(name) => renderer.print_info(&format!("Agent name: {name}")),
            Err(err) => renderer.print_error(&format!("Failed to fetch the bot name: {err}")),
        },
        ChatCommand::Stream(stream) => {
            controller.set_stream(stream);
            if stream {
                renderer.print_info("Streamed replies requested (not yet supported).");
            } else {
                renderer.print_info("Streamed replies disabled.");
            }
        }
        ChatCommand::Invalid(message) => {
            renderer.print_error(&message);
        }
    }
    true
}

fn agent_label<T: ChatTransport, A: AnalyticsEmitter>(
    controller: &SessionController<T, A>,
) -> String {
    let name = controller.bot_name();
    if name.is_empty() {
        "Agent".to_string()
    } else {
        name
    }
}
