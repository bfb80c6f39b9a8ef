//! Slash command parsing for the chat client.
//!
//! Input starting with `/` controls the client and is never sent to the
//! agent.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show the agent's full thinking process.
    Trace,

    /// Reprint the conversation so far.
    History,

    /// Show session details.
    Session,

    /// Fetch the agent's display name again.
    BotName,

    /// Toggle the streaming capability flag.
    Stream(bool),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent to the agent.
///
/// # Examples
///
/// ```
/// # use salesgpt_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/stream off").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "trace" | "thinking" => ChatCommand::Trace,
        "history" => ChatCommand::History,
        "session" | "stats" => ChatCommand::Session,
        "botname" => ChatCommand::BotName,
        "stream" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Stream(value),
            None => ChatCommand::Invalid("/stream expects 'on' or 'off'".to_string()),
        },
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /trace                 Show the agent's thinking process
  /history               Reprint the conversation
  /session               Show session details
  /botname               Fetch the agent's name again
  /stream on|off         Request streamed replies (not yet supported)
  /help                  Show this help message
  /quit                  Exit the chat"#
}
