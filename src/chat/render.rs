//! Output rendering for the chat client.
//!
//! Replies go to stdout; the thinking process is styled differently from the
//! conversation so the two read as separate panes.

use std::io::{self, Stdout, Write};

use crate::controller::{AgentReply, SessionSnapshot};
use crate::types::{Sender, TraceEntry, Turn};

/// ANSI escape code for dim text (used for the thinking process).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the agent's name).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for tool usage).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print the agent's reply to a user turn.
    fn print_reply(&mut self, reply: &AgentReply);

    /// Print the trace entry explaining one reply.
    fn print_trace_entry(&mut self, index: usize, entry: &TraceEntry);

    /// Print the whole thinking process.
    fn print_trace(&mut self, bot_name: &str, entries: &[TraceEntry]) {
        self.print_info(&format!("{} Thinking Process", display_name(bot_name)));
        if entries.is_empty() {
            self.print_info("  (nothing yet)");
        }
        for (k, entry) in entries.iter().enumerate() {
            self.print_trace_entry(k + 1, entry);
        }
    }

    /// Print the conversation so far.
    fn print_history(&mut self, bot_name: &str, turns: &[Turn]);

    /// Print session details.
    fn print_session(&mut self, snapshot: &SessionSnapshot);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn style(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("{code}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_reply(&mut self, reply: &AgentReply) {
        let label = self.style(
            ANSI_CYAN,
            &format!("{} ({})", display_name(&reply.bot_name), reply.index),
        );
        println!("{label}: {}", reply.turn.text);
        self.print_trace_entry(reply.index, &reply.trace);
    }

    fn print_trace_entry(&mut self, index: usize, entry: &TraceEntry) {
        for line in format_trace_entry(index, entry).lines() {
            let styled = if line.starts_with("Tool") || line.starts_with("Action") {
                self.style(ANSI_YELLOW, line)
            } else {
                self.style(ANSI_DIM, line)
            };
            println!("    {styled}");
        }
        self.flush();
    }

    fn print_history(&mut self, bot_name: &str, turns: &[Turn]) {
        let mut agent_index = 0;
        for turn in turns {
            match turn.sender {
                Sender::User => println!("{}: {}", self.style(ANSI_BOLD, "You"), turn.text),
                Sender::Agent => {
                    agent_index += 1;
                    let label = self.style(
                        ANSI_CYAN,
                        &format!("{} ({agent_index})", display_name(bot_name)),
                    );
                    println!("{label}: {}", turn.text);
                }
            }
        }
        self.flush();
    }

    fn print_session(&mut self, snapshot: &SessionSnapshot) {
        println!("    Session:");
        println!("      ID: {}", snapshot.session_id);
        println!("      Agent: {}", display_name(&snapshot.bot_name));
        println!(
            "      Model: {}",
            snapshot.model.as_deref().unwrap_or("(unknown)")
        );
        println!(
            "      Stage: {}",
            snapshot
                .conversational_stage
                .as_deref()
                .unwrap_or("(none yet)")
        );
        println!("      Turns: {}", snapshot.turns.len());
        println!("      Trace entries: {}", snapshot.trace.len());
        println!("      In flight: {}", snapshot.in_flight);
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("Error: {error}");
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }
}

/// Formats one trace entry, listing only the fields that are present.
pub fn format_trace_entry(index: usize, entry: &TraceEntry) -> String {
    let mut out = format!(
        "({index})\nConversational Stage: {}",
        entry.conversational_stage
    );
    let fields = [
        ("Tool", &entry.tool),
        ("Tool Input", &entry.tool_input),
        ("Action Input", &entry.action_input),
        ("Action Output", &entry.action_output),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("\n{label}: {value}"));
        }
    }
    out
}

fn display_name(bot_name: &str) -> &str {
    if bot_name.is_empty() { "Agent" } else { bot_name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.style(ANSI_DIM, "text"), "text");
    }

    #[test]
    fn trace_entry_without_tools() {
        assert_eq!(
            format_trace_entry(1, &TraceEntry::new("Introduction")),
            "(1)\nConversational Stage: Introduction"
        );
    }

    #[test]
    fn trace_entry_lists_present_fields_in_order() {
        let entry = TraceEntry::new("Solution presentation")
            .with_tool("ProductSearch")
            .with_tool_input("queen mattress")
            .with_action_output("Luxury Cloud-Comfort Memory Foam Mattress");
        assert_eq!(
            format_trace_entry(3, &entry),
            "(3)\nConversational Stage: Solution presentation\n\
             Tool: ProductSearch\n\
             Tool Input: queen mattress\n\
             Action Output: Luxury Cloud-Comfort Memory Foam Mattress"
        );
    }

    #[test]
    fn unknown_name_falls_back() {
        assert_eq!(display_name(""), "Agent");
        assert_eq!(display_name("Max"), "Max");
    }
}
