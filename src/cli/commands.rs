//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use std::path::Path;

use crate::agent::HandleState;
use crate::cli::render::format_sql_log;
use crate::cli::session::ChatSession;
use crate::core::{Result, Role};

/// Result of parsing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Continue processing as a question
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, session: &mut ChatSession) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    // Multi-word input is a question unless it starts with '/' or is a
    // well-formed 'set'
    if !args.is_empty() && !input.starts_with('/') && !is_set_command(&cmd, args) {
        return Ok(CommandResult::Continue(input.to_string()));
    }

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            session.clear();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "sql" => {
            let output = match session.conversation().last_answer() {
                Some(answer) => format_sql_log(&answer.sql_log),
                None => "No question has been answered yet.".to_string(),
            };
            Ok(CommandResult::Handled(output))
        }

        "history" => Ok(CommandResult::Handled(history_text(session))),

        "status" => Ok(CommandResult::Handled(status_text(session))),

        "reconnect" => {
            session.reconnect();
            Ok(CommandResult::Handled(
                "Agent will be rebuilt on the next question.".to_string(),
            ))
        }

        "save" => {
            let path = if args.is_empty() {
                None
            } else {
                Some(Path::new(args))
            };
            let saved = session.save(path)?;
            Ok(CommandResult::Handled(format!(
                "Session saved to {}",
                saved.display()
            )))
        }

        "set" => handle_set_command(args, session),

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Settings that 'set' can change
const SETTINGS: &[&str] = &["max_iterations", "top_k"];

fn is_set_command(cmd: &str, args: &str) -> bool {
    cmd == "set"
        && args
            .split_whitespace()
            .next()
            .is_some_and(|key| SETTINGS.contains(&key))
}

/// Handle 'set' subcommands
fn handle_set_command(args: &str, session: &mut ChatSession) -> Result<CommandResult> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();

    if parts.len() < 2 || parts[1].trim().is_empty() {
        return Ok(CommandResult::Handled(
            "Usage: set <max_iterations|top_k> <value>\n\
             Examples:\n\
               set max_iterations 20\n\
               set top_k 5\n\
             Changes apply after 'reconnect'."
                .to_string(),
        ));
    }

    let value: usize = match parts[1].trim().parse() {
        Ok(v) => v,
        Err(_) => {
            return Ok(CommandResult::Handled(format!(
                "Not a number: {}",
                parts[1].trim()
            )))
        }
    };

    let config = session.config_mut();
    match parts[0] {
        "max_iterations" => config.agent.max_iterations = value,
        "top_k" => config.agent.top_k = value,
        other => {
            return Ok(CommandResult::Handled(format!(
                "Unknown setting: {}",
                other
            )))
        }
    }

    Ok(CommandResult::Handled(format!(
        "{} set to {}. Type 'reconnect' to apply.",
        parts[0], value
    )))
}

fn history_text(session: &ChatSession) -> String {
    session
        .conversation()
        .turns()
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "You",
                Role::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_text(session: &ChatSession) -> String {
    let config = session.config();
    let agent = match session.agent_state() {
        HandleState::NotInitialized => "not connected".to_string(),
        HandleState::Available => "ready".to_string(),
        HandleState::Unavailable(reason) => format!("unavailable ({})", reason),
    };

    format!(
        "Datachat Status:\n\
         ─────────────────────────────\n\
         Agent:      {}\n\
         Model:      {}\n\
         Schema:     {}\n\
         Warehouse:  {}\n\
         History:    {} turns, {} SQL statements\n\
         Session:    {}\n\
         Debug:      {}",
        agent,
        config.gemini.model,
        config.warehouse.qualified_schema(),
        config.warehouse.warehouse_id(),
        session.conversation().len(),
        session.conversation().sql_count(),
        session.session_path().display(),
        if config.agent.debug { "on" } else { "off" }
    )
}

fn help_text() -> String {
    "Ask any question about the data, or use a command:\n\
     \n\
     help            Show this help\n\
     sql             Show the SQL behind the last answer\n\
     history         Show the conversation so far\n\
     status          Show agent and warehouse settings\n\
     clear           Start a new conversation\n\
     save            Save the session transcript\n\
     /save <path>    Save the transcript to a file\n\
     set <key> <n>   Change max_iterations or top_k\n\
     reconnect       Rebuild the agent\n\
     exit            Quit"
        .to_string()
}
