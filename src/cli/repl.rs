//! Interactive REPL for Datachat
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::cli::commands::{handle_command, CommandResult};
use crate::cli::render::format_answer;
use crate::cli::session::ChatSession;
use crate::core::{Config, Result, Role};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    session: ChatSession,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            session: ChatSession::new(config),
        }
    }

    /// Create a REPL over an existing session
    pub fn with_session(session: ChatSession) -> Self {
        Self { session }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        print!("Connecting to Gemini and the warehouse...");
        io::stdout().flush()?;

        // A failure here is reported once; questions then get the same error
        // until 'reconnect'
        match self.session.connect().await {
            Ok(()) => println!(" Ready!\n"),
            Err(e) => println!("\n\n{}\nType 'reconnect' after fixing the settings.\n", e),
        }

        for turn in self.session.conversation().turns() {
            if turn.role == Role::Assistant {
                println!("Assistant:\n{}\n", turn.content);
            }
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!();
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.session) {
                Ok(CommandResult::Exit) => break,
                Ok(CommandResult::Clear) => {
                    println!("Conversation cleared.\n");
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::Continue(question)) => match self.session.ask(&question).await {
                    Ok(answer) => println!("\nAssistant:\n{}\n", format_answer(&answer)),
                    Err(e) => eprintln!("\nError: {}\n", e),
                },
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        if !self.session.conversation().exchanges().is_empty() {
            match self.session.save(None) {
                Ok(path) => println!("Session saved to {}", path.display()),
                Err(e) => eprintln!("Failed to save session: {}", e),
            }
        }
        println!("Goodbye!");

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.session.config();

        println!();
        println!("Datachat - ask your SQL warehouse");
        println!("─────────────────────────────────────────");
        println!("Model:      {}", config.gemini.model);
        println!("Schema:     {}", config.warehouse.qualified_schema());
        println!();
        println!("Commands: help, sql, history, status, clear, exit");
        println!("─────────────────────────────────────────");
    }
}
