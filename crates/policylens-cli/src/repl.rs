//! Interactive question session.

use crate::commands::ask::answer_once;
use crate::commands::OllamaEngine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// REPL input kind.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Exit,
    Help,
    ToggleAssess,
    Question(&'a str),
}

fn parse_input(line: &str) -> ReplInput<'_> {
    match line {
        "exit" | "quit" | "q" | "退出" => ReplInput::Exit,
        "help" | "?" => ReplInput::Help,
        ":assess" => ReplInput::ToggleAssess,
        question => ReplInput::Question(question),
    }
}

/// Run the interactive session.
pub async fn run_repl(engine: &OllamaEngine, assess: bool, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.info("PolicyLens - ask a policy question, 'help' for commands, 'exit' to quit"));
    println!();

    let mut editor = DefaultEditor::new().map_err(|e| {
        CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e)))
    })?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut assess = assess;

    loop {
        match editor.readline("policylens> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();

                match parse_input(line) {
                    ReplInput::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplInput::Help => print_help(formatter),
                    ReplInput::ToggleAssess => {
                        assess = !assess;
                        let state = if assess { "on" } else { "off" };
                        println!("{}", formatter.info(&format!("Trust scoring {}", state)));
                    }
                    ReplInput::Question(question) => {
                        if let Err(e) = answer_once(engine, question, assess, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                        println!();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();
    Ok(())
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Commands:"));
    println!("  <question>   Answer a policy question");
    println!("  :assess      Toggle trust scoring of answers");
    println!("  help, ?      Show this help");
    println!("  exit, quit   Leave the session");
}

fn get_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    let dir = home.join(".policylens");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}
