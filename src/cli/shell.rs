use std::io::Write;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::{Command, ViewState, execute};
use crate::error::AppError;
use crate::models::{AuthMode, ViewTree};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "shell", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

pub fn view_label(view: ViewTree) -> &'static str {
    match view {
        ViewTree::Login(AuthMode::Login) => "login",
        ViewTree::Login(AuthMode::Signup) => "signup",
        ViewTree::Admin => "admin",
        ViewTree::User => "user",
        ViewTree::Blank => "session",
    }
}

/// Parses one shell line into a command, or the text clap wants shown.
pub fn parse_line(line: &str) -> Result<Command, String> {
    ShellLine::try_parse_from(line.split_whitespace())
        .map(|parsed| parsed.command)
        .map_err(|e| e.to_string())
}

pub async fn run(state: &AppState) -> Result<(), AppError> {
    let mut view = ViewState::default();

    if let Some(id) = state.auth.stored_user().await? {
        println!("Stored user id {} found. Log in to continue.", id);
    }
    println!("Type `help` for commands, `quit` to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", view_label(view.view()));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let command = match parse_line(line) {
            Ok(command) => command,
            Err(text) => {
                println!("{}", text.trim_end());
                continue;
            }
        };

        let current = view.view();
        if !command.allowed_in(current) {
            println!("That command is not available in the {} view.", view_label(current));
            continue;
        }

        debug!("shell command: {:?}", command);
        match execute(state, &mut view, command, false).await {
            Ok(out) if out.is_empty() => {}
            Ok(out) => println!("{}", out),
            Err(e) => println!("[error] {}", e.user_message()),
        }
    }

    Ok(())
}
