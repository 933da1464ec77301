use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use surveyor_core::SessionId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use crate::controller::{PauseOutcome, ResetOutcome, SendOutcome, SessionController};
use crate::gate::{Confirmer, ConsentGate};
use crate::output::{
    print_error, print_help, print_paused_warning, print_privacy_notice, print_warning,
    render_interest_notice, render_interests, render_message, render_sessions, render_transcript,
    CONSENT_QUESTION,
};

/// One line of user input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New(String),
    Consent,
    Sessions,
    Select(SessionId),
    Pause,
    Reset,
    Interests,
    History,
    Help,
    Quit,
    Send(String),
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with('/') {
            return Command::Send(line.to_string());
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        match name {
            "/new" => Command::New(rest.to_string()),
            "/consent" => Command::Consent,
            "/sessions" => Command::Sessions,
            "/select" if !rest.is_empty() => Command::Select(SessionId::from(rest)),
            "/pause" | "/resume" => Command::Pause,
            "/reset" => Command::Reset,
            "/interests" => Command::Interests,
            "/history" => Command::History,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Asks yes/no questions on the terminal
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, question: &str) -> bool {
        let question = question.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(question)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                error!(error = %e, "Could not read confirmation, treating as no");
                false
            }
            Err(e) => {
                error!(error = %e, "Confirmation prompt failed, treating as no");
                false
            }
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_input_prompt() -> Result<()> {
    print!("{} ", ">".green().bold());
    io::stdout().flush().context("Failed to flush stdout")
}

/// Prints the session index once and returns
pub async fn run_list_sessions(controller: &SessionController) {
    controller.list_sessions().await;
    let view = controller.view().await;
    print!("{}", render_sessions(&controller.sessions().await, view.active_id.as_ref()));
}

/// Runs the interactive session loop until the user quits or stdin closes
pub async fn run_interactive(controller: &mut SessionController) -> Result<()> {
    let confirmer = TerminalConfirmer;
    let mut consent = ConsentGate::new();
    let mut interests_rx = controller.subscribe_interests();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", "Interest survey client. Type /help for commands.".bold());
    run_list_sessions(controller).await;

    loop {
        print_input_prompt()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                let command = Command::parse(&line);
                debug!(?command, "Handling command");
                if command == Command::Quit {
                    break;
                }
                handle_command(controller, &mut consent, &confirmer, command).await;
            }
            changed = interests_rx.changed() => {
                if changed.is_err() {
                    continue;
                }
                let view = controller.view().await;
                println!();
                println!("{}", render_interest_notice(&view.interests));
            }
        }
    }

    controller.shutdown();
    info!("Interactive session finished");
    Ok(())
}

async fn handle_command(
    controller: &mut SessionController,
    consent: &mut ConsentGate,
    confirmer: &TerminalConfirmer,
    command: Command,
) {
    match command {
        Command::New(prompt) => {
            if !consent.request_start(&prompt) {
                print_warning("Enter a prompt to start a session: /new <prompt>");
                return;
            }
            print_privacy_notice();
            if confirmer.confirm(CONSENT_QUESTION).await {
                confirm_consent(controller, consent).await;
            } else if let Some(prompt) = consent.pending_prompt() {
                println!(
                    "Session for \"{}\" not started yet. Type /consent when you are ready.",
                    prompt
                );
            }
        }
        Command::Consent => {
            if consent.is_pending() {
                confirm_consent(controller, consent).await;
            } else {
                print_warning("Nothing is waiting for consent. Use /new <prompt> first.");
            }
        }
        Command::Sessions => run_list_sessions(controller).await,
        Command::Select(id) => match controller.select_session(id.clone()).await {
            Ok(()) => {
                let view = controller.view().await;
                println!("Switched to session #{}", id);
                print!("{}", render_transcript(&view.transcript));
                if view.paused {
                    print_warning("This session is paused. Use /pause to resume it.");
                }
            }
            Err(e) => print_error(&format!("Could not load session #{}: {}", id, e)),
        },
        Command::Pause => match controller.toggle_pause().await {
            Ok(PauseOutcome::Paused) => println!("{}", "Session paused.".yellow()),
            Ok(PauseOutcome::Resumed) => println!("{}", "Session resumed.".green()),
            Ok(PauseOutcome::Ignored) => print_warning("No active session."),
            Err(e) => print_error(&format!("Could not change pause state: {}", e)),
        },
        Command::Reset => match controller.reset_session(confirmer).await {
            Ok(ResetOutcome::Reset(id)) => {
                println!("Session #{} deleted. Start a new one with /new <prompt>.", id)
            }
            Ok(ResetOutcome::Declined) => println!("Reset cancelled."),
            Ok(ResetOutcome::Ignored) => print_warning("No active session."),
            Err(e) => print_error(&format!("Could not reset session: {}", e)),
        },
        Command::Interests => {
            let view = controller.view().await;
            print!("{}", render_interests(&view.interests));
        }
        Command::History => {
            let view = controller.view().await;
            print!("{}", render_transcript(&view.transcript));
        }
        Command::Help => print_help(),
        Command::Send(text) => send(controller, &text).await,
        Command::Unknown(line) => print_warning(&format!("Unknown command: {}", line)),
        Command::Empty | Command::Quit => {}
    }
}

async fn confirm_consent(controller: &mut SessionController, consent: &mut ConsentGate) {
    let progress = spinner("Starting session...");
    let result = consent.confirm(controller).await;
    progress.finish_and_clear();

    match result {
        Ok(Some(id)) => {
            let view = controller.view().await;
            println!("Started session #{}", id);
            print!("{}", render_transcript(&view.transcript));
        }
        Ok(None) => {}
        Err(e) => print_error(&format!("Could not start session: {}", e)),
    }
}

async fn send(controller: &SessionController, text: &str) {
    if controller.view().await.paused {
        print_paused_warning();
        return;
    }

    let progress = spinner("Waiting for the agent...");
    let result = controller.send_message(text).await;
    progress.finish_and_clear();

    match result {
        Ok(SendOutcome::Delivered(reply)) => println!("{}", render_message(&reply)),
        Ok(SendOutcome::RejectedPaused) => print_paused_warning(),
        Ok(SendOutcome::Ignored) => print_warning("No active session. Use /new or /select first."),
        Err(e) => print_error(&format!("The agent did not respond: {}", e)),
    }
}
