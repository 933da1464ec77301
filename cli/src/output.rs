use colored::*;
use surveyor_core::{Interest, Message, Role, Session, SessionId};

pub const PRIVACY_NOTICE: &str = "We store your prompt, messages, interests, and consent locally for \
session continuity. You can reset anytime to delete your data. No data is shared externally.";

pub const CONSENT_QUESTION: &str = "Do you consent and want to start the session?";

pub const PAUSED_WARNING: &str =
    "This session is currently paused. Please resume it before sending messages.";

const BAR_WIDTH: usize = 20;

/// Sidebar listing of all sessions, marking the active one
pub fn render_sessions(sessions: &[Session], active: Option<&SessionId>) -> String {
    if sessions.is_empty() {
        return format!("{}\n", "No sessions yet. Start one with /new <prompt>.".italic());
    }

    let mut output = String::new();
    for session in sessions {
        let marker = if Some(&session.id) == active { "▶" } else { " " };
        let title = format!("Session #{}", session.id);
        output.push_str(&format!("{} {}", marker.green(), title.bold()));
        if session.paused {
            output.push_str(&format!("  {}", "⏸ Paused".yellow()));
        }
        output.push('\n');
        if !session.prompt.is_empty() {
            output.push_str(&format!("    {}\n", session.prompt.dimmed()));
        }
    }
    output
}

pub fn render_message(message: &Message) -> String {
    match message.role {
        Role::User => format!("{}: {}", "You".green().bold(), message.content),
        Role::Agent => format!("{}: {}", "Agent".blue().bold(), message.content),
    }
}

pub fn render_transcript(messages: &[Message]) -> String {
    let mut output = String::new();
    for message in messages {
        output.push_str(&render_message(message));
        output.push('\n');
    }
    output
}

fn confidence_bar(percent: u8) -> String {
    let filled = (usize::from(percent) * BAR_WIDTH + 50) / 100;
    format!(
        "{}{}",
        "█".repeat(filled).purple(),
        "░".repeat(BAR_WIDTH - filled).dimmed()
    )
}

/// Ranked interest cards
pub fn render_interests(interests: &[Interest]) -> String {
    if interests.is_empty() {
        return format!("{}\n", "No interests detected yet...".italic().dimmed());
    }

    let mut output = String::new();
    for (rank, interest) in interests.iter().enumerate() {
        let percent = interest.confidence_percent();
        output.push_str(&format!(
            "{}. {} {}\n",
            rank + 1,
            interest.name.bold(),
            format!("{}%", percent).purple().bold()
        ));
        output.push_str(&format!("   {}\n", confidence_bar(percent)));
        if !interest.rationale.is_empty() {
            output.push_str(&format!("   {}\n", interest.rationale));
        }
    }
    output
}

/// One-line summary printed when a poll brings in a new ranking
pub fn render_interest_notice(interests: &[Interest]) -> String {
    if interests.is_empty() {
        return format!("{}", "[interests] none detected yet".dimmed());
    }
    let top: Vec<String> = interests
        .iter()
        .take(3)
        .map(|i| format!("{} ({}%)", i.name, i.confidence_percent()))
        .collect();
    format!("{} {}", "[interests]".cyan(), top.join(", "))
}

pub fn print_privacy_notice() {
    println!();
    println!("{}", "Privacy Notice".bold());
    println!("{}", PRIVACY_NOTICE);
    println!();
}

pub fn print_paused_warning() {
    println!("{} {}", "⚠".yellow(), PAUSED_WARNING.yellow());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Commands understood by the interactive session
pub fn print_help() {
    println!("{}", "Commands:".cyan());
    println!("  {}  start a new session (asks for consent)", "/new <prompt>".green());
    println!("  {}          confirm a pending session start", "/consent".green());
    println!("  {}         list sessions", "/sessions".green());
    println!("  {}      switch to a session", "/select <id>".green());
    println!("  {}            pause or resume the active session", "/pause".green());
    println!("  {}            delete the active session", "/reset".green());
    println!("  {}        show the ranked interests", "/interests".green());
    println!("  {}          show the transcript", "/history".green());
    println!("  {}             leave", "/quit".green());
    println!("Anything else is sent to the agent.");
    println!();
}
