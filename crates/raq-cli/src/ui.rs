//! Terminal UI utilities

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, IsTerminal, Write};

use raq_core::{Result, SearchStrategy};
use raq_router::RoutedResponse;

const PROMPT: &str = "raq>";

/// Display the startup banner
pub fn display_banner() {
    println!();
    println!("{}", "raq — retrieval-augmented querying".blue().bold());
    println!("{}", "Ask in natural language; queries are routed to the".dimmed());
    println!("{}", "best retrieval strategy and answered from your corpus.".dimmed());
    println!();
    println!(
        "{}",
        "Type a question, 'help' for commands, or 'exit' to leave".dimmed()
    );
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask anything; the router picks a strategy", "query".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  what is reciprocal rank fusion");
    println!("  who owns the subsidiaries of Acme");
    println!("  explain how Acme and Initech are connected");
}

fn redraw(input: &str) -> io::Result<()> {
    // overwrite the previous line, padding to clear stale characters
    print!("\r{} {}{}", PROMPT.green().bold(), input, " ".repeat(8));
    print!("\r{} {}", PROMPT.green().bold(), input);
    io::stdout().flush()
}

/// Read one line of input with ↑/↓ history navigation.
///
/// Falls back to plain line reading when stdin is piped. Esc clears the
/// current line and returns empty.
pub fn read_input(history: &mut Vec<String>) -> Result<String> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    redraw(&input)?;
                }
                KeyCode::Backspace => {
                    input.pop();
                    redraw(&input)?;
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let next = match history_index {
                            None => history.len() - 1,
                            Some(i) if i > 0 => i - 1,
                            Some(i) => i,
                        };
                        history_index = Some(next);
                        input = history[next].clone();
                        redraw(&input)?;
                    }
                }
                KeyCode::Down => {
                    if let Some(i) = history_index {
                        if i + 1 < history.len() {
                            history_index = Some(i + 1);
                            input = history[i + 1].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        redraw(&input)?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

fn strategy_badge(strategy: SearchStrategy) -> ColoredString {
    match strategy {
        SearchStrategy::Vector => strategy.as_str().blue(),
        SearchStrategy::KnowledgeGraph => strategy.as_str().magenta(),
        SearchStrategy::Hybrid => strategy.as_str().cyan(),
        SearchStrategy::General => strategy.as_str().green(),
    }
}

/// Render one routed answer
pub fn print_response(response: &RoutedResponse, show_sources: bool) {
    print!(
        "{} {} (confidence {:.2}",
        "strategy:".dimmed(),
        strategy_badge(response.strategy),
        response.confidence
    );
    if response.method.is_fallback() {
        print!(", {}", "keyword fallback".yellow());
    }
    println!(")");

    if response.retrieval_exhausted {
        println!(
            "{}",
            "note: the search backend was unreachable; this answer has no retrieved context"
                .yellow()
        );
    }

    println!();
    println!("{}", response.answer);

    if show_sources && !response.documents.is_empty() {
        println!();
        println!("{}", "Sources:".bold());
        for result in &response.documents {
            println!(
                "  {} {} {}",
                format!("{}.", result.rank + 1).dimmed(),
                result.document.source,
                format!("(score {:.4})", result.score).dimmed()
            );
        }
    }
    println!();
}
