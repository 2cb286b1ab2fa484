//! Terminal quiz presenter.
//!
//! Renders one quiz at a time in the terminal and collects a single answer
//! within a fixed display window; running out of the window counts as a
//! dismissal, matching the overlay's auto-close behavior.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use hangtube_core::{Presenter, PresenterOutcome, QuizItem};

pub struct TerminalPresenter {
    display_window: Duration,
    lines: Receiver<String>,
}

impl TerminalPresenter {
    pub fn new(display_window: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        // Stdin reads block; a dedicated reader thread lets `present` apply
        // the display window with recv_timeout.
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        Self {
            display_window,
            lines: rx,
        }
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, item: &QuizItem) -> PresenterOutcome {
        println!();
        println!("=== {} ===", item.title);
        println!("{}", item.prompt);
        for (i, choice) in item.choices.iter().enumerate() {
            println!("  {}) {}", choice_letter(i), choice);
        }
        println!(
            "answer with a letter, or press Enter to dismiss ({}s window)",
            self.display_window.as_secs()
        );

        let deadline = Instant::now() + self.display_window;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                println!("(time's up)");
                return PresenterOutcome::Dismissed;
            }
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        return PresenterOutcome::Dismissed;
                    }
                    match parse_choice(input, item.choices.len()) {
                        Some(idx) => return PresenterOutcome::Answered(idx),
                        None => println!(
                            "unrecognized answer '{input}', use A-{}",
                            choice_letter(item.choices.len() - 1)
                        ),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    println!("(time's up)");
                    return PresenterOutcome::Dismissed;
                }
                Err(RecvTimeoutError::Disconnected) => return PresenterOutcome::Dismissed,
            }
        }
    }
}

fn choice_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Accepts a choice letter (`A`/`b`) or a 1-based number.
fn parse_choice(input: &str, choice_count: usize) -> Option<usize> {
    let mut chars = input.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_uppercase() {
            let idx = (c as u8 - b'A') as usize;
            if idx < choice_count {
                return Some(idx);
            }
            return None;
        }
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=choice_count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_in_both_cases() {
        assert_eq!(parse_choice("A", 3), Some(0));
        assert_eq!(parse_choice("b", 3), Some(1));
        assert_eq!(parse_choice("C", 3), Some(2));
    }

    #[test]
    fn parses_one_based_numbers() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice("3", 3), Some(2));
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert_eq!(parse_choice("D", 3), None);
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("maybe", 3), None);
    }
}
