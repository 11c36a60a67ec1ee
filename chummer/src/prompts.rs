//! Line-oriented prompts on stdin/stdout.
//!
//! An empty line or end of input cancels, like closing a dialog.

use chummer_core::prompt::{ConfirmPrompt, NumberPrompt, NumberRequest, SavePrompt};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Answers prompts by asking on the terminal.
pub struct TerminalPrompt<R> {
    input: R,
}

impl TerminalPrompt<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> TerminalPrompt<R> {
    #[cfg(test)]
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        print!("{question} ");
        if let Err(e) = io::stdout().flush() {
            eprintln!("Error writing prompt: {e}");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()).filter(|l| !l.is_empty()),
            Err(e) => {
                eprintln!("Error reading input: {e}");
                None
            }
        }
    }
}

impl<R: BufRead> NumberPrompt for TerminalPrompt<R> {
    fn pick_number(&mut self, request: &NumberRequest) -> Option<f64> {
        let question = format!(
            "{} [{}-{}]:",
            request.description, request.minimum, request.maximum
        );
        loop {
            let answer = self.ask(&question)?;
            match answer.parse::<f64>() {
                Ok(value) => return Some(value),
                Err(_) => println!("[ERROR] Not a number: {answer}"),
            }
        }
    }
}

impl<R: BufRead> SavePrompt for TerminalPrompt<R> {
    fn pick_save_path(&mut self, suggested: &str) -> Option<PathBuf> {
        let answer = self.ask(&format!("Save as [{suggested}] (\".\" to accept):"))?;
        if answer == "." {
            Some(PathBuf::from(suggested))
        } else {
            Some(PathBuf::from(answer))
        }
    }
}

impl<R: BufRead> ConfirmPrompt for TerminalPrompt<R> {
    fn confirm(&mut self, message: &str, title: &str) -> bool {
        self.ask(&format!("{title}: {message} [y/N]"))
            .map(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }
}
