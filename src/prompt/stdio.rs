// file: src/prompt/stdio.rs
// version: 1.1.0
// guid: 9f3c7a05-d2e8-4b61-8a94-e1b06c5d2f7a

//! Interactive prompts on the terminal

use super::{parse_yes_no, Field, Prompter};
use crate::error::ProvisionError;
use crate::Result;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, BufReader, IsTerminal, Stderr, Stdin, Write};

/// Line-oriented prompter over any reader/writer pair
pub struct StdioPrompter<R, W> {
    reader: R,
    writer: W,
    /// Read secrets key by key in raw mode instead of as a line
    raw_secrets: bool,
}

impl StdioPrompter<BufReader<Stdin>, Stderr> {
    /// Prompter bound to the process's stdin, asking on stderr so stdout stays reserved for results
    pub fn from_terminal() -> Self {
        let stdin = io::stdin();
        let raw_secrets = stdin.is_terminal();
        Self {
            reader: BufReader::new(stdin),
            writer: io::stderr(),
            raw_secrets,
        }
    }
}

impl<R: BufRead, W: Write> StdioPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            raw_secrets: false,
        }
    }

    fn read_raw_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ProvisionError::prompt(
                "Input closed before all questions were answered",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&mut self, text: String) -> Result<()> {
        write!(self.writer, "{}", text)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompter for StdioPrompter<R, W> {
    fn ask(&mut self, field: Field, default: Option<&str>) -> Result<String> {
        let prompt = match default {
            Some(value) if !value.is_empty() => {
                format!("{} {}: ", field.question().bold(), format!("[{}]", value).dimmed())
            }
            _ => format!("{}: ", field.question().bold()),
        };
        self.show(prompt)?;

        let answer = self.read_raw_line()?.trim().to_string();
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn ask_secret(&mut self, field: Field) -> Result<String> {
        self.show(format!("{}: ", field.question().bold()))?;

        if self.raw_secrets {
            let secret = read_secret_raw()?;
            writeln!(self.writer)?;
            return Ok(secret);
        }
        self.read_raw_line()
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        self.show(format!("{} {} ", question.yellow().bold(), hint))?;

        let answer = self.read_raw_line()?;
        if answer.trim().is_empty() {
            return Ok(default);
        }
        parse_yes_no(&answer)
    }
}

/// Leaves raw mode when dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Read a secret without echo. Ctrl+C does not raise SIGINT in raw mode, so it
/// is reported as an interruption here.
fn read_secret_raw() -> Result<String> {
    let _guard = RawModeGuard::enable()?;
    let mut secret = String::new();

    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(ProvisionError::Interrupted);
                }
                KeyCode::Char(c) => secret.push(c),
                _ => {}
            }
        }
    }

    Ok(secret)
}
