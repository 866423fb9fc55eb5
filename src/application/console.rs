#[cfg(test)]
#[path = "console_test.rs"]
mod tests;

use std::io;
use std::io::BufRead;
use std::io::Write;

use anyhow::Result;
use yansi::Paint;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// `0`, or the input was closed.
    Cancel,
    /// Zero-based index of the picked entry.
    Index(usize),
    /// Input was not a listed number. The reason has already been printed.
    Invalid,
}

/// Line based prompts over any reader and writer pair.
pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Console<io::StdinLock<'static>, io::Stdout> {
        return Console::new(io::stdin().lock(), io::stdout());
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Console<R, W> {
        return Console { reader, writer };
    }

    pub fn writer(&self) -> &W {
        return &self.writer;
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{text}")?;
        return Ok(());
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", Paint::red(text))?;
        return Ok(());
    }

    /// Prints `prompt` and reads a single line without its line ending.
    /// Returns `None` once the input is closed.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if !prompt.is_empty() {
            write!(self.writer, "{prompt}")?;
        }
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        return Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()));
    }

    /// Asks for a number between 0 and `len`, where 0 cancels.
    pub fn choose(&mut self, prompt: &str, len: usize) -> Result<Choice> {
        let line = match self.read_line(prompt)? {
            Some(line) => line,
            None => return Ok(Choice::Cancel),
        };

        let number = match line.trim().parse::<usize>() {
            Ok(number) => number,
            Err(_) => {
                self.error("Invalid input. Please enter a number.")?;
                return Ok(Choice::Invalid);
            }
        };

        if number == 0 {
            return Ok(Choice::Cancel);
        }
        if number > len {
            self.error("Invalid selection.")?;
            return Ok(Choice::Invalid);
        }

        return Ok(Choice::Index(number - 1));
    }
}
