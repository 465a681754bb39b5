//! Interactive prompts for values missing from the command line

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Line-based question/answer session over any reader and writer
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Asks a question and returns the trimmed answer
    ///
    /// End of input is reported as [`io::ErrorKind::UnexpectedEof`] so that
    /// retry loops cannot spin forever on a closed stdin.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.writer, "{}", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Asks until a non-empty answer is given
    pub fn ask_required(&mut self, question: &str) -> io::Result<String> {
        loop {
            let answer = self.ask(question)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.writer, "{}", "A value is required.".yellow())?;
        }
    }

    /// Asks a yes/no question, repeating until one of `yes`, `y`, `no`, `n`
    pub fn ask_yes_no(&mut self, question: &str) -> io::Result<bool> {
        loop {
            match self.ask(&format!("{} (yes/no): ", question))?.to_lowercase().as_str() {
                "yes" | "y" => return Ok(true),
                "no" | "n" => return Ok(false),
                _ => writeln!(self.writer, "Invalid input. Please enter 'yes' or 'no'.")?,
            }
        }
    }

    /// Asks for the path of an existing file, repeating until one is given
    pub fn ask_existing_file(&mut self, question: &str) -> io::Result<PathBuf> {
        loop {
            let path = PathBuf::from(self.ask(question)?);
            if path.is_file() {
                return Ok(path);
            }
            writeln!(
                self.writer,
                "{}",
                format!(
                    "Error: File not found at '{}'. Please check the path and try again.",
                    path.display()
                )
                .red()
            )?;
        }
    }

    /// Asks for a file name, falling back to `default` on a blank answer
    pub fn ask_with_default(&mut self, question: &str, default: &str) -> io::Result<String> {
        let answer = self.ask(&format!("{} (leave blank for default: '{}'): ", question, default))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }
}
