//! Line-based prompts for the interactive steps (OTP entry, payment method,
//! picking a parent account).

use std::io::{self, BufRead, Write};

use anyhow::Context;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `label` and reads one trimmed line. End of input is an error.
    pub fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            anyhow::bail!("input closed while waiting for {label}");
        }
        Ok(line.trim().to_string())
    }

    /// Like [`Prompter::ask`], but returns `None` for an empty answer.
    pub fn ask_optional(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        let answer = self.ask(label)?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    /// Asks until the answer parses.
    pub fn ask_parsed<T>(&mut self, label: &str) -> anyhow::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        loop {
            let answer = self.ask(label)?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }

    /// Yes/no question; anything but `y`/`yes` is a no.
    pub fn confirm(&mut self, label: &str) -> anyhow::Result<bool> {
        let answer = self.ask(&format!("{label} [y/N]"))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Lists `options` numbered from 1 and returns the chosen index.
    pub fn choose(&mut self, label: &str, options: &[String]) -> anyhow::Result<usize> {
        if options.is_empty() {
            anyhow::bail!("nothing to choose from");
        }
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {option}", i + 1)?;
        }
        loop {
            let answer = self.ask(label)?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "Enter a number between 1 and {}", options.len())?,
            }
        }
    }

    pub fn say(&mut self, line: impl std::fmt::Display) -> anyhow::Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
