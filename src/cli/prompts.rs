//! Interactive prompts
//!
//! Every question either utility asks goes through [`Prompter`]. It owns the
//! coercion and re-prompt loops; the actual terminal I/O sits behind
//! [`LineSource`] so that piped input and tests share the same code path as a
//! real terminal session.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input};
use thiserror::Error;

use crate::utils::WARN;

/// Failures that re-prompting cannot recover from
#[derive(Debug, Error)]
pub enum PromptError {
    /// Input stream ended before an answer was given
    #[error("input closed before an answer was given")]
    Closed,

    /// User pressed Ctrl+C while a prompt was active
    #[error("interrupted by user")]
    Interrupted,

    /// A menu was requested with nothing to pick from
    #[error("no options available for '{0}'")]
    NoOptions(String),

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Line-oriented input/output used by [`Prompter`]
pub trait LineSource {
    /// Display one line of text to the user
    fn show(&mut self, line: &str) -> Result<(), PromptError>;

    /// Display `prompt` and read one line of input (without the trailing newline)
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn show(&mut self, line: &str) -> Result<(), PromptError> {
        (**self).show(line)
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        (**self).read_line(prompt)
    }
}

/// Interactive terminal input built on dialoguer
pub struct TermSource {
    term: Term,
    theme: ColorfulTheme,
}

impl TermSource {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TermSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for TermSource {
    fn show(&mut self, line: &str) -> Result<(), PromptError> {
        self.term.write_line(line)?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(&self.term)
            .map_err(|err| match err {
                dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
                    PromptError::Interrupted
                }
                dialoguer::Error::IO(e) => PromptError::Io(e),
                #[allow(unreachable_patterns)]
                other => PromptError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
            })
    }
}

/// Plain line reader for piped stdin and scripted sessions
pub struct StdioSource<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StdioSource<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Everything written so far
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> LineSource for StdioSource<R, W> {
    fn show(&mut self, line: &str) -> Result<(), PromptError> {
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.writer, "{}: ", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Pick the terminal prompt when attached to one, plain stdio otherwise
pub fn open_source() -> Box<dyn LineSource> {
    use std::io::IsTerminal;

    if io::stdin().is_terminal() && Term::stderr().is_term() {
        Box::new(TermSource::new())
    } else {
        Box::new(StdioSource::new(io::stdin().lock(), io::stdout()))
    }
}

/// Prompt engine: typed questions, numbered menus, and yes/no confirmations
pub struct Prompter<S> {
    source: S,
}

impl<S: LineSource> Prompter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Show an informational line through the same channel as the prompts
    pub fn say(&mut self, line: &str) -> Result<(), PromptError> {
        self.source.show(line)
    }

    /// Ask for a value of type `T`.
    ///
    /// Empty input returns `default` when one is given. Input that does not
    /// parse as `T` is reported and the question is asked again until it does.
    pub fn ask<T>(&mut self, text: &str, default: Option<T>) -> Result<T, PromptError>
    where
        T: FromStr + Display,
    {
        let full_prompt = match &default {
            Some(value) => format!("{} (default: {})", text, value),
            None => text.to_string(),
        };
        let mut default = default;

        loop {
            let raw = self.source.read_line(&full_prompt)?;
            let answer = raw.trim();

            if answer.is_empty() {
                if let Some(value) = default.take() {
                    return Ok(value);
                }
            }

            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => {
                    let warning = format!(
                        "{}Invalid input, please enter a {} value",
                        WARN,
                        type_label::<T>()
                    );
                    self.source.show(&style(warning).yellow().to_string())?;
                }
            }
        }
    }

    /// Ask for free text with a default
    pub fn ask_text(&mut self, text: &str, default: &str) -> Result<String, PromptError> {
        self.ask(text, Some(default.to_string()))
    }

    /// Ask for a filesystem path; a leading `~` expands to the home directory
    pub fn ask_path(&mut self, text: &str, default: Option<&str>) -> Result<PathBuf, PromptError> {
        let raw: String = self.ask(text, default.map(str::to_string))?;
        Ok(expand_home(&raw))
    }

    /// Show a 1-based numbered menu and return the chosen option.
    ///
    /// Numbers outside `1..=options.len()` are rejected and asked again.
    pub fn choose<T>(
        &mut self,
        text: &str,
        options: &[T],
        default_index: usize,
    ) -> Result<T, PromptError>
    where
        T: Clone + Display,
    {
        if options.is_empty() {
            return Err(PromptError::NoOptions(text.to_string()));
        }

        let rule = "=".repeat(60);
        self.source.show(&rule)?;
        self.source.show(&style(text).bold().to_string())?;
        for (i, option) in options.iter().enumerate() {
            self.source.show(&format!("  {}. {}", i + 1, option))?;
        }
        self.source.show(&rule)?;

        loop {
            let choice: i64 = self.ask("Select", Some(default_index as i64))?;
            if choice >= 1 && (choice as usize) <= options.len() {
                return Ok(options[choice as usize - 1].clone());
            }
            let warning = format!(
                "{}Invalid choice, please enter a number between 1 and {}",
                WARN,
                options.len()
            );
            self.source.show(&style(warning).yellow().to_string())?;
        }
    }

    /// Yes/no question; only `y` (any case) counts as yes
    pub fn confirm(&mut self, text: &str, default: bool) -> Result<bool, PromptError> {
        let default = if default { "y" } else { "n" };
        let answer = self.ask_text(&format!("{} (y/n)", text), default)?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(raw: &str) -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        if raw == "~" {
            return home;
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn type_label<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    match full.rsplit("::").next().unwrap_or(full) {
        "String" => "text",
        "i32" | "i64" | "u32" | "u64" | "usize" => "whole number",
        "f32" | "f64" => "decimal number",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<StdioSource<Cursor<Vec<u8>>, Vec<u8>>> {
        Prompter::new(StdioSource::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        ))
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(type_label::<String>(), "text");
        assert_eq!(type_label::<i32>(), "whole number");
        assert_eq!(type_label::<f64>(), "decimal number");
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/frames"), PathBuf::from("/tmp/frames"));
        assert_eq!(expand_home("frames/~x"), PathBuf::from("frames/~x"));
    }

    #[test]
    fn test_expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/renders"), home.join("renders"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompter("");
        let result: Result<i32, _> = p.ask("Width", None);
        assert!(matches!(result, Err(PromptError::Closed)));
    }

    #[test]
    fn test_crlf_line_endings_are_trimmed() {
        let mut p = prompter("12\r\n");
        let value: i32 = p.ask("Width", None).unwrap();
        assert_eq!(value, 12);
    }

    #[test]
    fn test_empty_option_list_is_rejected() {
        let mut p = prompter("1\n");
        let options: Vec<String> = Vec::new();
        let result = p.choose("Pick one", &options, 1);
        assert!(matches!(result, Err(PromptError::NoOptions(_))));
    }
}
