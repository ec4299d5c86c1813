//! Asking the user things.
//!
//! The flow only talks to the [`Prompter`] trait. The terminal version
//! reads lines from stdin; tests script the answers.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sprout_core::PickItem;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Front end for the pick → input steps.
pub trait Prompter {
    /// Shows (`Some`) or clears (`None`) a loading indicator.
    fn loading(&mut self, message: Option<&str>);

    /// Asks for one of `items`. `None` means nothing was chosen.
    fn pick(&mut self, placeholder: &str, items: &[PickItem]) -> io::Result<Option<usize>>;

    /// Asks for a line of text. `None` means the user gave up.
    fn input(&mut self, prompt: &str, placeholder: &str) -> io::Result<Option<String>>;
}

/// Line-based prompter over any reader and writer.
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
    spinner: Option<ProgressBar>,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Reads stdin, writes prompts to stderr so stdout stays scriptable.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            spinner: None,
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim().to_string();
        Ok(if line.is_empty() { None } else { Some(line) })
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn loading(&mut self, message: Option<&str>) {
        match message {
            Some(message) => self.spinner = Some(start_spinner(message)),
            None => {
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_and_clear();
                }
            }
        }
    }

    fn pick(&mut self, placeholder: &str, items: &[PickItem]) -> io::Result<Option<usize>> {
        writeln!(self.writer, "{}", placeholder.cyan())?;
        for (index, item) in items.iter().enumerate() {
            let description = item.description.as_deref().unwrap_or_default();
            writeln!(
                self.writer,
                "  {:>3}  {} {}",
                (index + 1).to_string().dimmed(),
                item.label,
                description.dimmed()
            )?;
        }
        write!(self.writer, "{} ", ">".cyan())?;
        self.writer.flush()?;

        let Some(answer) = self.read_line()? else {
            return Ok(None);
        };
        Ok(match_answer(&answer, items))
    }

    fn input(&mut self, prompt: &str, placeholder: &str) -> io::Result<Option<String>> {
        writeln!(self.writer, "{} {}", prompt.cyan(), format!("({})", placeholder).dimmed())?;
        write!(self.writer, "{} ", ">".cyan())?;
        self.writer.flush()?;
        self.read_line()
    }
}

/// A steady cyan spinner with a message, cleared by the caller.
pub fn start_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

/// Resolves a typed answer: a 1-based number, an exact label, or a
/// fragment contained in exactly one label.
pub fn match_answer(answer: &str, items: &[PickItem]) -> Option<usize> {
    if let Ok(number) = answer.parse::<usize>() {
        return (1..=items.len()).contains(&number).then(|| number - 1);
    }

    if let Some(index) = items.iter().position(|i| i.label == answer) {
        return Some(index);
    }

    let mut candidates = items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.label.contains(answer));
    match (candidates.next(), candidates.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::{DirectoryOption, FsLocation};
    use std::path::Path;

    fn items(labels: &[&str]) -> Vec<PickItem> {
        labels
            .iter()
            .map(|label| {
                PickItem::new(
                    DirectoryOption {
                        display_text: label.to_string(),
                        location: FsLocation::under(Path::new("/w"), Path::new(label)),
                    },
                    None,
                )
            })
            .collect()
    }

    #[test]
    fn test_match_by_number_label_and_fragment() {
        let items = items(&["/", "/src", "/src/bin", "/docs"]);

        assert_eq!(match_answer("2", &items), Some(1));
        assert_eq!(match_answer("0", &items), None);
        assert_eq!(match_answer("9", &items), None);
        assert_eq!(match_answer("/src", &items), Some(1));
        assert_eq!(match_answer("doc", &items), Some(3));
        assert_eq!(match_answer("src", &items), None);
    }

    #[test]
    fn test_terminal_pick_and_input() {
        let items = items(&["/", "/src"]);
        let input = b"2\nlib/mod.rs\n" as &[u8];
        let mut output = Vec::new();
        let mut prompter = TerminalPrompter::new(input, &mut output);

        assert_eq!(prompter.pick("Pick", &items).unwrap(), Some(1));
        assert_eq!(
            prompter.input("Relative to /src", "file").unwrap(),
            Some("lib/mod.rs".to_string())
        );
        assert_eq!(prompter.input("again", "file").unwrap(), None);
    }

    #[test]
    fn test_empty_answer_is_no_selection() {
        let items = items(&["/"]);
        let mut output = Vec::new();
        let mut prompter = TerminalPrompter::new(b"\n" as &[u8], &mut output);
        assert_eq!(prompter.pick("Pick", &items).unwrap(), None);
    }
}
