//! Line-editing terminal prompts.
//!
//! The editor blocks, so each read runs on the blocking pool and hands the
//! editor back when the line is in.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub struct Prompter {
    editor: Option<DefaultEditor>,
}

impl Prompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to create line editor")?;
        Ok(Self {
            editor: Some(editor),
        })
    }

    /// Read one line, pre-filled with `initial`. `None` on Ctrl-D or Ctrl-C.
    async fn read_line(&mut self, prompt: &str, initial: &str) -> Result<Option<String>> {
        let mut editor = self.editor.take().context("Line editor is busy")?;
        let prompt = prompt.to_string();
        let initial = initial.to_string();
        let (editor, result) = tokio::task::spawn_blocking(move || {
            let result = if initial.is_empty() {
                editor.readline(&prompt)
            } else {
                editor.readline_with_initial(&prompt, (&initial, ""))
            };
            (editor, result)
        })
        .await
        .context("Line editor task failed")?;
        self.editor = Some(editor);

        match result {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e).context("Failed to read from terminal"),
        }
    }

    /// Yes/no question. End of input counts as "no".
    pub async fn confirm(&mut self, question: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        let answer = self.read_line(&format!("{question} {hint} "), "").await?;
        Ok(match answer {
            Some(line) => parse_yes_no(&line).unwrap_or(default_yes),
            None => false,
        })
    }

    /// Edit `steps` one line at a time, each pre-filled with the current
    /// text, then collect extra steps until a blank line.
    ///
    /// Clearing a pre-filled line drops that step. Returns `None` when input
    /// is interrupted.
    pub async fn edit_steps(&mut self, steps: &[String]) -> Result<Option<Vec<String>>> {
        let mut lines = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            match self.read_line(&format!("{:>2}> ", index + 1), step).await? {
                Some(line) => lines.push(line),
                None => return Ok(None),
            }
        }
        loop {
            match self.read_line(" +> ", "").await? {
                Some(line) if !line.trim().is_empty() => lines.push(line),
                Some(_) => break,
                None => return Ok(None),
            }
        }
        Ok(Some(collect_steps(lines)))
    }
}

fn parse_yes_no(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Trimmed, non-empty lines in input order.
fn collect_steps<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_parsing() {
        assert_eq!(parse_yes_no(" Y "), Some(true));
        assert_eq!(parse_yes_no("no"), Some(false));
        assert_eq!(parse_yes_no(""), None);
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn edited_step_keeps_untouched_ones() {
        // Step 1 accepted as pre-filled, step 2 rewritten, then one extra.
        let lines = vec![
            "1. Search".to_string(),
            "2. Count the rows twice ".to_string(),
            "3. Report the total".to_string(),
        ];
        assert_eq!(
            collect_steps(lines),
            vec!["1. Search", "2. Count the rows twice", "3. Report the total"]
        );
    }

    #[test]
    fn cleared_steps_are_dropped() {
        let lines = vec!["".to_string(), "  ".to_string(), "2. Count".to_string()];
        assert_eq!(collect_steps(lines), vec!["2. Count"]);
        assert!(collect_steps(Vec::new()).is_empty());
    }
}
