//! Interactive and command-driven target selection.

use std::io::{self, Write};
use std::process::Stdio;

use async_trait::async_trait;
use redshift_credentials::{MatchOutcome, SelectorError, TargetSelector, match_candidate};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const PROMPT: &str = "Enter number";

/// Lists the candidates on stderr and asks for a number until exactly one
/// matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptSelector;

#[async_trait]
impl TargetSelector for PromptSelector {
    async fn select(&self, lines: &[String]) -> Result<String, SelectorError> {
        let lines = lines.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut stderr = io::stderr().lock();
            for line in &lines {
                writeln!(stderr, "{line}")?;
            }
            drop(stderr);
            prompt_loop(&lines, read_answer, |message| eprintln!("{message}"))
        })
        .await
        .map_err(|e| SelectorError::Other(format!("prompt task failed: {e}")))?
    }
}

/// Ask until `ask` yields input matching exactly one line.
fn prompt_loop(
    lines: &[String],
    mut ask: impl FnMut() -> Result<String, SelectorError>,
    mut report: impl FnMut(&str),
) -> Result<String, SelectorError> {
    loop {
        let input = ask()?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        match match_candidate(lines, input) {
            MatchOutcome::Selected(line) => return Ok(line),
            MatchOutcome::NoMatch => report(&format!("{input}: no such item")),
            MatchOutcome::Ambiguous(_) => report(&format!("{input}: is ambiguous")),
        }
    }
}

#[cfg(feature = "interactive")]
fn read_answer() -> Result<String, SelectorError> {
    use inquire::InquireError;

    inquire::Text::new(PROMPT).prompt().map_err(|e| match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            SelectorError::Aborted
        }
        InquireError::IO(e) => SelectorError::Io(e),
        other => SelectorError::Other(other.to_string()),
    })
}

#[cfg(not(feature = "interactive"))]
fn read_answer() -> Result<String, SelectorError> {
    eprint!("{PROMPT}: ");
    io::stderr().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(SelectorError::Aborted);
    }
    Ok(input)
}

/// Pipes the candidates through an external command such as `peco` or `fzf`.
///
/// A command line containing a space runs through `sh -c`. The command's
/// stdout, without trailing newlines, is the choice.
#[derive(Debug, Clone)]
pub struct FilterCommandSelector {
    command: String,
}

impl FilterCommandSelector {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn build_command(&self) -> Command {
        if self.command.contains(' ') {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        } else {
            Command::new(&self.command)
        }
    }
}

#[async_trait]
impl TargetSelector for FilterCommandSelector {
    async fn select(&self, lines: &[String]) -> Result<String, SelectorError> {
        debug!(command = %self.command, candidates = lines.len(), "Running filter command");
        let mut child = self
            .build_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SelectorError::Command(format!("failed to start `{}`: {e}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = lines.join("\n");
            // The filter may exit before reading everything.
            if let Err(e) = stdin.write_all(input.as_bytes()).await
                && e.kind() != io::ErrorKind::BrokenPipe
            {
                return Err(e.into());
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SelectorError::Command(format!(
                "`{}` exited with {}",
                self.command, output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\n', '\r'])
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn lines() -> Vec<String> {
        vec![
            "[1] main\tprovisioned cluster\tmain.abc.us-east-1.redshift.amazonaws.com".to_string(),
            "[2] adhoc\tserverless workgroup\tadhoc.1.us-east-1.redshift-serverless.amazonaws.com"
                .to_string(),
        ]
    }

    fn run_prompt(answers: &[&str]) -> (Result<String, SelectorError>, Vec<String>) {
        let mut answers: VecDeque<String> = answers.iter().map(|s| s.to_string()).collect();
        let mut reports = Vec::new();
        let result = prompt_loop(
            &lines(),
            || answers.pop_front().ok_or(SelectorError::Aborted),
            |message| reports.push(message.to_string()),
        );
        (result, reports)
    }

    #[test]
    fn test_prompt_selects_by_number() {
        let (result, reports) = run_prompt(&["2\n"]);
        assert_eq!(result.unwrap(), lines()[1]);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_prompt_retries_until_match() {
        let (result, reports) = run_prompt(&["7", "[", "1"]);

        assert_eq!(result.unwrap(), lines()[0]);
        assert_eq!(reports, ["7: no such item", "[: is ambiguous"]);
    }

    #[test]
    fn test_prompt_aborted() {
        let (result, _) = run_prompt(&[]);
        assert!(matches!(result, Err(SelectorError::Aborted)));
    }

    #[test]
    fn test_prompt_empty_input_asks_again() {
        let (result, reports) = run_prompt(&["", "  \n", "2"]);

        assert_eq!(result.unwrap(), lines()[1]);
        assert!(reports.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_filter_with_shell() {
        let selector = FilterCommandSelector::new("tail -n 1");
        let choice = selector.select(&lines()).await.unwrap();
        assert_eq!(choice, lines()[1]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_filter_without_shell() {
        let selector = FilterCommandSelector::new("cat");
        let choice = selector.select(&lines()[..1]).await.unwrap();
        assert_eq!(choice, lines()[0]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_filter_failure() {
        let err = FilterCommandSelector::new("false")
            .select(&lines())
            .await
            .unwrap_err();
        assert!(matches!(err, SelectorError::Command(_)));

        let err = FilterCommandSelector::new("definitely-not-a-real-filter-command")
            .select(&lines())
            .await
            .unwrap_err();
        assert!(matches!(err, SelectorError::Command(_)));
    }
}
