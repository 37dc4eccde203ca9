//! Disambiguation between several discovered targets.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::discovery::DiscoveredTarget;
use crate::error::{CredentialError, Result};

/// Errors raised by a [`TargetSelector`].
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Terminal or pipe I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external filter command failed.
    #[error("filter command failed: {0}")]
    Command(String),

    /// The user aborted the prompt.
    #[error("selection aborted")]
    Aborted,

    #[error("{0}")]
    Other(String),
}

/// Picks one line out of a candidate listing.
///
/// Implementations must return one of `lines` unchanged.
#[async_trait]
pub trait TargetSelector: Send + Sync {
    async fn select(&self, lines: &[String]) -> std::result::Result<String, SelectorError>;
}

/// Result of matching user input against candidate lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Selected(String),
    NoMatch,
    Ambiguous(usize),
}

/// Match `input` against candidate lines.
///
/// An exact match wins outright. Otherwise a line matches when it starts with
/// `input` or with `[input]`, so a bare index like `2` picks `[2] ...`.
pub fn match_candidate(lines: &[String], input: &str) -> MatchOutcome {
    let input = input.trim();
    if input.is_empty() {
        return MatchOutcome::NoMatch;
    }
    if let Some(line) = lines.iter().find(|line| line.as_str() == input) {
        return MatchOutcome::Selected(line.clone());
    }

    let bracketed = format!("[{input}]");
    let mut found: Vec<&String> = lines
        .iter()
        .filter(|line| line.starts_with(input) || line.starts_with(&bracketed))
        .collect();

    match found.len() {
        0 => MatchOutcome::NoMatch,
        1 => MatchOutcome::Selected(found.remove(0).clone()),
        n => MatchOutcome::Ambiguous(n),
    }
}

/// Choose one target out of `candidates`.
///
/// A single candidate is returned without consulting the selector.
pub(crate) async fn choose_target(
    mut candidates: Vec<DiscoveredTarget>,
    selector: Option<&dyn TargetSelector>,
) -> Result<DiscoveredTarget> {
    match candidates.len() {
        0 => return Err(CredentialError::NoTargetFound),
        1 => return Ok(candidates.remove(0)),
        _ => {}
    }

    let Some(selector) = selector else {
        return Err(CredentialError::AmbiguousSelection {
            candidates: candidates.len(),
        });
    };

    let lines: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, target)| target.listing_line(i))
        .collect();

    let selected = selector
        .select(&lines)
        .await
        .map_err(|e| CredentialError::selection_failed(e.to_string()))?;

    let index = lines
        .iter()
        .position(|line| *line == selected)
        .ok_or_else(|| CredentialError::selection_failed("selector returned an unknown line"))?;

    let target = candidates.swap_remove(index);
    debug!(identifier = %target.identifier, kind = %target.kind, "Target selected");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        vec![
            "[1] main\tprovisioned cluster\tmain.a.redshift.amazonaws.com".to_string(),
            "[2] staging\tprovisioned cluster\tstaging.a.redshift.amazonaws.com".to_string(),
            "[10] adhoc\tserverless workgroup\tadhoc.b.redshift-serverless.amazonaws.com"
                .to_string(),
        ]
    }

    #[test]
    fn test_match_by_index() {
        assert_eq!(
            match_candidate(&lines(), "2"),
            MatchOutcome::Selected(lines()[1].clone())
        );
        assert_eq!(
            match_candidate(&lines(), "10"),
            MatchOutcome::Selected(lines()[2].clone())
        );
    }

    #[test]
    fn test_match_exact_and_prefix() {
        let all = lines();
        assert_eq!(
            match_candidate(&all, &all[0]),
            MatchOutcome::Selected(all[0].clone())
        );
        assert_eq!(
            match_candidate(&all, "[2] sta"),
            MatchOutcome::Selected(all[1].clone())
        );
    }

    #[test]
    fn test_match_ambiguous_and_missing() {
        // "[1" prefixes both "[1]" and "[10]".
        assert_eq!(match_candidate(&lines(), "[1"), MatchOutcome::Ambiguous(2));
        assert_eq!(match_candidate(&lines(), "7"), MatchOutcome::NoMatch);
        assert_eq!(match_candidate(&lines(), "   "), MatchOutcome::NoMatch);
    }
}
