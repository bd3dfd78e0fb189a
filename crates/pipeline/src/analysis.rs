//! Human-readable compatibility analysis
//!
//! [`Analysis`] is the diagnostic report of a pipeline: which stages it has
//! and, if it cannot run, which stage broke it and why. Its `Display` output
//! is meant to be printed as-is by the assembling program.

use std::fmt;

use serde::Serialize;

use crate::chain::ChainNode;

/// Outcome of analysing a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// No stages have been appended
    Empty,
    /// Every stage's input contract is satisfied
    Compatible,
    /// A stage requires fields its ancestor does not provide
    MissingFields {
        /// First breaking stage
        stage: String,
        /// Its immediate ancestor
        ancestor: String,
        /// Names of the missing fields
        missing: Vec<String>,
    },
    /// A stage produces a field already available with another type
    ConflictingField {
        /// First breaking stage
        stage: String,
        /// Its immediate ancestor
        ancestor: String,
        /// Field name
        name: String,
        /// Type held by the ancestor's contract
        existing: String,
        /// Type the stage produces
        incoming: String,
    },
}

/// Diagnostic report for a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Stage names, root first
    pub stages: Vec<String>,
    /// Compatibility verdict
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl Analysis {
    pub(crate) fn of(tip: &ChainNode) -> Self {
        let stages: Vec<String> = tip
            .path()
            .iter()
            .filter_map(|node| node.stage())
            .map(|stage| stage.name().to_string())
            .collect();

        let verdict = if stages.is_empty() {
            Verdict::Empty
        } else {
            match tip.first_incompatible() {
                None => Verdict::Compatible,
                Some(node) => verdict_for(node),
            }
        };

        Self { stages, verdict }
    }

    /// Whether the pipeline can run
    pub fn is_compatible(&self) -> bool {
        matches!(self.verdict, Verdict::Empty | Verdict::Compatible)
    }
}

fn verdict_for(node: &ChainNode) -> Verdict {
    let stage_name = node.name().to_string();
    let ancestor_name = node.ancestor().map(|a| a.name()).unwrap_or_default().to_string();
    let (Some(stage), Some(available)) = (
        node.stage(),
        node.ancestor().and_then(|a| a.available().contract()),
    ) else {
        return Verdict::MissingFields {
            stage: stage_name,
            ancestor: ancestor_name,
            missing: Vec::new(),
        };
    };

    let missing = stage.input().missing_from(available);
    if !missing.is_empty() {
        return Verdict::MissingFields {
            stage: stage_name,
            ancestor: ancestor_name,
            missing: missing.iter().map(|d| d.name().to_string()).collect(),
        };
    }

    let conflict = stage.output().iter().find_map(|produced| {
        available
            .get(produced.name())
            .filter(|existing| existing.conflicts_with(produced))
            .map(|existing| (produced, existing))
    });
    match conflict {
        Some((produced, existing)) => Verdict::ConflictingField {
            stage: stage_name,
            ancestor: ancestor_name,
            name: produced.name().to_string(),
            existing: existing.value_type().name().to_string(),
            incoming: produced.value_type().name().to_string(),
        },
        None => Verdict::MissingFields {
            stage: stage_name,
            ancestor: ancestor_name,
            missing: Vec::new(),
        },
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::Empty => writeln!(f, "Pipeline is empty; nothing to be incompatible with."),
            Verdict::Compatible => writeln!(f, "All pipeline operations compatible."),
            Verdict::MissingFields {
                stage,
                ancestor,
                missing,
            } => {
                writeln!(
                    f,
                    "Pipeline operation {} is not compatible with contract from ancestor {}",
                    stage, ancestor
                )?;
                for field in missing {
                    writeln!(
                        f,
                        "  - {} is required, but is not supported by the ancestor's contract.",
                        field
                    )?;
                }
                Ok(())
            }
            Verdict::ConflictingField {
                stage,
                ancestor,
                name,
                existing,
                incoming,
            } => {
                writeln!(
                    f,
                    "Pipeline operation {} is not compatible with contract from ancestor {}",
                    stage, ancestor
                )?;
                writeln!(
                    f,
                    "  - {} is produced as {}, but the ancestor's contract already holds it as {}.",
                    name, incoming, existing
                )
            }
        }
    }
}
