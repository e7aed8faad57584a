//! Scrape files: one JSON record per line, recorded while replaying proofs
//!
//! A line is either a bare JSON string (a vernacular command, which carries
//! no tactic) or a tactic record with the proof context it ran in.

use crate::core::{PredictorError, Result};
use crate::text::get_stem;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A goal with the hypotheses in scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    #[serde(default)]
    pub hypotheses: Vec<String>,
    pub goal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProofContext {
    #[serde(default)]
    pub fg_goals: Vec<Obligation>,
    #[serde(default)]
    pub bg_goals: Vec<Obligation>,
    #[serde(default)]
    pub shelved_goals: Vec<Obligation>,
    #[serde(default)]
    pub given_up_goals: Vec<Obligation>,
}

/// One tactic invocation and the state before it ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedTactic {
    #[serde(default)]
    pub relevant_lemmas: Vec<String>,
    #[serde(default)]
    pub prev_tactics: Vec<String>,
    pub context: ProofContext,
    pub tactic: String,
}

impl ScrapedTactic {
    /// The first focused goal, or `""` when nothing is focused
    pub fn goal(&self) -> &str {
        self.context
            .fg_goals
            .first()
            .map(|obl| obl.goal.as_str())
            .unwrap_or("")
    }

    pub fn hypotheses(&self) -> &[String] {
        self.context
            .fg_goals
            .first()
            .map(|obl| obl.hypotheses.as_slice())
            .unwrap_or(&[])
    }

    pub fn stem(&self) -> Option<String> {
        get_stem(&self.tactic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapedCommand {
    Vernac(String),
    Tactic(ScrapedTactic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterClause {
    All,
    NoSemis,
    HasGoal,
    Stem(String),
}

impl FilterClause {
    fn matches(&self, sample: &ScrapedTactic) -> bool {
        match self {
            FilterClause::All => true,
            FilterClause::NoSemis => !sample.tactic.contains(';'),
            FilterClause::HasGoal => !sample.goal().trim().is_empty(),
            FilterClause::Stem(stem) => sample.stem().as_deref() == Some(stem.as_str()),
        }
    }
}

/// Named predicate selecting which scraped tactics become training data.
///
/// Names are joined with `+` and must all hold: `all`, `no-semis`,
/// `has-goal`, `default` (`no-semis+has-goal`), `tactic:STEM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFilter {
    name: String,
    clauses: Vec<FilterClause>,
}

impl ContextFilter {
    pub fn parse(name: &str) -> Result<Self> {
        let mut clauses = Vec::new();
        for part in name.split('+') {
            match part.trim() {
                "all" => clauses.push(FilterClause::All),
                "no-semis" => clauses.push(FilterClause::NoSemis),
                "has-goal" => clauses.push(FilterClause::HasGoal),
                "default" => {
                    clauses.push(FilterClause::NoSemis);
                    clauses.push(FilterClause::HasGoal);
                }
                other => match other.strip_prefix("tactic:") {
                    Some(stem) if !stem.is_empty() => {
                        clauses.push(FilterClause::Stem(stem.to_string()))
                    }
                    _ => return Err(PredictorError::UnknownContextFilter(name.to_string())),
                },
            }
        }

        Ok(Self {
            name: name.to_string(),
            clauses,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, sample: &ScrapedTactic) -> bool {
        self.clauses.iter().all(|clause| clause.matches(sample))
    }
}

impl fmt::Display for ContextFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Load the tactic samples of a scrape file that pass `filter`, keeping at
/// most `max_tuples` of them
pub fn get_text_data<P: AsRef<Path>>(
    path: P,
    filter: &ContextFilter,
    max_tuples: Option<usize>,
) -> Result<Vec<ScrapedTactic>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(PredictorError::IoError)?;
    let data = read_text_data(BufReader::new(file), filter, max_tuples)?;
    info!(
        "Loaded {} samples from {} (filter '{}')",
        data.len(),
        path.display(),
        filter
    );
    Ok(data)
}

/// As `get_text_data`, from any reader
pub fn read_text_data<R: BufRead>(
    reader: R,
    filter: &ContextFilter,
    max_tuples: Option<usize>,
) -> Result<Vec<ScrapedTactic>> {
    let limit = max_tuples.unwrap_or(usize::MAX);
    let mut data = Vec::new();
    let mut skipped = 0;

    for (line_num, line) in reader.lines().enumerate() {
        if data.len() >= limit {
            break;
        }
        let line = line.map_err(PredictorError::IoError)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command: ScrapedCommand = serde_json::from_str(line).map_err(|e| {
            PredictorError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
        })?;

        match command {
            ScrapedCommand::Tactic(sample) if sample.stem().is_some() && filter.matches(&sample) => {
                data.push(sample)
            }
            _ => skipped += 1,
        }
    }

    debug!("Skipped {} records", skipped);
    Ok(data)
}
