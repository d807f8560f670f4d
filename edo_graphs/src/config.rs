// Run configuration: the settings file and the validated values built from it.
//
// `Settings` mirrors the JSON document the settings editor persists (upper-case
// keys, every key optional, unknown keys such as the window title ignored).
// Its fields are deliberately loose (signed integers, free-form term lists) so
// that a bad value turns into a `ConfigError` naming the field instead of a
// serde failure.
//
// `Settings::graph_config` and `Settings::layout_settings` validate and
// produce the immutable values the pipeline actually consumes:
//
// - `GraphConfig` for the transformation graph builder (`transform.rs`),
// - `LayoutSettings` for the force-directed layout (`layout.rs`).
//
// Validation always happens before any output file is touched, so a rejected
// run leaves earlier results in place.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Largest supported EDO. Every gap and rotation index is written as a
/// single base-62 digit.
pub const MAX_EDO: usize = 62;

// ---------------------------------------------------------------------------
// Filter terms
// ---------------------------------------------------------------------------

/// How the per-endpoint results of a filter are combined for an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn from_and_flag(and: bool) -> Self {
        if and { Combinator::And } else { Combinator::Or }
    }

    pub fn combine(self, source: bool, target: bool) -> bool {
        match self {
            Combinator::And => source && target,
            Combinator::Or => source || target,
        }
    }
}

/// Substring terms matched against symbol shapes, or no filtering at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TermSet {
    #[default]
    Disabled,
    Terms(BTreeSet<String>),
}

impl TermSet {
    /// Build from a list of terms. Blank terms are ignored; no terms at all
    /// means the filter is disabled.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if set.is_empty() {
            TermSet::Disabled
        } else {
            TermSet::Terms(set)
        }
    }

    /// Parse the editor's text form: comma-separated terms, each optionally
    /// wrapped in single or double quotes, e.g. `'32', '23'` or `32,`. Empty
    /// text or `False` disables the filter.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("false") {
            return TermSet::Disabled;
        }
        TermSet::from_terms(
            text.split(',')
                .map(|t| t.trim().trim_matches(|c: char| c == '\'' || c == '"')),
        )
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, TermSet::Disabled)
    }

    /// Inclusion test: true when disabled, else when any term occurs in `shape`.
    pub fn any_in(&self, shape: &str) -> bool {
        match self {
            TermSet::Disabled => true,
            TermSet::Terms(terms) => terms.iter().any(|t| shape.contains(t.as_str())),
        }
    }

    /// Exclusion test: true when disabled, else when no term occurs in `shape`.
    pub fn none_in(&self, shape: &str) -> bool {
        match self {
            TermSet::Disabled => true,
            TermSet::Terms(terms) => !terms.iter().any(|t| shape.contains(t.as_str())),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Everything the transformation graph builder needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphConfig {
    /// Steps per octave.
    pub edo: usize,
    /// Active notes per chord.
    pub chord_size: usize,
    /// Note offsets that define a transformation, in EDO steps (taken mod `edo`).
    pub intervals: Vec<i64>,
    /// Expand every surviving edge to all transpositions.
    pub do_all_keys: bool,
    /// Drop the redundant last shape digit from output labels.
    pub truncate: bool,
    /// Omit the `.0` suffix for symbols at rotation 0.
    pub simplify: bool,
    pub inclusions: TermSet,
    pub exclusions: TermSet,
    pub include: Combinator,
    pub exclude: Combinator,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            edo: 12,
            chord_size: 4,
            intervals: vec![1],
            do_all_keys: true,
            truncate: true,
            simplify: true,
            inclusions: TermSet::from_terms(["32", "23"]),
            exclusions: TermSet::Disabled,
            include: Combinator::And,
            exclude: Combinator::Or,
        }
    }
}

impl GraphConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_EDO).contains(&self.edo) {
            return Err(ConfigError::invalid(
                "EDO",
                format!("{} is outside 2..={MAX_EDO}", self.edo),
            ));
        }
        if self.chord_size > self.edo {
            return Err(ConfigError::invalid(
                "CHORD_SIZE",
                format!("{} exceeds EDO {}", self.chord_size, self.edo),
            ));
        }
        if self.intervals.is_empty() {
            return Err(ConfigError::invalid("INTERVALS", "at least one interval is required"));
        }
        Ok(())
    }
}

/// Parameters for the layout stage that come from the settings file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutSettings {
    pub dimensions: usize,
    pub iterations: u32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            dimensions: 3,
            iterations: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// An inclusion/exclusion entry as it appears in the settings file: `false`,
/// the editor's comma-separated text, or a JSON list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermField {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl TermField {
    pub fn to_term_set(&self) -> TermSet {
        match self {
            TermField::Flag(_) => TermSet::Disabled,
            TermField::Text(text) => TermSet::parse(text),
            TermField::List(terms) => TermSet::from_terms(terms),
        }
    }
}

/// The persisted settings document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Settings {
    pub edo: i64,
    pub chord_size: i64,
    pub intervals: Vec<i64>,
    pub dimensions: i64,
    pub iterations: i64,
    pub do_all_keys: bool,
    pub truncate_symbols: bool,
    pub simplify_symbols: bool,
    pub inclusions: TermField,
    pub exclusions: TermField,
    pub include_and: bool,
    pub exclude_and: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            edo: 12,
            chord_size: 4,
            intervals: vec![1],
            dimensions: 3,
            iterations: 500,
            do_all_keys: true,
            truncate_symbols: true,
            simplify_symbols: true,
            inclusions: TermField::Text("'32', '23'".to_string()),
            exclusions: TermField::Text(String::new()),
            include_and: true,
            exclude_and: false,
        }
    }
}

impl Settings {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn graph_config(&self) -> Result<GraphConfig, ConfigError> {
        let config = GraphConfig {
            edo: non_negative("EDO", self.edo)?,
            chord_size: non_negative("CHORD_SIZE", self.chord_size)?,
            intervals: self.intervals.clone(),
            do_all_keys: self.do_all_keys,
            truncate: self.truncate_symbols,
            simplify: self.simplify_symbols,
            inclusions: self.inclusions.to_term_set(),
            exclusions: self.exclusions.to_term_set(),
            include: Combinator::from_and_flag(self.include_and),
            exclude: Combinator::from_and_flag(self.exclude_and),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn layout_settings(&self) -> Result<LayoutSettings, ConfigError> {
        let dimensions = non_negative("DIMENSIONS", self.dimensions)?;
        if dimensions == 0 {
            return Err(ConfigError::invalid("DIMENSIONS", "must be at least 1"));
        }
        let iterations = u32::try_from(self.iterations).map_err(|_| {
            ConfigError::invalid(
                "ITERATIONS",
                format!("{} is outside 0..={}", self.iterations, u32::MAX),
            )
        })?;
        Ok(LayoutSettings {
            dimensions,
            iterations,
        })
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| ConfigError::invalid(field, format!("{value} is negative")))
}

/// Parse the editor's interval text, e.g. `1, 2,5`. Blank entries are skipped.
pub fn parse_intervals(text: &str) -> Result<Vec<i64>, ConfigError> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::Parse {
                field: "INTERVALS",
                value: s.to_string(),
            })
        })
        .collect()
}
