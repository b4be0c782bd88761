//! Form schema for wiki pages and the submit/validate state machine.

use std::collections::{BTreeMap, HashMap};

/// Name of the parameter marking a real submission.
pub const SUBMIT_MARKER: &str = "submit";

/// Longest title the `pages` table is declared to hold.
pub const MAX_TITLE_LEN: usize = 200;

/// Validated wiki page input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPageInput {
    pub title: String,
    pub body: String,
}

/// Field values and per-field error messages to render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub values: BTreeMap<&'static str, String>,
    pub errors: BTreeMap<&'static str, String>,
}

impl FormState {
    /// A form prefilled with existing values and no errors
    pub fn prefilled(title: &str, body: &str) -> Self {
        let mut values = BTreeMap::new();
        values.insert("title", title.to_string());
        values.insert("body", body.to_string());
        Self { values, errors: BTreeMap::new() }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Where a page form request lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// No submit marker: show the form.
    Blank,
    /// Submitted but invalid: show errors next to the user's input.
    Invalid(FormState),
    /// Submitted and valid: ready to persist.
    Valid(WikiPageInput),
}

/// Both fields are required; an empty value counts as missing
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiPageSchema;

impl WikiPageSchema {
    pub const FIELDS: [&'static str; 2] = ["title", "body"];

    /// Validate raw form controls
    pub fn validate(&self, params: &HashMap<String, String>) -> Result<WikiPageInput, FormState> {
        let mut state = FormState::default();
        for field in Self::FIELDS {
            let value = params.get(field).cloned().unwrap_or_default();
            if value.is_empty() {
                state.errors.insert(field, "Required".to_string());
            }
            state.values.insert(field, value);
        }
        if state.value("title").chars().count() > MAX_TITLE_LEN && state.error("title").is_none() {
            state
                .errors
                .insert("title", format!("Longer than maximum length {}", MAX_TITLE_LEN));
        }

        if state.has_errors() {
            return Err(state);
        }
        Ok(WikiPageInput {
            title: state.value("title").to_string(),
            body: state.value("body").to_string(),
        })
    }

    /// Decide the form transition for one request's parameters
    pub fn process(&self, params: &HashMap<String, String>) -> Submission {
        if !params.contains_key(SUBMIT_MARKER) {
            return Submission::Blank;
        }
        match self.validate(params) {
            Ok(input) => Submission::Valid(input),
            Err(state) => Submission::Invalid(state),
        }
    }
}
