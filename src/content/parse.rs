//! Validation of raw generated text into typed content

use serde::Deserialize;
use crate::error::GenerationError;
use super::{DareOptions, Riddle};

/// Quote characters trimmed from the edges of a category
const EDGE_QUOTES: &[char] = &['\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{AB}', '\u{BB}'];

#[derive(Deserialize)]
struct RawRiddle {
    riddle: Option<String>,
    answer: Option<String>,
}

#[derive(Deserialize)]
struct RawDares {
    dares: Option<serde_json::Value>,
}

/// Parse a `{"riddle": ..., "answer": ...}` payload
pub fn parse_riddle(raw: &str) -> Result<Riddle, GenerationError> {
    let parsed: RawRiddle = serde_json::from_str(raw.trim())?;

    let riddle = non_blank(parsed.riddle)
        .ok_or_else(|| GenerationError::schema("riddle text is missing"))?;
    let answer = non_blank(parsed.answer)
        .ok_or_else(|| GenerationError::schema("riddle answer is missing"))?;

    Ok(Riddle { riddle, answer })
}

/// Parse a `{"dares": [...]}` payload into exactly three options
pub fn parse_dares(raw: &str) -> Result<DareOptions, GenerationError> {
    let parsed: RawDares = serde_json::from_str(raw.trim())?;

    let items = match parsed.dares {
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => return Err(GenerationError::schema("dares must be a list")),
        None => return Err(GenerationError::schema("dares list is missing")),
    };

    let options = items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(text) => Ok(text),
            other => Err(GenerationError::schema(format!("dare option is not text: {}", other))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    DareOptions::from_options(options)
}

/// Strip quote characters from a generated category name
pub fn clean_category(raw: &str) -> Result<String, GenerationError> {
    let without_double: String = raw.chars().filter(|c| *c != '"').collect();
    let cleaned = without_double.trim().trim_matches(EDGE_QUOTES).trim();

    if cleaned.is_empty() {
        return Err(GenerationError::schema("category is empty"));
    }

    Ok(cleaned.to_string())
}

/// Trim a generated text field, rejecting blank text
pub fn clean_text(raw: &str) -> Result<String, GenerationError> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Err(GenerationError::schema("generated text is empty"));
    }
    Ok(cleaned.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
