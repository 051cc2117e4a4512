use crate::error::{Result, VsyscError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE: Regex = Regex::new(r"^\s*(.*?)\s*:\s*(.*?)\s*:\s*(.*?)$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub identifier: String,
    pub keyword: String,
    pub content: String,
}

/// Matches one physical line (1-based `number`).
///
/// Returns `Ok(None)` for blank lines, which are anything of two characters
/// or fewer once trimmed.
pub fn match_line(raw: &str, number: usize) -> Result<Option<Line>> {
    let line = raw.trim();
    if line.chars().count() <= 2 {
        return Ok(None);
    }

    let caps = LINE
        .captures(line)
        .ok_or(VsyscError::SyntaxError { line: number })?;

    Ok(Some(Line {
        number,
        identifier: caps[1].to_string(),
        keyword: caps[2].to_lowercase(),
        content: caps[3].to_string(),
    }))
}

pub fn tokenize(source: &str) -> Vec<Result<Line>> {
    source
        .split('\n')
        .enumerate()
        .filter_map(|(i, raw)| match_line(raw, i + 1).transpose())
        .collect()
}
