//! Connection file parser.
//!
//! Input is line-oriented text with one `source,target,weight` triple
//! per line. An optional header is recognised on the first non-blank
//! line: three fields whose last one is not a number.

use crate::error::{IngestError, Result};
use ruta_graph::{Edge, Weight};
use std::fs;
use std::path::Path;

const FIELD_SEPARATOR: char = ',';

/// Parses connection text into validated edges.
///
/// The whole input is validated; the first bad line aborts parsing.
pub fn parse_connections(text: &str) -> Result<Vec<Edge>> {
    if text.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut edges = Vec::new();
    let mut seen_first_line = false;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        if !seen_first_line {
            seen_first_line = true;
            if is_header(line) {
                continue;
            }
        }

        edges.push(parse_line(line, line_number)?);
    }

    Ok(edges)
}

/// Reads and parses a connection file.
pub fn read_connections(path: impl AsRef<Path>) -> Result<Vec<Edge>> {
    let text = fs::read_to_string(path)?;
    parse_connections(&text)
}

/// Splits a line on commas, dropping trailing empty fields so that
/// `A,B,` counts as two fields rather than three.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}

/// Header lines carry a non-numeric third field. Out-of-range numbers
/// still count as numeric and are rejected later as bad weights.
fn is_header(line: &str) -> bool {
    let fields = split_fields(line);
    fields.len() == 3 && !looks_numeric(fields[2].trim())
}

/// An optionally signed, non-empty run of ASCII digits.
fn looks_numeric(field: &str) -> bool {
    let digits = field.strip_prefix(&['+', '-'][..]).unwrap_or(field);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_line(line: &str, line_number: usize) -> Result<Edge> {
    let fields = split_fields(line);
    let [source, target, weight] = fields.as_slice() else {
        return Err(IngestError::InvalidFormat { line: line_number });
    };

    let (source, target) = (source.trim(), target.trim());
    let weight: i32 = weight
        .trim()
        .parse()
        .map_err(|_| IngestError::InvalidWeight { line: line_number })?;

    if source.is_empty() || target.is_empty() {
        return Err(IngestError::InvalidData { line: line_number });
    }
    let weight =
        Weight::try_from(weight).map_err(|_| IngestError::InvalidData { line: line_number })?;

    Ok(Edge::new(source, target, weight))
}
