//! `search(find, table[, num_returns_per_match[, index_col_num]])`.
//!
//! A number is looked up among the table's rows and reports a flat list of
//! row indices. A string is searched one character at a time, a vector one
//! element at a time; each reports its own matches. `num_returns_per_match`
//! of 0 means all matches, 1 reports the first index unwrapped.

use super::{count_mismatch, count_value, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::errors::EvalResult;
use crate::value::{StrType, Value, VectorBuilder, VectorType};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    registry.register_function("search", search, BuiltinFlags::ENABLED);
}

/// A table row without the searched column.
struct InvalidEntry(usize);

fn search(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !(2..=4).contains(&args.len()) {
        count_mismatch(call, "between 2 and 4", args.len());
        return Ok(Value::undefined());
    }
    let (Some(find), Some(table)) = (args.value(0), args.value(1)) else {
        return Ok(Value::undefined());
    };
    let per_match = count_argument(args.value(2), 1);
    let column = count_argument(args.value(3), 0);
    let rows = table.as_vector().map_or(&[][..], VectorType::as_slice);
    let mut out = VectorBuilder::new(Some(call.session.accounting().clone()));

    match find {
        Value::Number(_) => {
            for j in row_matches(find, rows, per_match, column) {
                out.push(count_value(j));
            }
        }
        Value::String(text) => {
            let found = match table {
                Value::String(haystack) => Ok(search_text(text, haystack, per_match)),
                _ => search_column(text, rows, per_match, column),
            };
            match found {
                Ok(found) => {
                    for matches in found {
                        // A single requested match is reported bare, or not at all.
                        if per_match == 1 {
                            out.extend(matches.first().map(|&j| count_value(j)));
                        } else {
                            out.push(indices(call, matches));
                        }
                    }
                }
                Err(InvalidEntry(j)) => {
                    call.warn(format!(
                        "Invalid entry in search vector at index {j}, required number of values in the entry: {}. Invalid entry: {}",
                        column + 1,
                        rows[j].to_echo_string()
                    ));
                    return Ok(Value::Vector(VectorType::empty()));
                }
            }
        }
        Value::Vector(needles) => {
            for needle in needles.iter() {
                let matches = row_matches(needle, rows, per_match, column);
                match (per_match, matches.first()) {
                    (1, Some(&j)) => out.push(count_value(j)),
                    _ => out.push(indices(call, matches)),
                }
            }
        }
        _ => return Ok(Value::undefined()),
    }
    Ok(Value::Vector(out.build()))
}

/// Non-negative whole count from an optional argument; missing means `default`,
/// anything but a positive number means 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_argument(value: Option<&Value>, default: usize) -> usize {
    match value {
        None => default,
        Some(value) => match value.as_number() {
            Some(n) if n >= 1.0 => n as usize,
            _ => 0,
        },
    }
}

/// Indices of the first `per_match` rows satisfying `hit` (all rows if 0).
fn first_matches<E>(
    len: usize,
    per_match: usize,
    mut hit: impl FnMut(usize) -> Result<bool, E>,
) -> Result<Vec<usize>, E> {
    let mut found = Vec::new();
    for j in 0..len {
        if hit(j)? {
            found.push(j);
            if found.len() == per_match {
                break;
            }
        }
    }
    Ok(found)
}

/// Rows equal to `needle`, or whose `column` element is.
fn row_matches(needle: &Value, rows: &[Value], per_match: usize, column: usize) -> Vec<usize> {
    let matches = |row: &Value| {
        (column == 0 && needle.equals(row).to_bool())
            || row
                .as_vector()
                .and_then(|cells| cells.get(column))
                .is_some_and(|cell| needle.equals(cell).to_bool())
    };
    let found: Result<_, InvalidEntry> =
        first_matches(rows.len(), per_match, |j| Ok(matches(&rows[j])));
    found.unwrap_or_default()
}

/// Positions in `haystack` of each character of `text`.
fn search_text(text: &StrType, haystack: &StrType, per_match: usize) -> Vec<Vec<usize>> {
    let characters: Vec<&str> = haystack.graphemes().collect();
    text.graphemes()
        .map(|needle| {
            let found: Result<_, InvalidEntry> =
                first_matches(characters.len(), per_match, |j| Ok(characters[j] == needle));
            found.unwrap_or_default()
        })
        .collect()
}

/// Rows whose `column` element is a string equal to each character of
/// `text`. A row too short for `column` fails the whole search.
fn search_column(
    text: &StrType,
    rows: &[Value],
    per_match: usize,
    column: usize,
) -> Result<Vec<Vec<usize>>, InvalidEntry> {
    text.graphemes()
        .map(|needle| {
            first_matches(rows.len(), per_match, |j| {
                let cell = rows[j]
                    .as_vector()
                    .and_then(|cells| cells.get(column))
                    .ok_or(InvalidEntry(j))?;
                Ok(cell.as_str() == Some(needle))
            })
        })
        .collect()
}

fn indices(call: &BuiltinCall<'_>, found: Vec<usize>) -> Value {
    let mut out = VectorBuilder::with_capacity(found.len(), Some(call.session.accounting().clone()));
    out.extend(found.into_iter().map(count_value));
    Value::Vector(out.build())
}
