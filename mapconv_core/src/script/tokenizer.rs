//! Reads a `.con` text script into a stream of directive records
//!.

use std::path::Path;

use crate::error::{ConvertError, Result};

/// One parsed directive line: `Object.verb arg0 arg1 ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub object: String,
    pub verb: String,
    pub args: Vec<String>,
    pub line: usize,
}

/// Tokenizes the contents of a `.con` file.
///
/// `file_label` is only used for error messages, so callers can pass a
/// display-friendly relative path rather than the full filesystem path.
pub fn tokenize(contents: &str, file_label: &str) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();

    for (zero_based_line, raw_line) in contents.lines().enumerate() {
        let line = zero_based_line + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let head = tokens.next().expect("non-empty trimmed line has at least one token");

        if head.eq_ignore_ascii_case("rem") {
            continue;
        }

        let (object, verb) = head.split_once('.').ok_or_else(|| ConvertError::ParseError {
            file: file_label.to_string(),
            line,
            reason: format!("expected 'Object.verb' head token, got '{head}'"),
        })?;

        let args: Vec<String> = tokens.map(str::to_string).collect();
        validate_numeric_args(&args, file_label, line)?;

        directives.push(Directive {
            object: object.to_string(),
            verb: verb.to_string(),
            args,
            line,
        });
    }

    Ok(directives)
}

/// Convenience wrapper that reads `path` from disk before tokenizing.
pub fn tokenize_file(path: &Path) -> Result<Vec<Directive>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_| ConvertError::MapDirectoryNotFound(path.display().to_string()))?;
    let label = path.display().to_string();
    tokenize(&contents, &label)
}

/// A slash-separated `x/y/z` argument, accepting decimal scientific
/// notation.
pub fn parse_vector_arg(arg: &str, file_label: &str, line: usize) -> Result<(f64, f64, f64)> {
    let parts: Vec<&str> = arg.split('/').collect();
    if parts.len() != 3 {
        return Err(ConvertError::ParseError {
            file: file_label.to_string(),
            line,
            reason: format!("expected a slash-separated x/y/z triple, got '{arg}'"),
        });
    }

    let parse_one = |s: &str| -> Result<f64> {
        s.parse::<f64>().map_err(|_| ConvertError::ParseError {
            file: file_label.to_string(),
            line,
            reason: format!("malformed numeric token '{s}'"),
        })
    };

    Ok((parse_one(parts[0])?, parse_one(parts[1])?, parse_one(parts[2])?))
}

/// Best-effort scan of every whitespace-separated arg: any token that
/// *looks* like a slash-triple must parse cleanly, so malformed numeric
/// data fails the whole file immediately rather than being silently
/// carried forward as a string.
fn validate_numeric_args(args: &[String], file_label: &str, line: usize) -> Result<()> {
    for arg in args {
        if arg.contains('/') && arg.splitn(2, '/').next().map(looks_numeric).unwrap_or(false) {
            parse_vector_arg(arg, file_label, line)?;
        }
    }
    Ok(())
}

fn looks_numeric(token: &str) -> bool {
    let token = token.strip_prefix('-').unwrap_or(token);
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}
