//! A deliberately tiny statement interpreter.
//!
//! Supports one statement per line:
//!
//! - `print(arg, ...)` with string, number, `True`/`False`/`None` literals
//! - `raise Kind("message")`
//! - `pass`, comments and blank lines
//!
//! Names on the deny list fail with `NameError` exactly as if they did not
//! exist; any other construct is a `SyntaxError`.

use crate::error::ExecError;
use crate::exec::{CodeExecutor, OutputSink};

use std::sync::OnceLock;

use regex::Regex;

/// Primitives the sandbox never exposes.
pub const DENIED_PRIMITIVES: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "open",
    "input",
    "exit",
    "quit",
    "help",
    "setattr",
    "delattr",
    "breakpoint",
    "globals",
    "vars",
    "__import__",
];

const PRINT_PATTERN: &str = r"^print\s*\((?P<args>.*)\)$";
const RAISE_PATTERN: &str = r"^raise\s+(?P<kind>[A-Za-z_][A-Za-z0-9_]*)\s*(?:\((?P<args>.*)\))?$";
const NAME_PATTERN: &str = r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)";
const NUMBER_PATTERN: &str = r"^[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?$";

static PRINT_REGEX: OnceLock<Regex> = OnceLock::new();
static RAISE_REGEX: OnceLock<Regex> = OnceLock::new();
static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();

fn print_regex() -> &'static Regex {
    PRINT_REGEX.get_or_init(|| Regex::new(PRINT_PATTERN).expect("valid regex pattern"))
}

fn raise_regex() -> &'static Regex {
    RAISE_REGEX.get_or_init(|| Regex::new(RAISE_PATTERN).expect("valid regex pattern"))
}

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(NAME_PATTERN).expect("valid regex pattern"))
}

fn number_regex() -> &'static Regex {
    NUMBER_REGEX.get_or_init(|| Regex::new(NUMBER_PATTERN).expect("valid regex pattern"))
}

/// Default [`CodeExecutor`]. Does not touch host state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptExecutor;

impl<H> CodeExecutor<H> for ScriptExecutor {
    fn execute(
        &self,
        _host: &mut H,
        source: &str,
        out: &mut dyn OutputSink,
    ) -> Result<(), ExecError> {
        for (index, raw) in source.lines().enumerate() {
            let line_number = index + 1;
            let statement = raw.trim();

            if statement.is_empty() || statement.starts_with('#') || statement == "pass" {
                continue;
            }

            if let Some(captures) = print_regex().captures(statement) {
                let args = captures.name("args").map_or("", |m| m.as_str());
                let rendered = split_args(args, line_number)?
                    .into_iter()
                    .map(|arg| render_literal(arg, line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                out.write(&format!("{}\n", rendered.join(" ")));
                continue;
            }

            if let Some(captures) = raise_regex().captures(statement) {
                let kind = captures.name("kind").map_or("Exception", |m| m.as_str());
                let message = match captures.name("args").map(|m| m.as_str().trim()) {
                    None | Some("") => String::new(),
                    Some(arg) => match parse_string(arg) {
                        Some(message) => message,
                        None => render_literal(arg, line_number)?,
                    },
                };
                return Err(ExecError::new(kind, message));
            }

            check_denied(statement)?;
            return Err(syntax_error(line_number));
        }

        Ok(())
    }
}

fn syntax_error(line_number: usize) -> ExecError {
    ExecError::new("SyntaxError", format!("invalid syntax (line {line_number})"))
}

fn name_error(name: &str) -> ExecError {
    ExecError::new("NameError", format!("name '{name}' is not defined"))
}

/// Fails with `NameError` if `text` starts with a denied name.
fn check_denied(text: &str) -> Result<(), ExecError> {
    let leading = name_regex()
        .captures(text)
        .and_then(|captures| captures.name("name"))
        .map(|m| m.as_str());

    match leading {
        Some(name) if DENIED_PRIMITIVES.contains(&name) => Err(name_error(name)),
        _ => Ok(()),
    }
}

/// Splits call arguments on top-level commas, respecting quotes.
fn split_args(args: &str, line_number: usize) -> Result<Vec<&str>, ExecError> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, ch) in args.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == ',' => {
                parts.push(args[start..offset].trim());
                start = offset + 1;
            }
            None => {}
        }
    }

    if quote.is_some() {
        return Err(ExecError::new(
            "SyntaxError",
            format!("unterminated string literal (line {line_number})"),
        ));
    }

    let last = args[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    // `print(a, )` is allowed, `print(a, , b)` is not.
    if parts.len() > 1 && parts[parts.len() - 1].is_empty() {
        parts.pop();
    }
    if parts.iter().any(|part| part.is_empty()) {
        return Err(syntax_error(line_number));
    }
    Ok(parts)
}

/// Decodes a quoted string literal, handling the common escapes.
fn parse_string(literal: &str) -> Option<String> {
    let quote = literal.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = literal.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            if ch == quote {
                return None;
            }
            decoded.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => decoded.push('\n'),
            't' => decoded.push('\t'),
            '\\' => decoded.push('\\'),
            '\'' => decoded.push('\''),
            '"' => decoded.push('"'),
            other => {
                decoded.push('\\');
                decoded.push(other);
            }
        }
    }
    Some(decoded)
}

/// Renders a literal the way `print` shows it.
fn render_literal(arg: &str, line_number: usize) -> Result<String, ExecError> {
    if let Some(text) = parse_string(arg) {
        return Ok(text);
    }
    match arg {
        "True" | "False" | "None" => return Ok(arg.to_string()),
        _ => {}
    }
    if number_regex().is_match(arg) {
        return Ok(render_number(arg));
    }
    if let Some(name) = name_regex()
        .captures(arg)
        .and_then(|captures| captures.name("name"))
    {
        return Err(name_error(name.as_str()));
    }
    Err(syntax_error(line_number))
}

fn render_number(literal: &str) -> String {
    if let Ok(integer) = literal.parse::<i64>() {
        return integer.to_string();
    }
    match literal.parse::<f64>() {
        Ok(float) if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e16 => {
            format!("{float:.1}")
        }
        Ok(float) => float.to_string(),
        Err(_) => literal.to_string(),
    }
}
