//! Splitting of Windows command lines stored in vendor metadata.

use std::path::PathBuf;

/// Splits a command line such as `"C:\Program Files\X\unins000.exe" /SILENT`
/// into program and arguments.
///
/// Unquoted programs containing spaces are recognized when they end in
/// `.exe`. Returns `None` for blank input.
pub fn split_command_line(line: &str) -> Option<(PathBuf, Vec<String>)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (program, rest) = if let Some(stripped) = line.strip_prefix('"') {
        let end = stripped.find('"')?;
        (&stripped[..end], &stripped[end + 1..])
    } else if let Some(idx) = line.to_ascii_lowercase().find(".exe") {
        let end = idx + ".exe".len();
        (&line[..end], &line[end..])
    } else {
        match line.split_once(char::is_whitespace) {
            Some((program, rest)) => (program, rest),
            None => (line, ""),
        }
    };

    let program = program.trim();
    if program.is_empty() {
        return None;
    }
    Some((PathBuf::from(program), split_args(rest)))
}

/// Splits arguments on whitespace, honouring double quotes.
pub(crate) fn split_args(rest: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in rest.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}
