//! Text KeyValues ("VDF") parser.
//!
//! Steam's `libraryfolders.vdf` and `appmanifest_*.acf` files use this
//! dialect: quoted or bare tokens, `{ }` nested objects, `//` comments and
//! optional `[$PLATFORM]` conditionals (ignored).

use std::fs;
use std::path::Path;

use crate::SteamError;

/// A KeyValues node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vdf {
    Str(String),
    Obj(VdfObject),
}

/// An ordered list of key/value pairs. Key lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VdfObject {
    entries: Vec<(String, Vdf)>,
}

impl VdfObject {
    /// Returns the first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Vdf> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Vdf::Str(s) => Some(s),
            Vdf::Obj(_) => None,
        }
    }

    pub fn get_obj(&self, key: &str) -> Option<&VdfObject> {
        match self.get(key)? {
            Vdf::Obj(o) => Some(o),
            Vdf::Str(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vdf)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads and parses a text VDF file.
pub fn load_vdf(path: &Path) -> Result<VdfObject, SteamError> {
    let text = fs::read_to_string(path)
        .map_err(|e| SteamError::Vdf(format!("failed to read {}: {e}", path.display())))?;
    parse_vdf(&text)
}

/// Parses a text VDF document into its root object.
pub fn parse_vdf(text: &str) -> Result<VdfObject, SteamError> {
    let mut parser = Parser {
        chars: text.trim_start_matches('\u{feff}').chars().collect(),
        pos: 0,
    };
    let root = parser.parse_object(false)?;
    Ok(root)
}

#[derive(Debug, PartialEq)]
enum Token {
    Str(String),
    Open,
    Close,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    /// Parses pairs until `}` (when nested) or end of input (at root).
    fn parse_object(&mut self, nested: bool) -> Result<VdfObject, SteamError> {
        let mut obj = VdfObject::default();

        loop {
            let key = match self.next_token()? {
                None if nested => {
                    return Err(SteamError::Vdf("unexpected end of input in object".into()));
                }
                None => return Ok(obj),
                Some(Token::Close) if nested => return Ok(obj),
                Some(Token::Close) => {
                    return Err(SteamError::Vdf(format!(
                        "unbalanced '}}' at offset {}",
                        self.pos
                    )));
                }
                Some(Token::Open) => {
                    return Err(SteamError::Vdf(format!(
                        "expected key, got '{{' at offset {}",
                        self.pos
                    )));
                }
                Some(Token::Str(key)) => key,
            };

            let value = match self.next_token()? {
                Some(Token::Str(s)) => Vdf::Str(s),
                Some(Token::Open) => Vdf::Obj(self.parse_object(true)?),
                Some(Token::Close) | None => {
                    return Err(SteamError::Vdf(format!("missing value for key '{key}'")));
                }
            };

            self.skip_conditional();
            obj.entries.push((key, value));
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, SteamError> {
        self.skip_trivia();
        let Some(&c) = self.chars.get(self.pos) else {
            return Ok(None);
        };

        match c {
            '{' => {
                self.pos += 1;
                Ok(Some(Token::Open))
            }
            '}' => {
                self.pos += 1;
                Ok(Some(Token::Close))
            }
            '"' => self.read_quoted().map(|s| Some(Token::Str(s))),
            _ => Ok(Some(Token::Str(self.read_bare()))),
        }
    }

    /// Skips whitespace and `//` comments.
    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.get(self.pos) {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '/' && self.chars.get(self.pos + 1) == Some(&'/') {
                while let Some(&c) = self.chars.get(self.pos) {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Skips a trailing `[$WIN32]`-style conditional.
    fn skip_conditional(&mut self) {
        let save = self.pos;
        self.skip_trivia();
        if self.chars.get(self.pos) == Some(&'[') {
            while let Some(&c) = self.chars.get(self.pos) {
                self.pos += 1;
                if c == ']' {
                    return;
                }
            }
        }
        self.pos = save;
    }

    fn read_quoted(&mut self) -> Result<String, SteamError> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut out = String::new();

        while let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let Some(&escaped) = self.chars.get(self.pos) else {
                        break;
                    };
                    self.pos += 1;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                _ => out.push(c),
            }
        }

        Err(SteamError::Vdf(format!(
            "unterminated string starting at offset {start}"
        )))
    }

    fn read_bare(&mut self) -> String {
        let start = self.pos;
        while let Some(&c) = self.chars.get(self.pos) {
            if c.is_whitespace() || matches!(c, '{' | '}' | '"') {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}
