//! Restricted parser for Python literal syntax.
//!
//! The legacy migration evaluated `attrs` attribute values with a full
//! interpreter. This parser accepts only literals (strings, numbers,
//! booleans, `None`, lists, tuples, dicts), which covers every well-formed
//! `attrs` value while never executing code.

use anyhow::{Result, anyhow, bail};

#[derive(Debug, Clone, PartialEq)]
pub enum PyValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<PyValue>),
    Tuple(Vec<PyValue>),
    Dict(Vec<(PyValue, PyValue)>),
}

impl PyValue {
    /// Renders the value the way Python's `repr` would for simple literals.
    pub fn repr(&self) -> String {
        match self {
            Self::Str(value) => format!("'{value}'"),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    format!("{value:.1}")
                } else {
                    value.to_string()
                }
            }
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::None => "None".to_string(),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(PyValue::repr).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(PyValue::repr).collect();
                if items.len() == 1 {
                    format!("({},)", inner[0])
                } else {
                    format!("({})", inner.join(", "))
                }
            }
            Self::Dict(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.repr(), value.repr()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }

    /// Renders the value the way Python's `str` would inside an f-string:
    /// strings come out bare, everything else falls back to `repr`.
    pub fn as_bare(&self) -> String {
        match self {
            Self::Str(value) => value.clone(),
            other => other.repr(),
        }
    }
}

/// Parses a single Python literal. Trailing non-whitespace input is an error.
pub fn parse(source: &str) -> Result<PyValue> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if let Some(extra) = parser.peek() {
        bail!("unexpected trailing `{extra}` at offset {}", parser.pos);
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let item = self.peek();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(found) if found == expected => Ok(()),
            Some(found) => bail!("expected `{expected}` but found `{found}` at offset {}", self.pos - 1),
            None => bail!("expected `{expected}` but input ended"),
        }
    }

    fn parse_value(&mut self) -> Result<PyValue> {
        match self.peek() {
            Some('{') => self.parse_dict(),
            Some('[') => Ok(PyValue::List(self.parse_sequence('[', ']')?)),
            Some('(') => Ok(PyValue::Tuple(self.parse_sequence('(', ')')?)),
            Some(quote @ ('\'' | '"')) => self.parse_string(quote),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() => self.parse_keyword(),
            Some(c) => bail!("unexpected `{c}` at offset {}", self.pos),
            None => bail!("unexpected end of input"),
        }
    }

    fn parse_dict(&mut self) -> Result<PyValue> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let key = self.parse_value()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => bail!("expected `,` or `}}` but found `{c}` at offset {}", self.pos),
                None => bail!("unterminated dict"),
            }
        }
        Ok(PyValue::Dict(entries))
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Result<Vec<PyValue>> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                break;
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    bail!("expected `,` or `{close}` but found `{c}` at offset {}", self.pos)
                }
                None => bail!("unterminated sequence"),
            }
        }
        Ok(items)
    }

    fn parse_string(&mut self, quote: char) -> Result<PyValue> {
        self.expect(quote)?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => value.push(c),
                    // Python keeps unknown escapes verbatim.
                    Some(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => bail!("unterminated string escape"),
                },
                Some(c) => value.push(c),
                None => bail!("unterminated string literal"),
            }
        }
        Ok(PyValue::Str(value))
    }

    fn parse_number(&mut self) -> Result<PyValue> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut saw_float_marker = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => self.pos += 1,
                '.' => {
                    saw_float_marker = true;
                    self.pos += 1;
                }
                'e' | 'E' => {
                    saw_float_marker = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some('-' | '+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if !saw_float_marker {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(PyValue::Int(value));
            }
        }
        text.parse::<f64>()
            .map(PyValue::Float)
            .map_err(|_| anyhow!("invalid number literal `{text}` at offset {start}"))
    }

    fn parse_keyword(&mut self) -> Result<PyValue> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(PyValue::Bool(true)),
            "False" => Ok(PyValue::Bool(false)),
            "None" => Ok(PyValue::None),
            _ => bail!("unknown identifier `{word}` at offset {start}"),
        }
    }
}
