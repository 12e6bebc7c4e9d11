//! Kubernetes label selectors in their string form, e.g.
//! `tier=frontend,env in (prod,staging),!canary`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const MAX_NAME_LENGTH: usize = 63;
const MAX_PREFIX_LENGTH: usize = 253;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("found {found} at position {pos}, expected {expected}")]
    Unexpected {
        found: String,
        pos: usize,
        expected: &'static str,
    },

    #[error("invalid label key {0:?}")]
    InvalidKey(String),

    #[error("invalid label value {0:?}")]
    InvalidValue(String),

    #[error("operator '{operator}' requires an integer value, got {value:?}")]
    NotAnInteger { operator: Operator, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Exists,
    DoesNotExist,
    Equals,
    DoubleEquals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => write!(f, "exists"),
            Self::DoesNotExist => write!(f, "!"),
            Self::Equals => write!(f, "="),
            Self::DoubleEquals => write!(f, "=="),
            Self::NotEquals => write!(f, "!="),
            Self::In => write!(f, "in"),
            Self::NotIn => write!(f, "notin"),
            Self::GreaterThan => write!(f, ">"),
            Self::LessThan => write!(f, "<"),
        }
    }
}

/// A single `key <op> values` term of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
            Operator::Equals | Operator::DoubleEquals | Operator::In => value.is_some_and(|v| self.values.contains(v)),
            Operator::NotEquals | Operator::NotIn => !value.is_some_and(|v| self.values.contains(v)),
            Operator::GreaterThan | Operator::LessThan => {
                let Some(actual) = value.and_then(|v| v.parse::<i64>().ok()) else {
                    return false;
                };
                let Some(bound) = self.values.iter().next().and_then(|v| v.parse::<i64>().ok())
                else {
                    return false;
                };
                if self.operator == Operator::GreaterThan {
                    actual > bound
                } else {
                    actual < bound
                }
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.values.iter().next().map(String::as_str).unwrap_or("");
        match self.operator {
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
            Operator::Equals => write!(f, "{}={first}", self.key),
            Operator::DoubleEquals => write!(f, "{}=={first}", self.key),
            Operator::NotEquals => write!(f, "{}!={first}", self.key),
            Operator::GreaterThan => write!(f, "{}>{first}", self.key),
            Operator::LessThan => write!(f, "{}<{first}", self.key),
            Operator::In | Operator::NotIn => {
                let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
                write!(f, "{} {} ({})", self.key, self.operator, values.join(","))
            }
        }
    }
}

/// A conjunction of requirements. The empty selector matches every label set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let tokens = lex(input);
        let mut parser = Parser { tokens, idx: 0 };
        let mut requirements = parser.parse()?;
        requirements.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(Self { requirements })
    }

    pub fn is_everything(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{requirement}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    Comma,
    OpenParen,
    CloseParen,
    Equals,
    DoubleEquals,
    NotEquals,
    Bang,
    GreaterThan,
    LessThan,
    In,
    NotIn,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "'{s}'"),
            Self::Comma => write!(f, "','"),
            Self::OpenParen => write!(f, "'('"),
            Self::CloseParen => write!(f, "')'"),
            Self::Equals => write!(f, "'='"),
            Self::DoubleEquals => write!(f, "'=='"),
            Self::NotEquals => write!(f, "'!='"),
            Self::Bang => write!(f, "'!'"),
            Self::GreaterThan => write!(f, "'>'"),
            Self::LessThan => write!(f, "'<'"),
            Self::In => write!(f, "'in'"),
            Self::NotIn => write!(f, "'notin'"),
            Self::End => write!(f, "end of input"),
        }
    }
}

fn is_special(c: char) -> bool {
    matches!(c, ',' | '(' | ')' | '=' | '!' | '<' | '>')
}

fn lex(input: &str) -> Vec<(Token, usize)> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let token = match c {
            ',' => Token::Comma,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            '>' => Token::GreaterThan,
            '<' => Token::LessThan,
            '=' | '!' => {
                if chars.next_if(|&(_, n)| n == '=').is_some() {
                    if c == '=' {
                        Token::DoubleEquals
                    } else {
                        Token::NotEquals
                    }
                } else if c == '=' {
                    Token::Equals
                } else {
                    Token::Bang
                }
            }
            _ => {
                let mut ident = String::from(c);
                while let Some((_, n)) = chars.next_if(|&(_, n)| !n.is_whitespace() && !is_special(n)) {
                    ident.push(n);
                }
                match ident.as_str() {
                    "in" => Token::In,
                    "notin" => Token::NotIn,
                    _ => Token::Identifier(ident),
                }
            }
        };
        tokens.push((token, pos));
    }

    tokens.push((Token::End, input.len()));
    tokens
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    idx: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with `End`, and `next` never moves past it.
        &self.tokens[self.idx].0
    }

    fn next(&mut self) -> (Token, usize) {
        let current = self.tokens[self.idx].clone();
        if current.0 != Token::End {
            self.idx += 1;
        }
        current
    }

    fn unexpected<T>(found: Token, pos: usize, expected: &'static str) -> Result<T, SelectorError> {
        Err(SelectorError::Unexpected {
            found: found.to_string(),
            pos,
            expected,
        })
    }

    fn parse(&mut self) -> Result<Vec<Requirement>, SelectorError> {
        let mut requirements = Vec::new();
        if *self.peek() == Token::End {
            return Ok(requirements);
        }
        loop {
            requirements.push(self.requirement()?);
            match self.next() {
                (Token::Comma, _) => continue,
                (Token::End, _) => break,
                (found, pos) => return Self::unexpected(found, pos, "',' or end of input"),
            }
        }
        Ok(requirements)
    }

    fn requirement(&mut self) -> Result<Requirement, SelectorError> {
        let (key, negated) = match self.next() {
            (Token::Bang, _) => match self.next() {
                (Token::Identifier(key), _) => (key, true),
                (found, pos) => return Self::unexpected(found, pos, "label key"),
            },
            (Token::Identifier(key), _) => (key, false),
            (found, pos) => return Self::unexpected(found, pos, "label key or '!'"),
        };
        validate_key(&key)?;

        if negated {
            return Ok(Requirement {
                key,
                operator: Operator::DoesNotExist,
                values: BTreeSet::new(),
            });
        }

        let operator = match self.peek().clone() {
            Token::Comma | Token::End => {
                return Ok(Requirement {
                    key,
                    operator: Operator::Exists,
                    values: BTreeSet::new(),
                })
            }
            Token::Equals => Operator::Equals,
            Token::DoubleEquals => Operator::DoubleEquals,
            Token::NotEquals => Operator::NotEquals,
            Token::In => Operator::In,
            Token::NotIn => Operator::NotIn,
            Token::GreaterThan => Operator::GreaterThan,
            Token::LessThan => Operator::LessThan,
            _ => {
                let (found, pos) = self.next();
                return Self::unexpected(found, pos, "in, notin, =, ==, !=, > or <");
            }
        };
        self.next();

        let values = match operator {
            Operator::In | Operator::NotIn => self.value_set()?,
            Operator::GreaterThan | Operator::LessThan => {
                let value = match self.next() {
                    (Token::Identifier(value), _) => value,
                    (found, pos) => return Self::unexpected(found, pos, "integer value"),
                };
                if value.parse::<i64>().is_err() {
                    return Err(SelectorError::NotAnInteger { operator, value });
                }
                BTreeSet::from([value])
            }
            _ => BTreeSet::from([self.exact_value()?]),
        };

        Ok(Requirement {
            key,
            operator,
            values,
        })
    }

    fn exact_value(&mut self) -> Result<String, SelectorError> {
        match self.peek().clone() {
            Token::Comma | Token::End => Ok(String::new()),
            _ => match self.next() {
                (Token::Identifier(value), _) => {
                    validate_value(&value)?;
                    Ok(value)
                }
                (found, pos) => Self::unexpected(found, pos, "label value"),
            },
        }
    }

    fn value_set(&mut self) -> Result<BTreeSet<String>, SelectorError> {
        match self.next() {
            (Token::OpenParen, _) => {}
            (found, pos) => return Self::unexpected(found, pos, "'('"),
        }

        let mut values = BTreeSet::new();
        let mut expect_value = true;
        loop {
            match self.next() {
                (Token::Identifier(value), _) if expect_value => {
                    validate_value(&value)?;
                    values.insert(value);
                    expect_value = false;
                }
                (Token::Comma, _) => {
                    if expect_value {
                        values.insert(String::new());
                    }
                    expect_value = true;
                }
                (Token::CloseParen, _) => {
                    // `()` is the set holding only the empty value; `(a,)` adds it to `a`.
                    if expect_value {
                        values.insert(String::new());
                    }
                    break;
                }
                (found, pos) => return Self::unexpected(found, pos, "label value, ',' or ')'"),
            }
        }
        Ok(values)
    }
}

fn is_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            s.len() <= MAX_NAME_LENGTH
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

fn is_dns_subdomain(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_PREFIX_LENGTH
        && s.split('.').all(|label| {
            let bytes = label.as_bytes();
            match (bytes.first(), bytes.last()) {
                (Some(first), Some(last)) => {
                    (first.is_ascii_lowercase() || first.is_ascii_digit())
                        && (last.is_ascii_lowercase() || last.is_ascii_digit())
                        && bytes
                            .iter()
                            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
                }
                _ => false,
            }
        })
}

fn validate_key(key: &str) -> Result<(), SelectorError> {
    let valid = match key.split_once('/') {
        Some((prefix, name)) => is_dns_subdomain(prefix) && is_name(name),
        None => is_name(key),
    };
    if valid {
        Ok(())
    } else {
        Err(SelectorError::InvalidKey(key.to_string()))
    }
}

fn validate_value(value: &str) -> Result<(), SelectorError> {
    if value.is_empty() || is_name(value) {
        Ok(())
    } else {
        Err(SelectorError::InvalidValue(value.to_string()))
    }
}
