//! Query-string filter syntax: `name=kernel|name=osfamily`,
//! `type=File&!(title~^/tmp)`. `&` binds tighter than `|`, `!` negates the
//! following term and parentheses group. Values are percent-decoded.

use serde_json::Value;

use crate::errors::QueryError;
use crate::filter::{FilterExpression, Sign};

const SPECIAL: &[u8] = b"&|!()=<>~";

pub(crate) fn parse_filter(input: &str) -> Result<FilterExpression, QueryError> {
    let mut parser = Parser {
        input: input.trim(),
        pos: 0,
    };
    let filter = parser.parse_or()?;
    if parser.pos < parser.input.len() {
        return Err(QueryError::Parse(format!(
            "unexpected '{}' at position {} in {}",
            &parser.input[parser.pos..],
            parser.pos,
            parser.input
        )));
    }
    Ok(filter)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<FilterExpression, QueryError> {
        let mut parts = vec![self.parse_and()?];
        while self.eat(b'|') {
            parts.push(self.parse_and()?);
        }
        Ok(collapse(parts, FilterExpression::or))
    }

    fn parse_and(&mut self) -> Result<FilterExpression, QueryError> {
        let mut parts = vec![self.parse_unary()?];
        while self.eat(b'&') {
            parts.push(self.parse_unary()?);
        }
        Ok(collapse(parts, FilterExpression::and))
    }

    fn parse_unary(&mut self) -> Result<FilterExpression, QueryError> {
        if self.eat(b'!') {
            let inner = self.parse_unary()?;
            return Ok(FilterExpression::negation(vec![inner]));
        }
        if self.eat(b'(') {
            let inner = self.parse_or()?;
            if !self.eat(b')') {
                return Err(QueryError::Parse(format!(
                    "missing ')' at position {} in {}",
                    self.pos, self.input
                )));
            }
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<FilterExpression, QueryError> {
        let column = self.take_word();
        if column.is_empty() {
            return Err(QueryError::Parse(format!(
                "expected column at position {} in {}",
                self.pos, self.input
            )));
        }
        let sign = self.take_sign()?;
        let raw = self.take_word();
        let value = urlencoding::decode(raw)
            .map_err(|e| QueryError::Parse(format!("invalid percent-encoding in {}: {}", raw, e)))?;
        Ok(FilterExpression::compare(
            sign,
            column,
            Value::String(value.into_owned()),
        ))
    }

    fn take_word(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if SPECIAL.contains(&byte) {
                break;
            }
            self.pos += 1;
        }
        input[start..self.pos].trim()
    }

    fn take_sign(&mut self) -> Result<Sign, QueryError> {
        let input = self.input;
        let rest = &input[self.pos..];
        for token in ["!=", "<=", ">=", "=", "<", ">", "~"] {
            if rest.starts_with(token) {
                self.pos += token.len();
                return token.parse();
            }
        }
        Err(QueryError::Parse(format!(
            "expected comparison sign at position {} in {}",
            self.pos, self.input
        )))
    }
}

fn collapse(
    mut parts: Vec<FilterExpression>,
    chain: fn(Vec<FilterExpression>) -> FilterExpression,
) -> FilterExpression {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        chain(parts)
    }
}
