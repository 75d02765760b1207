use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::errors::QueryError;

/// Comparison operator of a leaf filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sign {
    Equal,
    NotEqual,
    Match,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Sign {
    pub fn token(&self) -> &'static str {
        match self {
            Sign::Equal => "=",
            Sign::NotEqual => "!=",
            Sign::Match => "~",
            Sign::LessThan => "<",
            Sign::LessThanOrEqual => "<=",
            Sign::GreaterThan => ">",
            Sign::GreaterThanOrEqual => ">=",
        }
    }
}

impl FromStr for Sign {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Sign::Equal),
            "!=" => Ok(Sign::NotEqual),
            "~" => Ok(Sign::Match),
            "<" => Ok(Sign::LessThan),
            "<=" => Ok(Sign::LessThanOrEqual),
            ">" => Ok(Sign::GreaterThan),
            ">=" => Ok(Sign::GreaterThanOrEqual),
            _ => Err(QueryError::UnknownSign(s.to_string())),
        }
    }
}

impl TryFrom<String> for Sign {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sign> for String {
    fn from(sign: Sign) -> Self {
        sign.token().to_string()
    }
}

impl std::fmt::Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Boolean operator joining the children of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChainOp {
    And,
    Or,
    Not,
}

impl ChainOp {
    pub fn token(&self) -> &'static str {
        match self {
            ChainOp::And => "and",
            ChainOp::Or => "or",
            ChainOp::Not => "not",
        }
    }
}

impl FromStr for ChainOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "and" => Ok(ChainOp::And),
            "or" => Ok(ChainOp::Or),
            "not" => Ok(ChainOp::Not),
            _ => Err(QueryError::UnknownChainOperator(s.to_string())),
        }
    }
}

impl TryFrom<String> for ChainOp {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainOp> for String {
    fn from(op: ChainOp) -> Self {
        op.token().to_string()
    }
}

impl std::fmt::Display for ChainOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Leaf filter: `column sign expression`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    sign: Sign,
    column: String,
    expression: Value,
}

impl Comparison {
    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn expression(&self) -> &Value {
        &self.expression
    }
}

/// Operator node over an ordered list of child filters.
///
/// The operator is fixed at construction. Chains may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    operator: ChainOp,
    #[serde(default)]
    filters: Vec<FilterExpression>,
}

impl Chain {
    pub fn op(&self) -> ChainOp {
        self.operator
    }

    pub fn children(&self) -> &[FilterExpression] {
        &self.filters
    }
}

/// Store independent boolean filter tree.
///
/// The JSON form is tagged by `type`:
/// `{"type":"comparison","sign":"=","column":"type","expression":"Class"}` or
/// `{"type":"chain","operator":"and","filters":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterExpression {
    Comparison(Comparison),
    Chain(Chain),
}

impl FilterExpression {
    pub fn compare(sign: Sign, column: impl Into<String>, expression: impl Into<Value>) -> Self {
        FilterExpression::Comparison(Comparison {
            sign,
            column: column.into(),
            expression: expression.into(),
        })
    }

    pub fn equals(column: impl Into<String>, expression: impl Into<Value>) -> Self {
        Self::compare(Sign::Equal, column, expression)
    }

    pub fn chain(op: ChainOp, children: Vec<FilterExpression>) -> Self {
        FilterExpression::Chain(Chain {
            operator: op,
            filters: children,
        })
    }

    pub fn and(children: Vec<FilterExpression>) -> Self {
        Self::chain(ChainOp::And, children)
    }

    pub fn or(children: Vec<FilterExpression>) -> Self {
        Self::chain(ChainOp::Or, children)
    }

    pub fn negation(children: Vec<FilterExpression>) -> Self {
        Self::chain(ChainOp::Not, children)
    }

    /// A chain without children filters nothing
    pub fn is_empty(&self) -> bool {
        match self {
            FilterExpression::Chain(chain) => chain.filters.is_empty(),
            FilterExpression::Comparison(_) => false,
        }
    }

    /// Combine with `other` under AND, appending to an existing AND chain
    /// instead of nesting a new one.
    pub fn and_with(self, other: FilterExpression) -> Self {
        match self {
            FilterExpression::Chain(Chain {
                operator: ChainOp::And,
                mut filters,
            }) => {
                filters.push(other);
                Self::and(filters)
            }
            filter => Self::and(vec![filter, other]),
        }
    }

    /// Whether every row matching this filter has `column` pinned to one
    /// value, i.e. an equality on `column` reachable through AND chains only.
    pub fn pins_column(&self, column: &str) -> bool {
        match self {
            FilterExpression::Comparison(cmp) => {
                cmp.sign == Sign::Equal && cmp.column == column
            }
            FilterExpression::Chain(chain) => {
                chain.operator == ChainOp::And
                    && chain.filters.iter().any(|f| f.pins_column(column))
            }
        }
    }
}

impl FromStr for FilterExpression {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_filter(s)
    }
}
