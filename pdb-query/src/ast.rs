use serde::Serialize;
use serde_json::Value;

use crate::filter::FilterExpression;

/// Nested-array query in the PuppetDB query language, e.g.
/// `["and", ["=", "type", "Class"], ["~", "title", "^Nginx"]]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryAst {
    List(Vec<QueryAst>),
    Atom(Value),
}

impl QueryAst {
    /// `[op, operands...]`
    pub fn op(token: &str, operands: Vec<QueryAst>) -> Self {
        let mut parts = Vec::with_capacity(operands.len() + 1);
        parts.push(QueryAst::atom(token));
        parts.extend(operands);
        QueryAst::List(parts)
    }

    pub fn atom(value: impl Into<Value>) -> Self {
        QueryAst::Atom(value.into())
    }

    /// `[sign, column, expression]`
    pub fn comparison(sign: &str, column: &str, expression: impl Into<Value>) -> Self {
        QueryAst::op(
            sign,
            vec![QueryAst::atom(column), QueryAst::Atom(expression.into())],
        )
    }

    /// `["and", extra, query]`; neither operand is modified
    pub fn and(extra: QueryAst, query: QueryAst) -> Self {
        QueryAst::op("and", vec![extra, query])
    }

    /// `["extract", [columns...], query]`
    pub fn extract<S: AsRef<str>>(columns: &[S], query: QueryAst) -> Self {
        let columns = columns
            .iter()
            .map(|c| QueryAst::atom(c.as_ref()))
            .collect();
        QueryAst::op("extract", vec![QueryAst::List(columns), query])
    }

    pub fn to_json(&self) -> Value {
        match self {
            QueryAst::List(items) => Value::Array(items.iter().map(QueryAst::to_json).collect()),
            QueryAst::Atom(value) => value.clone(),
        }
    }
}

impl std::fmt::Display for QueryAst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Render a filter tree into the query language.
///
/// Comparisons become `[sign, column, expression]`, chains become
/// `[op, children...]` with children in their original order. Column names
/// are not validated, the server rejects unknown ones.
pub fn compile(filter: &FilterExpression) -> QueryAst {
    match filter {
        FilterExpression::Comparison(cmp) => {
            QueryAst::comparison(cmp.sign().token(), cmp.column(), cmp.expression().clone())
        }
        FilterExpression::Chain(chain) => QueryAst::op(
            chain.op().token(),
            chain.children().iter().map(compile).collect(),
        ),
    }
}
