//! Filter expressions and their rendering into the PuppetDB query language.
//!
//! A [`FilterExpression`] is compiled into a [`QueryAst`] and then encoded
//! into query string parameters for a given [`ApiVersion`].

pub mod ast;
pub mod dialect;
pub mod errors;
pub mod filter;
mod parse;

pub use ast::{compile, QueryAst};
pub use dialect::{encode_parameter, ApiVersion, Order, OrderBy, QueryParams};
pub use errors::QueryError;
pub use filter::{Chain, ChainOp, Comparison, FilterExpression, Sign};
