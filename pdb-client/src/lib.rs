//! Blocking PuppetDB client: mutually authenticated HTTPS transport,
//! paginated fetching and assembly of classes, facts and resources.

pub mod api;
pub mod commands;
pub mod config;
pub mod errors;
pub mod facts;
pub mod inventory;
pub mod paginate;
pub mod resources;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::PuppetDbApi;
pub use commands::PuppetDbCommands;
pub use config::Config;
pub use errors::PdbError;
pub use pdb_query::{ApiVersion, FilterExpression};
pub use transport::{HttpsTransport, Method, Transport};

pub type Result<T> = std::result::Result<T, PdbError>;
