use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ast::QueryAst;
use crate::errors::QueryError;

/// PuppetDB query API version. Fixed for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ApiVersion {
    V1,
    V2,
    V3,
    V4,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 4] = [ApiVersion::V4, ApiVersion::V3, ApiVersion::V2, ApiVersion::V1];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
            ApiVersion::V3 => "v3",
            ApiVersion::V4 => "v4",
        }
    }

    /// Path prefix of the query endpoints
    pub fn base_path(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "",
            ApiVersion::V2 => "/v2",
            ApiVersion::V3 => "/v3",
            ApiVersion::V4 => "/pdb/query/v4",
        }
    }

    /// Path prefix of the command endpoint, only served by v4 servers
    pub fn command_path(&self) -> Option<&'static str> {
        match self {
            ApiVersion::V4 => Some("/pdb/cmd/v1"),
            _ => None,
        }
    }

    /// Wire name of the ordering parameter
    pub fn order_param(&self) -> &'static str {
        match self {
            ApiVersion::V4 => "order_by",
            _ => "order-by",
        }
    }

    /// Resource queries must project their columns with `extract`
    pub fn requires_extract(&self) -> bool {
        matches!(self, ApiVersion::V4)
    }

    /// `extract` with `function`/`group_by` aggregates
    pub fn supports_aggregation(&self) -> bool {
        matches!(self, ApiVersion::V4)
    }

    pub fn supports_fact_names(&self) -> bool {
        !matches!(self, ApiVersion::V1)
    }
}

impl FromStr for ApiVersion {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(ApiVersion::V1),
            "v2" => Ok(ApiVersion::V2),
            "v3" => Ok(ApiVersion::V3),
            "v4" => Ok(ApiVersion::V4),
            _ => Err(QueryError::UnknownApiVersion(s.to_string())),
        }
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> Self {
        version.as_str().to_string()
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

/// One entry of an ordering parameter; earlier entries take precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub order: Order,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        OrderBy {
            field: field.to_string(),
            order: Order::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        OrderBy {
            field: field.to_string(),
            order: Order::Desc,
        }
    }
}

/// `key=<percent-encoded JSON of value>`
pub fn encode_parameter<T: Serialize + ?Sized>(
    key: &str,
    value: &T,
) -> Result<String, QueryError> {
    let json = serde_json::to_string(value)
        .map_err(|e| QueryError::Encode(format!("{}: {}", key, e)))?;
    Ok(format!("{}={}", key, urlencoding::encode(&json)))
}

/// Query string of a query endpoint request, without the pagination window
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    version: ApiVersion,
    query: Option<QueryAst>,
    order: Vec<OrderBy>,
}

impl QueryParams {
    pub fn new(version: ApiVersion) -> Self {
        QueryParams {
            version,
            query: None,
            order: Vec::new(),
        }
    }

    pub fn query(mut self, query: QueryAst) -> Self {
        self.query = Some(query);
        self
    }

    pub fn order_by(mut self, order: Vec<OrderBy>) -> Self {
        self.order = order;
        self
    }

    /// Encoded parameters joined by `&`, empty if there are none
    pub fn encode(&self) -> Result<String, QueryError> {
        let mut params = Vec::new();
        if let Some(query) = &self.query {
            params.push(encode_parameter("query", query)?);
        }
        if !self.order.is_empty() {
            params.push(encode_parameter(self.version.order_param(), &self.order)?);
        }
        Ok(params.join("&"))
    }

    /// `endpoint` with the encoded parameters appended
    pub fn to_path(&self, endpoint: &str) -> Result<String, QueryError> {
        let encoded = self.encode()?;
        if encoded.is_empty() {
            Ok(endpoint.to_string())
        } else {
            Ok(format!("{}?{}", endpoint, encoded))
        }
    }
}
