use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// One fact of one node as returned by the facts endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    pub certname: String,
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub environment: Option<String>,
}

/// Facts per node, ordered by certname
pub type HostFactMap = BTreeMap<String, Map<String, Value>>;

/// Structured fact values may arrive JSON-encoded inside a string. Strings
/// wrapped in `{}`, `[]` or `""` are decoded; other values, and strings that
/// fail to decode, are kept as is.
pub fn coerce_value(value: Value) -> Value {
    let raw = match value {
        Value::String(raw) => raw,
        other => return other,
    };
    let looks_encoded = raw.len() >= 2
        && ((raw.starts_with('{') && raw.ends_with('}'))
            || (raw.starts_with('[') && raw.ends_with(']'))
            || (raw.starts_with('"') && raw.ends_with('"')));
    if !looks_encoded {
        return Value::String(raw);
    }
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// Fold fact rows into a per-node map, sorted by certname once all rows are in
pub fn assemble_facts(rows: Vec<FactRow>) -> HostFactMap {
    let mut hosts: HashMap<String, Map<String, Value>> = HashMap::new();
    for row in rows {
        hosts
            .entry(row.certname)
            .or_default()
            .insert(row.name, coerce_value(row.value));
    }
    hosts.into_iter().collect()
}
