use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::api::PuppetDbApi;
use crate::errors::PdbError;
use crate::resources::{ResourceRow, RESOURCE_COLUMNS};
use crate::transport::Transport;
use crate::Result;

/// Facts that change between runs and would make every import look modified
static VOLATILE_FACTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:memoryfree|swapfree|uptime)").expect("volatile fact pattern is valid")
});

/// What an inventory import lists: one record per node, or the resources of
/// one type (`@@Type` for exported ones)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventorySource {
    Nodes,
    Resources(String),
}

/// One node with its classes and stable facts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRecord {
    pub certname: String,
    pub classes: Vec<String>,
    pub facts: Map<String, Value>,
}

/// Every node that has facts, in certname order, with its classes and
/// without volatile facts. Nodes without classes get an empty class list.
pub fn fetch_inventory<T: Transport>(api: &PuppetDbApi<T>) -> Result<Vec<HostRecord>> {
    tracing::debug!("Fetching classes");
    let mut classes = api.classes()?;
    tracing::debug!("Fetching facts");
    let facts = api.fetch_facts(None)?;

    let records: Vec<HostRecord> = facts
        .into_iter()
        .map(|(certname, mut host_facts)| {
            host_facts.retain(|name, _| !VOLATILE_FACTS.is_match(name));
            HostRecord {
                classes: classes.swap_remove(&certname).unwrap_or_default(),
                certname,
                facts: host_facts,
            }
        })
        .collect();

    tracing::info!("Assembled inventory of {} nodes", records.len());
    Ok(records)
}

/// Resources of `resource_type` on every node
pub fn fetch_resource_inventory<T: Transport>(
    api: &PuppetDbApi<T>,
    resource_type: &str,
) -> Result<Vec<ResourceRow>> {
    tracing::debug!("Fetching {} resources", resource_type);
    api.fetch_resources_by_type(resource_type, None)
}

/// Columns of an inventory record, with one `facts.<name>` per known fact
pub fn list_columns<T: Transport>(api: &PuppetDbApi<T>) -> Result<Vec<String>> {
    let mut columns = vec![
        "certname".to_string(),
        "classes".to_string(),
        "facts".to_string(),
    ];
    columns.extend(
        api.list_fact_names()?
            .into_iter()
            .map(|name| format!("facts.{}", name)),
    );
    Ok(columns)
}

/// Columns of a resource inventory record
pub fn list_resource_columns() -> Vec<String> {
    RESOURCE_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl InventorySource {
    pub fn columns<T: Transport>(&self, api: &PuppetDbApi<T>) -> Result<Vec<String>> {
        match self {
            InventorySource::Nodes => list_columns(api),
            InventorySource::Resources(_) => Ok(list_resource_columns()),
        }
    }

    /// Records of this source as JSON objects keyed by [`Self::columns`]
    pub fn fetch<T: Transport>(&self, api: &PuppetDbApi<T>) -> Result<Vec<Value>> {
        match self {
            InventorySource::Nodes => to_values(fetch_inventory(api)?),
            InventorySource::Resources(resource_type) => {
                to_values(fetch_resource_inventory(api, resource_type)?)
            }
        }
    }
}

fn to_values<R: Serialize>(records: Vec<R>) -> Result<Vec<Value>> {
    records
        .into_iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|e| {
                PdbError::MalformedResponse(format!("Failed to serialize inventory record: {}", e))
            })
        })
        .collect()
}
