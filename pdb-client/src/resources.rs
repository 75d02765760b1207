use indexmap::IndexMap;
use pdb_query::{compile, ApiVersion, FilterExpression, OrderBy, QueryAst};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Columns projected from resource queries on dialects that need `extract`
pub const RESOURCE_COLUMNS: [&str; 6] = [
    "certname",
    "type",
    "title",
    "exported",
    "parameters",
    "environment",
];

const EXPORTED_PREFIX: &str = "@@";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub certname: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub title: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub environment: Option<String>,
}

/// Only the columns class grouping needs; the rest of the row is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ClassRow {
    pub certname: String,
    pub title: String,
}

/// Result row of the resource type aggregate query
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceTypeCount {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub exported: bool,
    pub count: u64,
}

impl ResourceTypeCount {
    /// `@@File` for exported resources, `File` otherwise
    pub fn key(&self) -> String {
        if self.exported {
            format!("{}{}", EXPORTED_PREFIX, self.resource_type)
        } else {
            self.resource_type.clone()
        }
    }

    /// `@@File (3)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.key(), self.count)
    }
}

/// Class titles per node, both in the order the store returned them
pub type HostClassMap = IndexMap<String, Vec<String>>;

pub fn group_classes(rows: Vec<ClassRow>) -> HostClassMap {
    let mut classes = HostClassMap::new();
    for row in rows {
        classes.entry(row.certname).or_default().push(row.title);
    }
    classes
}

/// Map resource type keys to their display labels, keeping query order
pub fn type_labels(counts: &[ResourceTypeCount]) -> IndexMap<String, String> {
    counts.iter().map(|c| (c.key(), c.label())).collect()
}

/// Split the `@@Type` shorthand into the bare type and its exported flag
pub fn split_exported_type(resource_type: &str) -> (&str, bool) {
    match resource_type.strip_prefix(EXPORTED_PREFIX) {
        Some(bare) => (bare, true),
        None => (resource_type, false),
    }
}

/// Query for a resource listing: the filter, the exported predicate ANDed in
/// front of it and, where the dialect needs it, the column projection.
/// `None` when there is nothing to filter on.
pub fn resource_query(
    version: ApiVersion,
    filter: Option<&FilterExpression>,
    exported: Option<bool>,
) -> Option<QueryAst> {
    let compiled = filter.filter(|f| !f.is_empty()).map(compile);
    let exported = exported.map(|flag| QueryAst::comparison("=", "exported", flag));

    let query = match (exported, compiled) {
        (Some(exported), Some(compiled)) => QueryAst::and(exported, compiled),
        (Some(exported), None) => exported,
        (None, Some(compiled)) => compiled,
        (None, None) => return None,
    };

    if version.requires_extract() {
        Some(QueryAst::extract(&RESOURCE_COLUMNS, query))
    } else {
        Some(query)
    }
}

/// Exported resources first unless the caller pinned the flag, then by
/// title alone when the filter fixes the type, else by type and title.
pub fn resource_order(filter: Option<&FilterExpression>, exported: Option<bool>) -> Vec<OrderBy> {
    let mut order = Vec::new();
    if exported.is_none() {
        order.push(OrderBy::desc("exported"));
    }
    if !filter.is_some_and(|f| f.pins_column("type")) {
        order.push(OrderBy::asc("type"));
    }
    order.push(OrderBy::asc("title"));
    order
}

/// Count of resources per (type, exported) pair with a non-empty type
pub fn type_count_query() -> QueryAst {
    QueryAst::op(
        "extract",
        vec![
            QueryAst::atom(json!([["function", "count"], "type", "exported"])),
            QueryAst::comparison("~", "type", "."),
            QueryAst::atom(json!(["group_by", "type", "exported"])),
        ],
    )
}

pub fn type_count_order() -> Vec<OrderBy> {
    vec![OrderBy::desc("exported"), OrderBy::asc("type")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_labels() {
        let package = ResourceTypeCount {
            resource_type: "Package".to_string(),
            exported: false,
            count: 42,
        };
        let file = ResourceTypeCount {
            resource_type: "File".to_string(),
            exported: true,
            count: 3,
        };

        assert_eq!(package.label(), "Package (42)");
        assert_eq!(file.key(), "@@File");
        assert_eq!(file.label(), "@@File (3)");

        let labels = type_labels(&[file, package]);
        assert_eq!(labels.keys().collect::<Vec<_>>(), vec!["@@File", "Package"]);
        assert_eq!(labels["Package"], "Package (42)");
    }

    #[test]
    fn test_split_exported_type() {
        assert_eq!(split_exported_type("@@Package"), ("Package", true));
        assert_eq!(split_exported_type("Package"), ("Package", false));
        assert_eq!(split_exported_type("@Package"), ("@Package", false));
    }

    #[test]
    fn test_group_classes_keeps_store_order() {
        let rows = vec![
            ClassRow { certname: "b".into(), title: "Settings".into() },
            ClassRow { certname: "b".into(), title: "Nginx".into() },
            ClassRow { certname: "a".into(), title: "Ssh".into() },
        ];
        let classes = group_classes(rows);

        assert_eq!(classes.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(classes["b"], vec!["Settings", "Nginx"]);
    }

    #[test]
    fn test_resource_query_without_filter() {
        assert_eq!(resource_query(ApiVersion::V4, None, None), None);
        let empty = FilterExpression::and(vec![]);
        assert_eq!(resource_query(ApiVersion::V3, Some(&empty), None), None);
        assert_eq!(
            resource_query(ApiVersion::V3, None, Some(false)).unwrap().to_json(),
            json!(["=", "exported", false])
        );
    }

    #[test]
    fn test_resource_query_v4_projection() {
        let filter = FilterExpression::from_str("type=Nagios_host").unwrap();
        let query = resource_query(ApiVersion::V4, Some(&filter), Some(true)).unwrap();

        assert_eq!(
            query.to_json(),
            json!([
                "extract",
                ["certname", "type", "title", "exported", "parameters", "environment"],
                ["and", ["=", "exported", true], ["=", "type", "Nagios_host"]]
            ])
        );
    }

    #[test]
    fn test_resource_query_older_dialect_unwrapped() {
        let filter = FilterExpression::equals("title", "ntp");
        let query = resource_query(ApiVersion::V3, Some(&filter), None).unwrap();
        assert_eq!(query.to_json(), json!(["=", "title", "ntp"]));
    }

    #[test]
    fn test_resource_order() {
        let by_type = FilterExpression::equals("type", "File");
        let by_title = FilterExpression::equals("title", "ntp");

        assert_eq!(
            resource_order(Some(&by_type), Some(true)),
            vec![OrderBy::asc("title")]
        );
        assert_eq!(
            resource_order(Some(&by_title), Some(false)),
            vec![OrderBy::asc("type"), OrderBy::asc("title")]
        );
        assert_eq!(
            resource_order(None, None),
            vec![OrderBy::desc("exported"), OrderBy::asc("type"), OrderBy::asc("title")]
        );
        assert_eq!(
            resource_order(Some(&by_type), None),
            vec![OrderBy::desc("exported"), OrderBy::asc("title")]
        );
    }

    #[test]
    fn test_type_count_query() {
        assert_eq!(
            type_count_query().to_json(),
            json!([
                "extract",
                [["function", "count"], "type", "exported"],
                ["~", "type", "."],
                ["group_by", "type", "exported"]
            ])
        );
    }

    #[test]
    fn test_resource_row_decoding() {
        let row: ResourceRow = serde_json::from_value(json!({
            "certname": "web1",
            "type": "File",
            "title": "/etc/motd",
            "exported": false,
            "parameters": {"ensure": "file"},
            "environment": "production",
            "tags": ["file"]
        }))
        .unwrap();
        assert_eq!(row.resource_type, "File");
        assert_eq!(row.parameters["ensure"], "file");
    }
}
