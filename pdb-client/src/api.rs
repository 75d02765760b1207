use indexmap::IndexMap;
use pdb_query::{compile, ApiVersion, FilterExpression, OrderBy, QueryAst, QueryParams};

use crate::config::Config;
use crate::facts::{assemble_facts, FactRow, HostFactMap};
use crate::paginate::{decode, Paginator, PAGE_SIZE};
use crate::resources::{
    group_classes, resource_order, resource_query, split_exported_type, type_count_order,
    type_count_query, type_labels, ClassRow, HostClassMap, ResourceRow, ResourceTypeCount,
};
use crate::transport::{HttpsTransport, Transport};
use crate::Result;

/// Read access to the PuppetDB query API of one server.
///
/// The API version is fixed at construction and selects the endpoint paths
/// and query dialect of every call.
pub struct PuppetDbApi<T: Transport = HttpsTransport> {
    transport: T,
    version: ApiVersion,
    page_size: usize,
}

impl PuppetDbApi<HttpsTransport> {
    pub fn new(config: &Config) -> Result<Self> {
        let version = config.server.api_version;
        let transport = HttpsTransport::new(config, version.base_path())?;
        Ok(Self::with_transport(transport, version))
    }
}

impl<T: Transport> PuppetDbApi<T> {
    pub fn with_transport(transport: T, version: ApiVersion) -> Self {
        Self {
            transport,
            version,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    fn paginator(&self) -> Paginator<'_, T> {
        Paginator::new(&self.transport).with_step(self.page_size)
    }

    fn params(&self) -> QueryParams {
        QueryParams::new(self.version)
    }

    /// Names of all known facts; v1 servers cannot list them
    pub fn list_fact_names(&self) -> Result<Vec<String>> {
        if !self.version.supports_fact_names() {
            return Ok(Vec::new());
        }
        let body = self.transport.get("fact-names")?;
        decode(&body, "fact-names")
    }

    /// Class titles per node, ordered by certname and title
    pub fn classes(&self) -> Result<HostClassMap> {
        let path = self
            .params()
            .query(QueryAst::comparison("=", "type", "Class"))
            .order_by(vec![OrderBy::asc("certname"), OrderBy::asc("title")])
            .to_path("resources")?;

        let rows: Vec<ClassRow> = self.paginator().fetch_all(&path)?;
        let classes = group_classes(rows);
        tracing::info!("Fetched classes of {} nodes", classes.len());
        Ok(classes)
    }

    /// Facts per node with structured values decoded
    pub fn fetch_facts(&self, filter: Option<&FilterExpression>) -> Result<HostFactMap> {
        let mut params = self
            .params()
            .order_by(vec![OrderBy::asc("certname"), OrderBy::asc("name")]);
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            params = params.query(compile(filter));
        }

        let rows: Vec<FactRow> = self.paginator().fetch_all(&params.to_path("facts")?)?;
        let row_count = rows.len();
        let facts = assemble_facts(rows);
        tracing::info!("Fetched {} facts of {} nodes", row_count, facts.len());
        Ok(facts)
    }

    /// Resources matching `filter`, optionally restricted to exported or
    /// non-exported ones
    pub fn fetch_resources(
        &self,
        filter: Option<&FilterExpression>,
        exported: Option<bool>,
    ) -> Result<Vec<ResourceRow>> {
        let mut params = self.params().order_by(resource_order(filter, exported));
        if let Some(query) = resource_query(self.version, filter, exported) {
            params = params.query(query);
        }

        let resources: Vec<ResourceRow> =
            self.paginator().fetch_all(&params.to_path("resources")?)?;
        tracing::info!("Fetched {} resources", resources.len());
        Ok(resources)
    }

    /// Resources of one type; `@@Type` selects exported resources of `Type`
    pub fn fetch_resources_by_type(
        &self,
        resource_type: &str,
        filter: Option<&FilterExpression>,
    ) -> Result<Vec<ResourceRow>> {
        let (bare_type, exported) = split_exported_type(resource_type);
        let by_type = FilterExpression::equals("type", bare_type);
        let filter = match filter {
            Some(filter) if !filter.is_empty() => filter.clone().and_with(by_type),
            _ => by_type,
        };
        self.fetch_resources(Some(&filter), Some(exported))
    }

    /// Resource types with their counts as `key => "key (count)"`, exported
    /// types first. Empty on dialects without aggregate queries.
    pub fn enum_resource_types(&self) -> Result<IndexMap<String, String>> {
        if !self.version.supports_aggregation() {
            return Ok(IndexMap::new());
        }
        let path = self
            .params()
            .query(type_count_query())
            .order_by(type_count_order())
            .to_path("resources")?;

        let body = self.transport.get(&path)?;
        let counts: Vec<ResourceTypeCount> = decode(&body, &path)?;
        Ok(type_labels(&counts))
    }
}
