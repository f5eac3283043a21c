//! Records, search requests and search responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::query::Query;

/// Loosely typed record: field name to dynamically typed value.
///
/// Used for queries that span several indices, where documents do not share a
/// schema.
pub type Document = Map<String, Value>;

/// A user document.
///
/// Every attribute is optional so the same type expresses full records, partial
/// updates and field-projected listings. Absent attributes are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Engine-assigned document id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name; the lookup key for [`get_by_id`](crate::QueryGateway::get_by_id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub age: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub education: Option<String>,

    /// Only meaningful in cross-index queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Only meaningful in cross-index queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    /// Only meaningful in cross-index queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

impl UserRecord {
    /// Creates a record with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Sets the age.
    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the education.
    pub fn with_education(mut self, education: impl Into<String>) -> Self {
        self.education = Some(education.into());
        self
    }

    /// Serializes the record as a document body, without the id.
    pub fn to_document(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| json!({}));
        if let Some(obj) = value.as_object_mut() {
            obj.remove("id");
        }
        value
    }
}

/// Which indices a search runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    /// A single named index.
    Index(String),
    /// Every index in the cluster.
    All,
}

impl IndexTarget {
    /// Returns the path segment used by the engine.
    pub fn as_path(&self) -> &str {
        match self {
            IndexTarget::Index(name) => name,
            IndexTarget::All => "_all",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// A single sort directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Field to sort on.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortField {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }
}

/// A complete search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Indices to search.
    pub target: IndexTarget,
    /// The query.
    pub query: Query,
    /// Offset of the first hit.
    pub from: Option<usize>,
    /// Maximum number of hits; the engine default applies when unset.
    pub size: Option<usize>,
    /// Sort directives, applied in order.
    pub sort: Vec<SortField>,
    /// Source fields to return; the full source when unset.
    pub source_includes: Option<Vec<String>>,
}

impl SearchRequest {
    /// Creates a request against one index.
    pub fn index(name: impl Into<String>, query: Query) -> Self {
        Self::new(IndexTarget::Index(name.into()), query)
    }

    /// Creates a request against every index.
    pub fn all_indices(query: Query) -> Self {
        Self::new(IndexTarget::All, query)
    }

    fn new(target: IndexTarget, query: Query) -> Self {
        Self {
            target,
            query,
            from: None,
            size: None,
            sort: Vec::new(),
            source_includes: None,
        }
    }

    /// Sets the offset.
    pub fn from(mut self, from: usize) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the page size.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the page size if one is given.
    pub fn size_opt(mut self, size: Option<usize>) -> Self {
        if size.is_some() {
            self.size = size;
        }
        self
    }

    /// Appends a sort directive.
    pub fn sort_by(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Restricts the returned source to the given fields.
    pub fn include_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.source_includes = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Renders the request body in the engine's JSON schema.
    pub fn to_body(&self) -> Value {
        let mut body = json!({ "query": self.query.to_json() });

        if let Some(from) = self.from {
            body["from"] = json!(from);
        }
        if let Some(size) = self.size {
            body["size"] = json!(size);
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|s| {
                    let mut clause = serde_json::Map::new();
                    clause.insert(s.field.clone(), json!({ "order": s.order }));
                    Value::Object(clause)
                })
                .collect();
            body["sort"] = json!(sort);
        }
        if let Some(ref includes) = self.source_includes {
            body["_source"] = json!({ "includes": includes });
        }

        body
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Index holding the document.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score; absent when results are sorted.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Document source.
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// The engine's answer to a search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Total matching documents, when reported.
    pub total: Option<u64>,
    /// Hits in engine order.
    pub hits: Vec<Hit>,
}

impl SearchResponse {
    /// Parses the `hits` section of an engine search response body.
    pub fn from_body(body: &Value) -> Result<Self, serde_json::Error> {
        let total = body
            .get("hits")
            .and_then(|h| h.get("total"))
            .and_then(|t| t.get("value").or(Some(t)))
            .and_then(|v| v.as_u64());

        let hits = match body.get("hits").and_then(|h| h.get("hits")) {
            Some(hits) => serde_json::from_value(hits.clone())?,
            None => Vec::new(),
        };

        Ok(Self { total, hits })
    }
}

/// When written documents become visible to search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Leave it to the engine's refresh interval.
    #[default]
    Off,
    /// Block the write until a refresh makes it visible.
    WaitFor,
    /// Force a refresh immediately after the write.
    Immediate,
}

impl std::str::FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" | "false" => Ok(RefreshPolicy::Off),
            "wait_for" | "wait-for" => Ok(RefreshPolicy::WaitFor),
            "immediate" | "true" => Ok(RefreshPolicy::Immediate),
            other => Err(format!(
                "unknown refresh policy '{}', expected off, wait_for or immediate",
                other
            )),
        }
    }
}
