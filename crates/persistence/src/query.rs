//! Typed query DSL.
//!
//! Each [`Query`] variant corresponds to one engine query construct and renders
//! to the engine's JSON request schema through [`Query::to_json`]. Keeping the
//! query typed lets the in-memory engine evaluate the same value that the
//! Elasticsearch backend serializes.
//!
//! | Variant | Analyzed | Notes |
//! |---------|----------|-------|
//! | `MatchAll` | - | Every document |
//! | `Term` | no | Exact comparison against indexed terms |
//! | `Match` / `MultiMatch` | yes | Any query token may match; optional fuzziness |
//! | `Wildcard` | no | Glob (`*`, `?`) against the raw value, case-sensitive |
//! | `QueryString` | yes | Free text with wildcard analysis |
//! | `Bool` | - | `must`, `should`, `filter`, `must_not` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Edit-distance tolerance for fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fuzziness {
    /// Edit distance scaled to term length.
    Auto,
}

impl Fuzziness {
    /// Returns the number of edits allowed for a term of `term_len` characters.
    ///
    /// `Auto` allows 0 edits up to 2 characters, 1 edit for 3 to 5 characters
    /// and 2 edits beyond that.
    pub fn max_edits(&self, term_len: usize) -> usize {
        match self {
            Fuzziness::Auto => match term_len {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }

    fn to_json(self) -> Value {
        match self {
            Fuzziness::Auto => json!("AUTO"),
        }
    }
}

/// A query in the engine's DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches every document.
    MatchAll,

    /// Exact match on an unanalyzed value.
    Term {
        /// Field name.
        field: String,
        /// Value compared verbatim.
        value: Value,
    },

    /// Analyzed match on one field.
    Match {
        /// Field name.
        field: String,
        /// Query text.
        query: String,
    },

    /// Analyzed match across several fields.
    MultiMatch {
        /// Field names.
        fields: Vec<String>,
        /// Query text.
        query: String,
        /// Optional fuzziness.
        fuzziness: Option<Fuzziness>,
        /// Ignore format failures such as text against numeric fields.
        lenient: bool,
    },

    /// Glob-style match on the raw value.
    Wildcard {
        /// Field name.
        field: String,
        /// Pattern using `*` and `?`.
        value: String,
    },

    /// Free-text query string.
    QueryString {
        /// Field names.
        fields: Vec<String>,
        /// Query text.
        query: String,
        /// Analyze wildcard terms.
        analyze_wildcard: bool,
        /// Ignore format failures such as text against numeric fields.
        lenient: bool,
    },

    /// Boolean combination.
    Bool(BoolQuery),
}

/// Clauses of a boolean query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// All must match; contribute to score.
    pub must: Vec<Query>,
    /// At least `minimum_should_match` must match when there is no `must`/`filter`.
    pub should: Vec<Query>,
    /// All must match; no scoring.
    pub filter: Vec<Query>,
    /// None may match.
    pub must_not: Vec<Query>,
    /// Minimum number of `should` clauses that must match.
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    /// Creates an empty boolean query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `should` clause.
    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    /// Returns the effective minimum number of `should` matches.
    ///
    /// Without `must` or `filter` clauses at least one `should` clause has to
    /// match; otherwise `should` only affects scoring.
    pub fn effective_minimum_should_match(&self) -> usize {
        match self.minimum_should_match {
            Some(n) => n as usize,
            None if !self.should.is_empty() && self.must.is_empty() && self.filter.is_empty() => {
                1
            }
            None => 0,
        }
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        let clauses = [
            ("must", &self.must),
            ("should", &self.should),
            ("filter", &self.filter),
            ("must_not", &self.must_not),
        ];
        for (name, queries) in clauses {
            if !queries.is_empty() {
                body.insert(
                    name.to_string(),
                    Value::Array(queries.iter().map(Query::to_json).collect()),
                );
            }
        }
        if let Some(n) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(n));
        }
        json!({ "bool": Value::Object(body) })
    }
}

impl Query {
    /// Builds a `term` query.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Builds a `match` query.
    pub fn matches(field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::Match {
            field: field.into(),
            query: query.into(),
        }
    }

    /// Builds a `multi_match` query without fuzziness.
    pub fn multi_match<I, F>(fields: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Query::MultiMatch {
            fields: fields.into_iter().map(Into::into).collect(),
            query: query.into(),
            fuzziness: None,
            lenient: false,
        }
    }

    /// Builds a `wildcard` query.
    pub fn wildcard(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Wildcard {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Builds a `query_string` query.
    pub fn query_string<I, F>(fields: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Query::QueryString {
            fields: fields.into_iter().map(Into::into).collect(),
            query: query.into(),
            analyze_wildcard: false,
            lenient: false,
        }
    }

    /// Sets fuzziness on a `multi_match` query. Other variants are returned unchanged.
    pub fn with_fuzziness(self, value: Fuzziness) -> Self {
        match self {
            Query::MultiMatch {
                fields,
                query,
                lenient,
                ..
            } => Query::MultiMatch {
                fields,
                query,
                fuzziness: Some(value),
                lenient,
            },
            other => other,
        }
    }

    /// Marks a `multi_match` or `query_string` query as lenient.
    pub fn lenient(self) -> Self {
        match self {
            Query::MultiMatch {
                fields,
                query,
                fuzziness,
                ..
            } => Query::MultiMatch {
                fields,
                query,
                fuzziness,
                lenient: true,
            },
            Query::QueryString {
                fields,
                query,
                analyze_wildcard,
                ..
            } => Query::QueryString {
                fields,
                query,
                analyze_wildcard,
                lenient: true,
            },
            other => other,
        }
    }

    /// Enables wildcard analysis on a `query_string` query.
    pub fn analyze_wildcard(self) -> Self {
        match self {
            Query::QueryString {
                fields,
                query,
                lenient,
                ..
            } => Query::QueryString {
                fields,
                query,
                analyze_wildcard: true,
                lenient,
            },
            other => other,
        }
    }

    /// Combines two queries so that either may match (`bool.should`).
    ///
    /// OR-ing onto an existing should-only boolean query appends to it instead
    /// of nesting.
    pub fn or(self, other: Query) -> Self {
        match self {
            Query::Bool(b)
                if b.must.is_empty()
                    && b.filter.is_empty()
                    && b.must_not.is_empty()
                    && b.minimum_should_match.is_none() =>
            {
                Query::Bool(b.should(other))
            }
            first => Query::Bool(BoolQuery::new().should(first).should(other)),
        }
    }

    /// Renders the query in the engine's JSON request schema.
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Term { field, value } => json!({
                "term": { field: { "value": value } }
            }),
            Query::Match { field, query } => json!({
                "match": { field: { "query": query } }
            }),
            Query::MultiMatch {
                fields,
                query,
                fuzziness,
                lenient,
            } => {
                let mut body = json!({
                    "fields": fields,
                    "query": query,
                });
                if let Some(f) = fuzziness {
                    body["fuzziness"] = f.to_json();
                }
                if *lenient {
                    body["lenient"] = json!(true);
                }
                json!({ "multi_match": body })
            }
            Query::Wildcard { field, value } => json!({
                "wildcard": { field: { "value": value } }
            }),
            Query::QueryString {
                fields,
                query,
                analyze_wildcard,
                lenient,
            } => {
                let mut body = json!({
                    "fields": fields,
                    "query": query,
                });
                if *analyze_wildcard {
                    body["analyze_wildcard"] = json!(true);
                }
                if *lenient {
                    body["lenient"] = json!(true);
                }
                json!({ "query_string": body })
            }
            Query::Bool(b) => b.to_json(),
        }
    }
}

impl From<BoolQuery> for Query {
    fn from(b: BoolQuery) -> Self {
        Query::Bool(b)
    }
}
