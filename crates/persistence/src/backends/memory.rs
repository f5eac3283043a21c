//! In-process search engine.
//!
//! [`MemoryEngine`] keeps documents in memory and evaluates the query DSL the
//! way Elasticsearch does for the default dynamic mapping:
//!
//! - Text fields are analyzed into lower-cased alphanumeric tokens.
//! - `field.keyword` addresses the raw, unanalyzed string value.
//! - `term` compares against analyzed tokens on text fields, so `"Alice"` does
//!   not match a `name` of `"Alice"` while `"alice"` does.
//! - `wildcard` is case-sensitive and matches the raw value on `.keyword`
//!   fields, or any single token otherwise.
//! - Fuzzy matching counts an adjacent transposition as a single edit.
//! - Format mismatches (text against numbers) never match and never fail.
//!
//! Writes are visible immediately regardless of the refresh policy. Search
//! hits follow score, then insertion order, unless an explicit sort applies.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Map, Value};
use strsim::osa_distance;
use tracing::debug;
use uuid::Uuid;

use crate::core::SearchEngine;
use crate::error::{ResourceError, SearchError, StorageResult};
use crate::query::{BoolQuery, Fuzziness, Query};
use crate::types::{
    Hit, IndexTarget, RefreshPolicy, SearchRequest, SearchResponse, SortField, SortOrder,
};

/// Page size used when a request does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

const KEYWORD_SUFFIX: &str = ".keyword";

#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    source: Value,
}

/// Search engine holding every index in process.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    indices: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryEngine {
    /// Creates an engine with no indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index if it does not exist yet.
    pub fn create_index(&self, name: &str) {
        self.indices.write().entry(name.to_string()).or_default();
    }

    /// Stores a document under a caller-chosen id, replacing any previous one.
    pub fn put(&self, index: &str, id: &str, source: Value) {
        let mut indices = self.indices.write();
        let docs = indices.entry(index.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.source = source,
            None => docs.push(StoredDocument {
                id: id.to_string(),
                source,
            }),
        }
    }

    /// Returns the number of documents in `index`.
    pub fn count(&self, index: &str) -> usize {
        self.indices.read().get(index).map_or(0, Vec::len)
    }

    /// Returns the stored source of a document.
    pub fn get(&self, index: &str, id: &str) -> Option<Value> {
        self.indices
            .read()
            .get(index)?
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.source.clone())
    }
}

#[async_trait]
impl SearchEngine for MemoryEngine {
    fn engine_name(&self) -> &'static str {
        "memory"
    }

    async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResponse> {
        let indices = self.indices.read();

        let selected: Vec<(&String, &Vec<StoredDocument>)> = match &request.target {
            IndexTarget::All => indices.iter().collect(),
            IndexTarget::Index(name) => match indices.get_key_value(name) {
                Some(entry) => vec![entry],
                None => {
                    return Err(SearchError::IndexNotFound {
                        index: name.clone(),
                    }
                    .into());
                }
            },
        };

        let mut matched: Vec<(f64, &String, &StoredDocument)> = Vec::new();
        for (index, docs) in selected {
            for doc in docs {
                if let Some(score) = evaluate(&request.query, &doc.source) {
                    matched.push((score, index, doc));
                }
            }
        }

        let sorted = !request.sort.is_empty();
        if sorted {
            matched.sort_by(|a, b| compare_by_sort(&request.sort, &a.2.source, &b.2.source));
        } else {
            matched.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        }

        let total = matched.len() as u64;
        let from = request.from.unwrap_or(0);
        let size = request.size.unwrap_or(DEFAULT_PAGE_SIZE);

        let hits = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(score, index, doc)| Hit {
                index: index.clone(),
                id: doc.id.clone(),
                score: if sorted { None } else { Some(score) },
                source: match &request.source_includes {
                    Some(fields) => project(&doc.source, fields),
                    None => doc.source.clone(),
                },
            })
            .collect::<Vec<_>>();

        debug!(
            indices = %request.target.as_path(),
            total = total,
            returned = hits.len(),
            "Memory search executed"
        );

        Ok(SearchResponse {
            total: Some(total),
            hits,
        })
    }

    async fn index(
        &self,
        index: &str,
        document: Value,
        _refresh: RefreshPolicy,
    ) -> StorageResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.indices
            .write()
            .entry(index.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                source: document,
            });
        Ok(id)
    }

    async fn update(
        &self,
        index: &str,
        id: &str,
        partial: Value,
        _refresh: RefreshPolicy,
    ) -> StorageResult<()> {
        let mut indices = self.indices.write();
        let doc = indices
            .get_mut(index)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| not_found(index, id))?;

        merge(&mut doc.source, partial);
        Ok(())
    }

    async fn delete(&self, index: &str, id: &str, _refresh: RefreshPolicy) -> StorageResult<()> {
        let mut indices = self.indices.write();
        let docs = indices.get_mut(index).ok_or_else(|| not_found(index, id))?;
        let position = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| not_found(index, id))?;
        docs.remove(position);
        Ok(())
    }

    async fn refresh(&self, _index: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

fn not_found(index: &str, id: &str) -> crate::error::StorageError {
    ResourceError::NotFound {
        index: index.to_string(),
        id: id.to_string(),
    }
    .into()
}

/// Shallow merge, matching the engine's partial document update.
fn merge(target: &mut Value, partial: Value) {
    if let (Value::Object(existing), Value::Object(fields)) = (&mut *target, &partial) {
        for (key, value) in fields {
            existing.insert(key.clone(), value.clone());
        }
        return;
    }
    *target = partial;
}

fn project(source: &Value, fields: &[String]) -> Value {
    let Some(obj) = source.as_object() else {
        return source.clone();
    };
    let projected: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| fields.iter().any(|f| f == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(projected)
}

// ============================================================================
// Query evaluation
// ============================================================================

/// Returns the document's score when it matches.
fn evaluate(query: &Query, source: &Value) -> Option<f64> {
    match query {
        Query::MatchAll => Some(1.0),

        Query::Term { field, value } => {
            let (values, raw) = resolve(source, field);
            values
                .iter()
                .any(|v| term_matches(v, value, raw))
                .then_some(1.0)
        }

        Query::Match { field, query } => match_field(source, field, query, None),

        Query::MultiMatch {
            fields,
            query,
            fuzziness,
            ..
        } => fields
            .iter()
            .filter_map(|field| match_field(source, field, query, *fuzziness))
            .reduce(f64::max),

        Query::Wildcard { field, value } => {
            let (values, raw) = resolve(source, field);
            values
                .iter()
                .filter_map(|v| v.as_str())
                .any(|s| {
                    if raw {
                        wildcard_match(value, s)
                    } else {
                        tokenize(s).iter().any(|t| wildcard_match(value, t))
                    }
                })
                .then_some(1.0)
        }

        Query::QueryString {
            fields,
            query,
            analyze_wildcard,
            ..
        } => query_string(source, fields, query, *analyze_wildcard),

        Query::Bool(b) => evaluate_bool(b, source),
    }
}

fn evaluate_bool(b: &BoolQuery, source: &Value) -> Option<f64> {
    let mut score = 0.0;

    for q in &b.must {
        score += evaluate(q, source)?;
    }
    for q in &b.filter {
        evaluate(q, source)?;
    }
    if b.must_not.iter().any(|q| evaluate(q, source).is_some()) {
        return None;
    }

    let mut should_matches = 0;
    for q in &b.should {
        if let Some(s) = evaluate(q, source) {
            should_matches += 1;
            score += s;
        }
    }
    if should_matches < b.effective_minimum_should_match() {
        return None;
    }

    Some(score)
}

/// Resolves `field` to its leaf values; the flag is set for `.keyword` access.
fn resolve<'a>(source: &'a Value, field: &str) -> (Vec<&'a Value>, bool) {
    let (path, raw) = match field.strip_suffix(KEYWORD_SUFFIX) {
        Some(base) => (base, true),
        None => (field, false),
    };

    let mut current = Some(source);
    for segment in path.split('.') {
        current = current.and_then(|v| v.get(segment));
    }

    let mut leaves = Vec::new();
    if let Some(value) = current {
        collect_leaves(value, &mut leaves);
    }
    (leaves, raw)
}

fn collect_leaves<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_leaves(v, out)),
        Value::Null => {}
        other => out.push(other),
    }
}

/// Lower-cased alphanumeric tokens, approximating the standard analyzer.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn term_matches(stored: &Value, wanted: &Value, raw: bool) -> bool {
    match (stored, wanted) {
        (Value::String(s), Value::String(w)) if raw => s == w,
        (Value::String(s), Value::String(w)) => tokenize(s).iter().any(|t| t == w),
        (Value::Number(n), Value::String(w)) => numbers_equal(n, w),
        (stored, wanted) => stored == wanted,
    }
}

fn numbers_equal(stored: &serde_json::Number, text: &str) -> bool {
    match (stored.as_f64(), text.trim().parse::<f64>()) {
        (Some(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Analyzed match of `query` against one field; any query token may match.
fn match_field(
    source: &Value,
    field: &str,
    query: &str,
    fuzziness: Option<Fuzziness>,
) -> Option<f64> {
    let (values, raw) = resolve(source, field);
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return None;
    }

    let mut best: Option<f64> = None;
    for value in values {
        let matched = match value {
            Value::String(s) if raw => usize::from(s == query),
            Value::String(s) => {
                let field_tokens = tokenize(s);
                query_tokens
                    .iter()
                    .filter(|q| {
                        field_tokens
                            .iter()
                            .any(|t| token_matches(q, t, fuzziness))
                    })
                    .count()
            }
            Value::Number(n) => usize::from(numbers_equal(n, query)),
            Value::Bool(b) => usize::from(b.to_string() == query.trim().to_lowercase()),
            _ => 0,
        };
        if matched > 0 {
            let score = matched as f64 / query_tokens.len() as f64;
            best = Some(best.map_or(score, |b| b.max(score)));
        }
    }
    best
}

fn token_matches(query: &str, token: &str, fuzziness: Option<Fuzziness>) -> bool {
    if query == token {
        return true;
    }
    match fuzziness {
        // Adjacent transpositions cost one edit, as with fuzzy_transpositions
        Some(f) => osa_distance(query, token) <= f.max_edits(query.chars().count()),
        None => false,
    }
}

/// Evaluates a `query_string`: whitespace-separated terms, any of which may
/// match in any listed field. Terms containing `*` or `?` are wildcards.
fn query_string(
    source: &Value,
    fields: &[String],
    query: &str,
    analyze_wildcard: bool,
) -> Option<f64> {
    let all_fields: Vec<String>;
    let fields = if fields.is_empty() {
        all_fields = source
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        &all_fields
    } else {
        fields
    };

    let mut score = 0.0;
    for term in query.split_whitespace() {
        let is_wildcard = term.contains(['*', '?']);
        let matched = fields.iter().any(|field| {
            if is_wildcard {
                let pattern = if analyze_wildcard {
                    term.to_lowercase()
                } else {
                    term.to_string()
                };
                let (values, raw) = resolve(source, field);
                values.iter().filter_map(|v| v.as_str()).any(|s| {
                    if raw {
                        wildcard_match(&pattern, s)
                    } else {
                        tokenize(s).iter().any(|t| wildcard_match(&pattern, t))
                    }
                })
            } else {
                match_field(source, field, term, None).is_some()
            }
        });
        if matched {
            score += 1.0;
        }
    }

    (score > 0.0).then_some(score)
}

/// Translates a glob (`*` any sequence, `?` any single character) into an
/// anchored regular expression.
fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');
    Regex::new(&expr)
}

fn wildcard_match(pattern: &str, text: &str) -> bool {
    glob_to_regex(pattern).is_ok_and(|re| re.is_match(text))
}

// ============================================================================
// Sorting
// ============================================================================

fn compare_by_sort(sort: &[SortField], a: &Value, b: &Value) -> Ordering {
    for directive in sort {
        let (va, _) = resolve(a, &directive.field);
        let (vb, _) = resolve(b, &directive.field);
        let ordering = match (va.first(), vb.first()) {
            (Some(x), Some(y)) => {
                let o = compare_values(x, y);
                match directive.order {
                    SortOrder::Asc => o,
                    SortOrder::Desc => o.reverse(),
                }
            }
            // Missing values sort last in either direction.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
