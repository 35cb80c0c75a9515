//! The tagged record type returned to callers, and the search result
//! container around it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Article, CellLine, Compound, EntityMatch, PaperAnnotations};

/// One entity's data as returned to the caller
///
/// Every upstream payload is validated into one of these variants before it
/// leaves the response mapper; untyped maps never cross the tool surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    CellLine(CellLine),
    Article(Article),
    Compound(Compound),
    Annotations(PaperAnnotations),
    Entity(EntityMatch),
}

impl Record {
    /// The upstream accession/identifier of this record
    pub fn accession(&self) -> String {
        match self {
            Record::CellLine(cell_line) => cell_line.accession.clone(),
            Record::Article(article) => article.pmid.clone(),
            Record::Compound(compound) => compound.cid.to_string(),
            Record::Annotations(annotations) => annotations.pmid.clone(),
            Record::Entity(entity) => entity.identifier.clone(),
        }
    }

    /// Name of the identifier field in the serialized form
    pub fn id_field(&self) -> &'static str {
        match self {
            Record::CellLine(_) => "accession",
            Record::Article(_) | Record::Annotations(_) => "pmid",
            Record::Compound(_) => "cid",
            Record::Entity(_) => "_id",
        }
    }
}

/// Ordered search hits plus pagination metadata
///
/// Constructed once per call and discarded after serialization; nothing is
/// cached between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub records: Vec<Record>,

    /// Total number of matches upstream, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,

    /// Offset to request the next page, absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<usize>,

    /// How the upstream engine rewrote the query, when reported (PubMed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_translation: Option<String>,
}

impl SearchResult {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            total_count: None,
            next_offset: None,
            query_translation: None,
        }
    }

    pub fn total_count(mut self, total: u64) -> Self {
        self.total_count = Some(total);
        self
    }

    /// Record the next page offset if this page was full and more matches
    /// remain upstream.
    pub fn paginate(mut self, offset: usize) -> Self {
        let end = offset + self.records.len();
        match self.total_count {
            Some(total) if (end as u64) < total => self.next_offset = Some(end),
            _ => {}
        }
        self
    }
}

/// Prune a serialized record down to the requested fields.
///
/// The tag and the identifier field are always kept, so a caller can still
/// tell what it received. Requested fields that the record does not have are
/// ignored; the upstream API is the authority on valid field names.
pub fn select_fields(record: &Record, fields: &[String]) -> Value {
    let mut value = serde_json::to_value(record).unwrap_or(Value::Null);

    if let Value::Object(ref mut map) = value {
        let id_field = record.id_field();
        map.retain(|key, _| {
            key == "kind" || key == id_field || fields.iter().any(|f| f == key)
        });
    }

    value
}
