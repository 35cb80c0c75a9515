//! Cellosaurus cell-line schema.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// STR (Short Tandem Repeat) profile marker for a cell line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrProfile {
    pub marker: String,
    pub allele: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Disease associated with a cell line
///
/// The identifier is an NCI Thesaurus or ORDO code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    pub name: String,
    pub identifier: String,
}

/// Sequence variation observed in a cell line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceVariation {
    pub gene: String,
    pub description: String,
}

/// Publication reference for a cell line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubmed_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    pub reference: String,
}

/// A Cellosaurus cell-line record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellLine {
    /// Cellosaurus accession (e.g. "CVCL_0030")
    pub accession: String,

    /// Recommended name
    pub name: String,

    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Cellosaurus category (e.g. "Cancer cell line")
    pub category: String,

    /// Species of origin
    pub species: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from_site: Option<String>,

    #[serde(default)]
    pub str_profile: Vec<StrProfile>,

    #[serde(default)]
    pub diseases: Vec<Disease>,

    #[serde(default)]
    pub sequence_variations: Vec<SequenceVariation>,

    #[serde(default)]
    pub publications: Vec<Publication>,

    /// Free-form comment sections keyed by category
    #[serde(default)]
    pub comments: HashMap<String, serde_json::Value>,

    /// Cross-references to other resources, keyed by resource name
    #[serde(default)]
    pub cross_references: HashMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_cell_line_deserializes() {
        let json = r#"{
            "accession": "CVCL_0030",
            "name": "HeLa",
            "category": "Cancer cell line",
            "species": "Homo sapiens"
        }"#;

        let cell_line: CellLine = serde_json::from_str(json).unwrap();
        assert_eq!(cell_line.accession, "CVCL_0030");
        assert_eq!(cell_line.name, "HeLa");
        assert!(cell_line.synonyms.is_empty());
        assert!(cell_line.sex.is_none());
    }

    #[test]
    fn test_missing_required_key_is_rejected() {
        // no accession
        let json = r#"{"name": "HeLa", "category": "Cancer cell line", "species": "Homo sapiens"}"#;
        assert!(serde_json::from_str::<CellLine>(json).is_err());
    }
}
