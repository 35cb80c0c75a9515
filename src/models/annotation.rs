//! PubTator3 annotation and entity schemas.

use serde::{Deserialize, Serialize};

/// Concept class recognized by the PubTator3 entity annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concept {
    Gene,
    Disease,
    Chemical,
}

impl Concept {
    pub fn as_str(&self) -> &'static str {
        match self {
            Concept::Gene => "gene",
            Concept::Disease => "disease",
            Concept::Chemical => "chemical",
        }
    }
}

impl std::str::FromStr for Concept {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gene" => Ok(Concept::Gene),
            "disease" => Ok(Concept::Disease),
            "chemical" => Ok(Concept::Chemical),
            other => Err(format!(
                "unknown concept '{}', expected one of: gene, disease, chemical",
                other
            )),
        }
    }
}

/// A single normalized entity annotation inside an article passage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAnnotation {
    /// Normalized identifier (e.g. MeSH or NCBI Gene id)
    pub identifier: String,
    /// Concept class ("Gene", "Disease", "Chemical", ...)
    pub biotype: String,
    /// Preferred entity name
    pub name: String,
}

/// Annotations found in one section of an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section label ("TITLE", "ABSTRACT", "METHODS", ...)
    pub section_type: String,
    #[serde(default)]
    pub annotations: Vec<EntityAnnotation>,
}

/// Entity annotations for a single article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperAnnotations {
    pub pmid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmc_id: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A normalized entity term returned by the PubTator3 autocomplete endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMatch {
    /// Normalized entity identifier (e.g. "@CHEMICAL_remdesivir")
    #[serde(rename = "_id")]
    pub identifier: String,
    pub biotype: String,
    pub name: String,
    /// Which index field the keyword matched against, when reported
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}
