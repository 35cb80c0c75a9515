//! PubChem compound schema.

use serde::{Deserialize, Serialize};

/// A PubChem compound record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compound {
    /// PubChem compound identifier
    pub cid: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iupac_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_formula: Option<String>,

    /// Molecular weight in g/mol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_smiles: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inchikey: Option<String>,

    #[serde(default)]
    pub synonyms: Vec<String>,
}
