//! NCBI Entrez link schemas.

use serde::{Deserialize, Serialize};

/// NCBI databases addressable through the Entrez E-utilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrezDatabase {
    Pubmed,
    Nucleotide,
    Protein,
    Gene,
    Taxonomy,
    Structure,
    Biosample,
    Assembly,
    Variation,
    Sra,
    Bioproject,
    Biocollection,
    Clinvar,
    Snp,
}

impl EntrezDatabase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrezDatabase::Pubmed => "pubmed",
            EntrezDatabase::Nucleotide => "nucleotide",
            EntrezDatabase::Protein => "protein",
            EntrezDatabase::Gene => "gene",
            EntrezDatabase::Taxonomy => "taxonomy",
            EntrezDatabase::Structure => "structure",
            EntrezDatabase::Biosample => "biosample",
            EntrezDatabase::Assembly => "assembly",
            EntrezDatabase::Variation => "variation",
            EntrezDatabase::Sra => "sra",
            EntrezDatabase::Bioproject => "bioproject",
            EntrezDatabase::Biocollection => "biocollection",
            EntrezDatabase::Clinvar => "clinvar",
            EntrezDatabase::Snp => "snp",
        }
    }

    /// All database names, for error messages and tool schemas
    pub fn names() -> &'static [&'static str] {
        &[
            "pubmed",
            "nucleotide",
            "protein",
            "gene",
            "taxonomy",
            "structure",
            "biosample",
            "assembly",
            "variation",
            "sra",
            "bioproject",
            "biocollection",
            "clinvar",
            "snp",
        ]
    }
}

impl std::str::FromStr for EntrezDatabase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pubmed" => Ok(EntrezDatabase::Pubmed),
            "nucleotide" => Ok(EntrezDatabase::Nucleotide),
            "protein" => Ok(EntrezDatabase::Protein),
            "gene" => Ok(EntrezDatabase::Gene),
            "taxonomy" => Ok(EntrezDatabase::Taxonomy),
            "structure" => Ok(EntrezDatabase::Structure),
            "biosample" => Ok(EntrezDatabase::Biosample),
            "assembly" => Ok(EntrezDatabase::Assembly),
            "variation" => Ok(EntrezDatabase::Variation),
            "sra" => Ok(EntrezDatabase::Sra),
            "bioproject" => Ok(EntrezDatabase::Bioproject),
            "biocollection" => Ok(EntrezDatabase::Biocollection),
            "clinvar" => Ok(EntrezDatabase::Clinvar),
            "snp" => Ok(EntrezDatabase::Snp),
            other => Err(format!(
                "unknown Entrez database '{}', expected one of: {}",
                other,
                EntrezDatabase::names().join(", ")
            )),
        }
    }
}

impl std::fmt::Display for EntrezDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link from one source record to records in a target database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Source record identifier
    pub id: String,
    /// Source database name
    pub db: String,
    #[serde(default)]
    pub linked_ids: Vec<String>,
}

/// Links between records of two NCBI databases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSet {
    pub db_from: String,
    pub db_to: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_parse() {
        assert_eq!("gene".parse::<EntrezDatabase>().unwrap(), EntrezDatabase::Gene);
        assert!("genbank".parse::<EntrezDatabase>().is_err());
    }

    #[test]
    fn test_database_serde_lowercase() {
        let json = serde_json::to_string(&EntrezDatabase::Clinvar).unwrap();
        assert_eq!(json, "\"clinvar\"");
    }
}
