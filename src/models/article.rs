//! PubMed article schema.

use serde::{Deserialize, Serialize};

/// Author of a PubMed article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fore_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
}

impl Author {
    /// Full name if enough parts are present, otherwise whatever is available
    pub fn full_name(&self) -> String {
        match (&self.fore_name, &self.last_name) {
            (Some(fore), Some(last)) => format!("{} {}", fore, last),
            (None, Some(last)) => last.clone(),
            _ => String::new(),
        }
    }
}

/// Journal information for a PubMed article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_abbreviation: Option<String>,
    /// Publication date as printed ("2023 Jan 5", "2020")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
}

/// A PubMed article record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// PubMed identifier
    pub pmid: String,

    /// PubMed Central identifier, when the article is deposited there
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmc_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "abstract")]
    pub abstract_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<Journal>,

    #[serde(default)]
    pub authors: Vec<Author>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_full_name() {
        let full = Author {
            last_name: Some("Curie".to_string()),
            fore_name: Some("Marie".to_string()),
            initials: Some("M".to_string()),
        };
        assert_eq!(full.full_name(), "Marie Curie");

        let last_only = Author {
            last_name: Some("Curie".to_string()),
            ..Default::default()
        };
        assert_eq!(last_only.full_name(), "Curie");

        assert_eq!(Author::default().full_name(), "");
    }

    #[test]
    fn test_abstract_field_rename() {
        let article = Article {
            pmid: "123".to_string(),
            pmc_id: None,
            doi: None,
            title: None,
            abstract_text: Some("text".to_string()),
            journal: None,
            authors: Vec::new(),
        };

        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["abstract"], "text");
        assert!(value.get("abstract_text").is_none());
    }
}
