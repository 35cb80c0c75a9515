//! Identifier and date format validation.
//!
//! Accession formats are checked before any request is built, so a malformed
//! identifier never reaches an upstream API.

use crate::sources::SourceError;

/// Validate a Cellosaurus accession: `CVCL_` followed by exactly four
/// uppercase alphanumerics (e.g. "CVCL_0030").
pub fn validate_cell_line_accession(id: &str) -> Result<(), SourceError> {
    let suffix = id.strip_prefix("CVCL_").ok_or_else(|| {
        SourceError::InvalidRequest(format!(
            "invalid Cellosaurus accession '{}': expected CVCL_ prefix",
            id
        ))
    })?;

    if suffix.len() == 4
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        Ok(())
    } else {
        Err(SourceError::InvalidRequest(format!(
            "invalid Cellosaurus accession '{}': expected four alphanumerics after CVCL_",
            id
        )))
    }
}

/// Validate a PubMed identifier: one or more ASCII digits
pub fn validate_pmid(id: &str) -> Result<(), SourceError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(SourceError::InvalidRequest(format!(
            "invalid PMID '{}': expected digits only",
            id
        )))
    }
}

/// Validate a PubChem compound identifier: one or more ASCII digits
pub fn validate_cid(id: &str) -> Result<(), SourceError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(SourceError::InvalidRequest(format!(
            "invalid CID '{}': expected digits only",
            id
        )))
    }
}

/// Validate a publication date filter: `YYYY`, `YYYY/MM`, or `YYYY/MM/DD`
pub fn validate_date(date: &str) -> Result<(), SourceError> {
    let parts: Vec<&str> = date.split('/').collect();
    let widths: &[usize] = match parts.len() {
        1 => &[4],
        2 => &[4, 2],
        3 => &[4, 2, 2],
        _ => {
            return Err(invalid_date(date));
        }
    };

    for (part, width) in parts.iter().zip(widths) {
        if part.len() != *width || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid_date(date));
        }
    }

    Ok(())
}

fn invalid_date(date: &str) -> SourceError {
    SourceError::InvalidRequest(format!(
        "invalid date '{}': expected YYYY, YYYY/MM, or YYYY/MM/DD",
        date
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_line_accession() {
        assert!(validate_cell_line_accession("CVCL_0030").is_ok());
        assert!(validate_cell_line_accession("CVCL_C792").is_ok());
        assert!(validate_cell_line_accession("cvcl_0030").is_err());
        assert!(validate_cell_line_accession("CVCL_30").is_err());
        assert!(validate_cell_line_accession("CVCL_00300").is_err());
        assert!(validate_cell_line_accession("0030").is_err());
        assert!(validate_cell_line_accession("").is_err());
    }

    #[test]
    fn test_pmid() {
        assert!(validate_pmid("31978945").is_ok());
        assert!(validate_pmid("").is_err());
        assert!(validate_pmid("PMC123").is_err());
        assert!(validate_pmid("123 456").is_err());
    }

    #[test]
    fn test_cid() {
        assert!(validate_cid("2244").is_ok());
        assert!(validate_cid("aspirin").is_err());
    }

    #[test]
    fn test_date() {
        assert!(validate_date("2023").is_ok());
        assert!(validate_date("2023/01").is_ok());
        assert!(validate_date("2023/01/15").is_ok());
        assert!(validate_date("2023-01-15").is_err());
        assert!(validate_date("23/01/15").is_err());
        assert!(validate_date("2023/1/5").is_err());
    }
}
