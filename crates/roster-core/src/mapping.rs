//! Column mapping between source headers and known contact fields
//!
//! The auto-mapper only proposes; mappings stay editable until the import
//! commits, and a manual edit is never overridden by a re-run of the
//! proposal step.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{KnownField, SourceRow};

/// Where a source column's values land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTarget {
    Field(KnownField),
    /// Column is preserved in custom_data only
    Skip,
}

impl MapTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Field(field) => field.as_str(),
            Self::Skip => "skip",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

impl std::str::FromStr for MapTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("skip") {
            Ok(Self::Skip)
        } else {
            s.parse::<KnownField>().map(Self::Field)
        }
    }
}

impl std::fmt::Display for MapTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for MapTarget {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MapTarget {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One source column's mapping, with a preview value from the first data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: MapTarget,
    pub sample: Option<String>,
}

/// Lower-case a header and strip everything that is not a letter or digit
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Match one header against the known-field labels
///
/// Exact match on the normalized label, then substring containment in either
/// direction. Fields are tried in enumeration order and the first hit wins,
/// which keeps proposals deterministic for ambiguous headers. Headers that
/// normalize to nothing are always skipped.
fn match_header(header: &str) -> MapTarget {
    let normalized = normalize(header);
    if normalized.is_empty() {
        return MapTarget::Skip;
    }

    for field in KnownField::ALL {
        let label = normalize(field.label());
        if normalized == label || normalized.contains(&label) || label.contains(&normalized) {
            return MapTarget::Field(field);
        }
    }

    MapTarget::Skip
}

/// Propose a mapping for every source header
///
/// Returns one entry per header in header order. When a sample row is given,
/// its cell values are attached as previews.
pub fn auto_map(headers: &[String], sample_row: Option<&SourceRow>) -> Vec<ColumnMapping> {
    headers
        .iter()
        .map(|header| ColumnMapping {
            source: header.clone(),
            target: match_header(header),
            sample: sample_row
                .and_then(|row| row.get(header))
                .filter(|value| !value.is_empty())
                .cloned(),
        })
        .collect()
}

/// Parse a `COLUMN=FIELD` override as passed on the command line
///
/// `FIELD` is a known field name or the literal `skip`.
pub fn parse_override(raw: &str) -> Result<(String, MapTarget)> {
    let (column, target) = raw
        .split_once('=')
        .ok_or_else(|| Error::InvalidData(format!("Expected COLUMN=FIELD, got '{}'", raw)))?;

    let column = column.trim();
    if column.is_empty() {
        return Err(Error::InvalidData(format!(
            "Missing column name in '{}'",
            raw
        )));
    }

    let target: MapTarget = target
        .trim()
        .parse()
        .map_err(|e: String| Error::UnknownField(e))?;

    Ok((column.to_string(), target))
}

/// Apply manual overrides on top of proposed mappings
///
/// Each override must name an existing source column.
pub fn apply_overrides(
    mappings: &mut [ColumnMapping],
    overrides: &[(String, MapTarget)],
) -> Result<()> {
    for (column, target) in overrides {
        let mapping = mappings
            .iter_mut()
            .find(|m| &m.source == column)
            .ok_or_else(|| Error::NotFound(format!("No column named '{}' in file", column)))?;
        mapping.target = *target;
    }
    Ok(())
}

/// Header row for a downloadable import template, in known-field order
pub fn template_csv() -> String {
    let labels: Vec<&str> = KnownField::ALL.iter().map(|f| f.label()).collect();
    format!("{}\n", labels.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_auto_map_standard_headers() {
        let mappings = auto_map(
            &headers(&["First Name", "Last Name", "Email", "HubSpot Score"]),
            None,
        );

        assert_eq!(mappings[0].target, MapTarget::Field(KnownField::FirstName));
        assert_eq!(mappings[1].target, MapTarget::Field(KnownField::LastName));
        assert_eq!(mappings[2].target, MapTarget::Field(KnownField::Email));
        assert_eq!(mappings[3].target, MapTarget::Skip);
    }

    #[test]
    fn test_auto_map_normalizes_punctuation_and_case() {
        let mappings = auto_map(
            &headers(&["E-MAIL", "first_name", "Zip", "LinkedIn URL"]),
            None,
        );

        assert_eq!(mappings[0].target, MapTarget::Field(KnownField::Email));
        assert_eq!(mappings[1].target, MapTarget::Field(KnownField::FirstName));
        assert_eq!(mappings[2].target, MapTarget::Field(KnownField::ZipCode));
        assert_eq!(mappings[3].target, MapTarget::Field(KnownField::Linkedin));
    }

    #[test]
    fn test_auto_map_containment_prefers_enumeration_order() {
        // "name" is contained by both "First Name" and "Last Name"; the
        // first field in enumeration order wins
        let mappings = auto_map(&headers(&["Name"]), None);
        assert_eq!(mappings[0].target, MapTarget::Field(KnownField::FirstName));

        // "Title" matches inside "Job Title"
        let mappings = auto_map(&headers(&["Title"]), None);
        assert_eq!(mappings[0].target, MapTarget::Field(KnownField::JobTitle));
    }

    #[test]
    fn test_auto_map_is_deterministic() {
        let input = headers(&["Phone Number", "Company Name", "Notes", "Mystery"]);
        let first = auto_map(&input, None);
        let second = auto_map(&input, None);
        assert_eq!(first, second);
        assert_eq!(first[0].target, MapTarget::Field(KnownField::Phone));
        assert_eq!(first[1].target, MapTarget::Field(KnownField::Company));
        assert_eq!(first[3].target, MapTarget::Skip);
    }

    #[test]
    fn test_auto_map_empty_normalization_skips() {
        let mappings = auto_map(&headers(&["###", "  ", "号码"]), None);
        assert!(mappings.iter().all(|m| m.target.is_skip()));
    }

    #[test]
    fn test_auto_map_attaches_samples() {
        let mut row = SourceRow::new();
        row.insert("Email".to_string(), "jane@example.com".to_string());
        row.insert("Phone".to_string(), "".to_string());

        let mappings = auto_map(&headers(&["Email", "Phone"]), Some(&row));
        assert_eq!(mappings[0].sample.as_deref(), Some("jane@example.com"));
        // Empty cells make no preview
        assert_eq!(mappings[1].sample, None);
    }

    #[test]
    fn test_parse_override() {
        let (column, target) = parse_override("HubSpot Score=skip").unwrap();
        assert_eq!(column, "HubSpot Score");
        assert_eq!(target, MapTarget::Skip);

        let (column, target) = parse_override("Primary Contact=first_name").unwrap();
        assert_eq!(column, "Primary Contact");
        assert_eq!(target, MapTarget::Field(KnownField::FirstName));

        assert!(parse_override("no-equals-sign").is_err());
        assert!(parse_override("=email").is_err());
        assert!(parse_override("Col=not_a_field").is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut mappings = auto_map(&headers(&["Email", "Mystery"]), None);
        assert_eq!(mappings[1].target, MapTarget::Skip);

        let overrides = vec![
            ("Mystery".to_string(), MapTarget::Field(KnownField::Notes)),
            ("Email".to_string(), MapTarget::Skip),
        ];
        apply_overrides(&mut mappings, &overrides).unwrap();
        assert_eq!(mappings[1].target, MapTarget::Field(KnownField::Notes));
        assert_eq!(mappings[0].target, MapTarget::Skip);

        let missing = vec![("Nope".to_string(), MapTarget::Skip)];
        assert!(apply_overrides(&mut mappings, &missing).is_err());
    }

    #[test]
    fn test_map_target_serialization() {
        let json = serde_json::to_string(&MapTarget::Field(KnownField::WorkPhone)).unwrap();
        assert_eq!(json, r#""work_phone""#);
        let json = serde_json::to_string(&MapTarget::Skip).unwrap();
        assert_eq!(json, r#""skip""#);

        let target: MapTarget = serde_json::from_str(r#""tags""#).unwrap();
        assert_eq!(target, MapTarget::Field(KnownField::Tags));
    }

    #[test]
    fn test_template_csv() {
        let template = template_csv();
        assert!(template.starts_with("First Name,Last Name,Full Name,Email"));
        assert!(template.ends_with("Notes,Tags\n"));
        assert_eq!(template.matches(',').count(), 19);
    }
}
