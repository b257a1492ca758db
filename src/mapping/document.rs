//! Decoded mapping documents
//!
//! The document mirrors what users write: top-level notes, groups that
//! supply shared defaults, and conditions keyed by input velocity. Values
//! are kept as raw integers here; range checks happen in the compiler.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::MalformedMappingError;
use super::xml;

/// A mapping definition as written on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingDocument {
    /// Human-readable name (e.g. "SSD5 to MuseScore")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Top-level notes
    #[serde(default)]
    pub notes: Vec<NoteElement>,

    /// Groups of notes sharing a default target and velocity
    #[serde(default)]
    pub groups: Vec<GroupElement>,

    /// Rules that only apply at an exact input velocity
    #[serde(default)]
    pub conditions: Vec<ConditionElement>,
}

/// `Note{from, to?, velocity?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteElement {
    pub from: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
    /// Fixed output velocity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<i64>,
}

/// `Group{to?, velocity?}` with nested notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<i64>,
    #[serde(default)]
    pub notes: Vec<NoteElement>,
}

/// Condition container: its rules apply when input velocity == `velocity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionElement {
    pub velocity: i64,
    #[serde(default)]
    pub notes: Vec<NoteElement>,
    #[serde(default)]
    pub groups: Vec<GroupElement>,
}

/// On-disk encodings of a mapping document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Xml,
}

impl DocumentFormat {
    /// Pick a format from a file extension; anything unknown is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("xml") => DocumentFormat::Xml,
            _ => DocumentFormat::Yaml,
        }
    }

    /// Whether a file extension names a mapping document
    pub fn is_mapping_file(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml" | "json" | "xml")
        )
    }
}

impl MappingDocument {
    /// Decode a document in the given format
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, MalformedMappingError> {
        let doc = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(text)?,
            DocumentFormat::Json => serde_json::from_str(text)?,
            DocumentFormat::Xml => xml::from_str(text)?,
        };
        Ok(doc)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, MalformedMappingError> {
        Self::parse(text, DocumentFormat::Yaml)
    }

    pub fn from_json_str(text: &str) -> Result<Self, MalformedMappingError> {
        Self::parse(text, DocumentFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_document() {
        let yaml = r#"
name: SSD5 to MuseScore
notes:
  - { from: 36, to: 35 }
groups:
  - to: 38
    velocity: 127
    notes:
      - from: 36
        velocity: 100
      - from: 40
conditions:
  - velocity: 127
    notes:
      - { from: 38, to: 40 }
"#;
        let doc = MappingDocument::from_yaml_str(yaml).unwrap();
        assert_eq!(doc.name.as_deref(), Some("SSD5 to MuseScore"));
        assert_eq!(doc.notes.len(), 1);
        assert_eq!(doc.groups[0].to, Some(38));
        assert_eq!(doc.groups[0].notes[1].to, None);
        assert_eq!(doc.conditions[0].velocity, 127);
        assert!(doc.conditions[0].groups.is_empty());
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"notes": [{"from": 42, "to": 44, "velocity": 90}]}"#;
        let doc = MappingDocument::from_json_str(json).unwrap();
        assert_eq!(doc.notes[0].velocity, Some(90));
        assert!(doc.name.is_none());
    }

    #[test]
    fn test_non_integer_attribute_is_rejected() {
        let yaml = "notes:\n  - { from: kick, to: 36 }\n";
        let err = MappingDocument::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, MalformedMappingError::Decode(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let yaml = "notes:\n  - { from: 36, target: 38 }\n";
        assert!(MappingDocument::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_parse_xml_reports_decode_error() {
        let doc = MappingDocument::parse(
            r#"<Mapping><Note from="42" to="44"/></Mapping>"#,
            DocumentFormat::Xml,
        )
        .unwrap();
        assert_eq!(doc.notes[0].to, Some(44));

        let err = MappingDocument::parse(r#"<Mapping><Note from="x"/></Mapping>"#, DocumentFormat::Xml)
            .unwrap_err();
        assert!(matches!(err, MalformedMappingError::Decode(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a_to_b.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a_to_b.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a_to_b.XML")), DocumentFormat::Xml);
        assert!(DocumentFormat::is_mapping_file(Path::new("a_to_b.xml")));
        assert!(DocumentFormat::is_mapping_file(Path::new("a_to_b.yaml")));
        assert!(!DocumentFormat::is_mapping_file(Path::new("notes.txt")));
    }
}
