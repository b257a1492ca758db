//! XML encoding of mapping documents
//!
//! ```xml
//! <Mapping name="SSD5 to GM">
//!   <Note from="36" to="35"/>
//!   <Group to="42" velocity="100">
//!     <Note from="8"/>
//!   </Group>
//!   <If velocity="1">
//!     <Note from="38" to="37" velocity="40"/>
//!   </If>
//! </Mapping>
//! ```
//!
//! The root element name is not checked.

use serde::Deserialize;

use super::document::{ConditionElement, GroupElement, MappingDocument, NoteElement};

#[derive(Debug, Deserialize)]
struct XmlMapping {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "Note", default)]
    notes: Vec<XmlNote>,
    #[serde(rename = "Group", default)]
    groups: Vec<XmlGroup>,
    #[serde(rename = "If", default)]
    conditions: Vec<XmlCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlNote {
    #[serde(rename = "@from")]
    from: i64,
    #[serde(rename = "@to", default)]
    to: Option<i64>,
    #[serde(rename = "@velocity", default)]
    velocity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct XmlGroup {
    #[serde(rename = "@to", default)]
    to: Option<i64>,
    #[serde(rename = "@velocity", default)]
    velocity: Option<i64>,
    #[serde(rename = "Note", default)]
    notes: Vec<XmlNote>,
}

#[derive(Debug, Deserialize)]
struct XmlCondition {
    #[serde(rename = "@velocity")]
    velocity: i64,
    #[serde(rename = "Note", default)]
    notes: Vec<XmlNote>,
    #[serde(rename = "Group", default)]
    groups: Vec<XmlGroup>,
}

impl From<XmlNote> for NoteElement {
    fn from(note: XmlNote) -> Self {
        NoteElement {
            from: note.from,
            to: note.to,
            velocity: note.velocity,
        }
    }
}

impl From<XmlGroup> for GroupElement {
    fn from(group: XmlGroup) -> Self {
        GroupElement {
            to: group.to,
            velocity: group.velocity,
            notes: group.notes.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<XmlCondition> for ConditionElement {
    fn from(condition: XmlCondition) -> Self {
        ConditionElement {
            velocity: condition.velocity,
            notes: condition.notes.into_iter().map(Into::into).collect(),
            groups: condition.groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<XmlMapping> for MappingDocument {
    fn from(mapping: XmlMapping) -> Self {
        MappingDocument {
            name: mapping.name,
            notes: mapping.notes.into_iter().map(Into::into).collect(),
            groups: mapping.groups.into_iter().map(Into::into).collect(),
            conditions: mapping.conditions.into_iter().map(Into::into).collect(),
        }
    }
}

pub(super) fn from_str(text: &str) -> Result<MappingDocument, quick_xml::DeError> {
    let mapping: XmlMapping = quick_xml::de::from_str(text)?;
    Ok(mapping.into())
}
