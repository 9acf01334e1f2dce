//! Projection of a graph slice into an output document
//!
//! The projector turns the filtered ownership forest into [`ProjectedNode`]s;
//! the encoders serialise the resulting [`SliceDocument`] as JSON or as a
//! literal-export source text.

mod literal;
mod projector;

pub use literal::to_literal_export;
pub use projector::{Detail, ProjectedNode, Projector, SliceDocument, SliceStats};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// How `calls` / `calledBy` entries are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefMode {
    Id,
    Name,
    /// `name (id)`
    Both,
}

impl FromStr for RefMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(RefMode::Id),
            "name" => Ok(RefMode::Name),
            "both" => Ok(RefMode::Both),
            other => Err(format!("unknown reference mode '{}' (expected id, name or both)", other)),
        }
    }
}

impl fmt::Display for RefMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefMode::Id => "id",
            RefMode::Name => "name",
            RefMode::Both => "both",
        })
    }
}

/// Identity fields that may appear on structural (non full-detail) nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructuralField {
    Id,
    Name,
    Kind,
    Params,
    StartLine,
    EndLine,
}

impl StructuralField {
    pub fn defaults() -> Vec<StructuralField> {
        vec![
            StructuralField::Id,
            StructuralField::Name,
            StructuralField::Kind,
            StructuralField::StartLine,
            StructuralField::EndLine,
        ]
    }
}

/// Output shape switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub include_children: bool,
    /// Only consulted when children are omitted
    pub include_child_count: bool,
    pub ref_mode: RefMode,
    pub structural_fields: Vec<StructuralField>,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            include_children: true,
            include_child_count: true,
            ref_mode: RefMode::Name,
            structural_fields: StructuralField::defaults(),
        }
    }
}

/// Document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json { pretty: bool },
    /// `export default { ... };` with raw template blocks for source text
    LiteralExport { pretty: bool },
}

/// Serialise a document; the result always ends with a newline
pub fn render(document: &SliceDocument, encoding: Encoding) -> Result<String> {
    let mut rendered = match encoding {
        Encoding::Json { pretty: true } => serde_json::to_string_pretty(document)?,
        Encoding::Json { pretty: false } => serde_json::to_string(document)?,
        Encoding::LiteralExport { pretty } => {
            let value = serde_json::to_value(document)?;
            to_literal_export(&value, pretty)
        }
    };
    rendered.push('\n');
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_mode_parsing() {
        assert_eq!("ID".parse::<RefMode>().unwrap(), RefMode::Id);
        assert_eq!(" both ".parse::<RefMode>().unwrap(), RefMode::Both);
        assert!("names".parse::<RefMode>().is_err());
    }

    #[test]
    fn test_structural_field_names() {
        let json = serde_json::to_string(&StructuralField::defaults()).unwrap();
        assert_eq!(json, r#"["id","name","kind","startLine","endLine"]"#);
    }
}
