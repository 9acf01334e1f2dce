use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{Dialect, RefMode, StructuralField};
use crate::error::{Result, SlicerError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source parsing configuration
    pub parsing: ParsingConfig,

    /// Default slice radii offered at the prompts
    pub slicing: SlicingConfig,

    /// Output shape defaults and sink settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,

    /// Grammar to use; `auto` picks one from the file extension
    pub language: Dialect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicingConfig {
    /// Hops from a seed that still receive full source text
    pub full_radius: usize,

    /// Hops from a seed that receive a structural stub
    pub context_radius: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub include_children: bool,

    /// Emit `childCount` when children are omitted
    pub include_child_count: bool,

    /// How call references are rendered
    pub ref_mode: RefMode,

    /// Indent the JSON output
    pub pretty: bool,

    /// Send output to the clipboard instead of stdout
    pub clipboard: bool,

    /// Identity fields kept on structural (non full-detail) nodes
    pub structural_fields: Vec<StructuralField>,

    /// Explicit clipboard command, e.g. `["xclip", "-selection", "clipboard"]`
    pub clipboard_command: Option<Vec<String>>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            max_file_size: 4 * 1024 * 1024, // 4MB
            language: Dialect::Auto,
        }
    }
}

impl Default for SlicingConfig {
    fn default() -> Self {
        Self {
            full_radius: 1,
            context_radius: 2,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_children: true,
            include_child_count: true,
            ref_mode: RefMode::Name,
            pretty: true,
            clipboard: false,
            structural_fields: StructuralField::defaults(),
            clipboard_command: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SlicerError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SlicerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(SlicerError::Config(format!(
                        "configuration file {} does not exist",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["callslice.toml", ".callslice.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_prompt_defaults() {
        let config = Config::default();
        assert_eq!(config.slicing.full_radius, 1);
        assert_eq!(config.slicing.context_radius, 2);
        assert!(config.output.include_children);
        assert!(config.output.include_child_count);
        assert_eq!(config.output.ref_mode, RefMode::Name);
        assert!(config.output.pretty);
        assert!(!config.output.clipboard);
    }

    #[test]
    fn test_partial_toml_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
[slicing]
context_radius = 5

[output]
ref_mode = "both"
structural_fields = ["id", "name"]
"#,
        )
        .unwrap();

        assert_eq!(config.slicing.full_radius, 1);
        assert_eq!(config.slicing.context_radius, 5);
        assert_eq!(config.output.ref_mode, RefMode::Both);
        assert_eq!(
            config.output.structural_fields,
            vec![StructuralField::Id, StructuralField::Name]
        );
        assert_eq!(config.parsing.language, Dialect::Auto);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callslice.toml");

        let mut config = Config::default();
        config.parsing.language = Dialect::Tsx;
        config.output.clipboard_command = Some(vec!["wl-copy".to_string()]);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.parsing.language, Dialect::Tsx);
        assert_eq!(loaded.output.clipboard_command, Some(vec!["wl-copy".to_string()]));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let result = Config::load_or_default(Some("definitely/not/here.toml"));
        assert!(matches!(result, Err(SlicerError::Config(_))));
    }
}
