use tracing::warn;

use crate::config::Config;
use crate::core::{ProjectionOptions, RefMode, SliceRequest};
use crate::error::{Result, SlicerError};
use crate::interaction::{DefaultsPrompter, Prompter};

/// Everything the operator decides before the pipeline runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub request: SliceRequest,
    pub projection: ProjectionOptions,
    /// Indent the rendered output
    pub pretty: bool,
    /// Send the literal-export form to the clipboard instead of stdout
    pub clipboard: bool,
}

impl SessionSettings {
    /// Run the prompt sequence in its fixed order.
    ///
    /// `preset_seeds` answers the seed question up front. With
    /// `accept_defaults` every later question takes its configured default.
    pub fn gather(
        prompter: &mut dyn Prompter,
        config: &Config,
        preset_seeds: Option<&str>,
        accept_defaults: bool,
    ) -> Result<Self> {
        let seed_answer = match preset_seeds {
            Some(seeds) => seeds.to_string(),
            None => prompter.ask("Seed declaration(s) (id, name or name fragment; comma-separated)", None)?,
        };
        let seeds = SliceRequest::parse_seed_list(&seed_answer);
        if seeds.is_empty() {
            return Err(SlicerError::SeedResolution { tokens: seeds });
        }

        if accept_defaults {
            Self::gather_options(&mut DefaultsPrompter, config, seeds)
        } else {
            Self::gather_options(prompter, config, seeds)
        }
    }

    /// Questions 2-8: radii and output shape
    fn gather_options(prompter: &mut dyn Prompter, config: &Config, seeds: Vec<String>) -> Result<Self> {
        let slicing = &config.slicing;
        let output = &config.output;

        let full_radius = ask_radius(prompter, "Full-detail radius", slicing.full_radius)?;
        let context_radius = ask_radius(
            prompter,
            "Structural-context radius (at least the full-detail radius)",
            slicing.context_radius,
        )?
        .max(full_radius);

        let include_children = ask_yes_no(prompter, "Include children in output tree?", output.include_children)?;
        let include_child_count = if include_children {
            output.include_child_count
        } else {
            ask_yes_no(prompter, "Include a child count instead?", output.include_child_count)?
        };

        let ref_mode = ask_ref_mode(prompter, output.ref_mode)?;
        let pretty = ask_yes_no(prompter, "Pretty-print the JSON output?", output.pretty)?;
        let clipboard = ask_yes_no(
            prompter,
            "Copy the output to the clipboard instead of stdout?",
            output.clipboard,
        )?;

        Ok(Self {
            request: SliceRequest::new(seeds, full_radius, context_radius),
            projection: ProjectionOptions {
                include_children,
                include_child_count,
                ref_mode,
                structural_fields: output.structural_fields.clone(),
            },
            pretty,
            clipboard,
        })
    }
}

fn ask_radius(prompter: &mut dyn Prompter, question: &str, default: usize) -> Result<usize> {
    let answer = prompter.ask(question, Some(&default.to_string()))?;
    match answer.parse::<usize>() {
        Ok(radius) => Ok(radius),
        Err(_) => {
            warn!("'{}' is not a non-negative integer, using {}", answer, default);
            Ok(default)
        }
    }
}

fn ask_yes_no(prompter: &mut dyn Prompter, question: &str, default: bool) -> Result<bool> {
    let shown = if default { "yes" } else { "no" };
    let answer = prompter.ask(question, Some(shown))?;
    match parse_yes_no(&answer) {
        Some(value) => Ok(value),
        None => {
            warn!("'{}' is not yes/no, using {}", answer, shown);
            Ok(default)
        }
    }
}

fn ask_ref_mode(prompter: &mut dyn Prompter, default: RefMode) -> Result<RefMode> {
    let answer = prompter.ask("Call reference display (id | name | both)", Some(&default.to_string()))?;
    match answer.parse::<RefMode>() {
        Ok(mode) => Ok(mode),
        Err(e) => {
            warn!("{}, using {}", e, default);
            Ok(default)
        }
    }
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
