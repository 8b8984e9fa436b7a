//! Output document assembly and persistence.
//!
//! The single point of external side effect in the pipeline. A write
//! failure here is fatal and surfaces to the invoker; everything upstream
//! degrades instead of failing.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::actions::ActionDescriptor;
use crate::registry::TypeRegistry;

/// Fixed output filename, written at the project root.
pub const OUTPUT_FILE_NAME: &str = "actions.json";

/// The final output document.
#[derive(Debug, Serialize)]
pub struct ActionsDocument {
    pub actions: Vec<ActionDescriptor>,
    #[serde(rename = "typeAliases")]
    pub type_aliases: TypeRegistry,
}

impl ActionsDocument {
    pub fn new(actions: Vec<ActionDescriptor>, type_aliases: TypeRegistry) -> Self {
        ActionsDocument {
            actions,
            type_aliases,
        }
    }

    /// Render the document as JSON. Key order is insertion order
    /// throughout, so unchanged input yields byte-identical output.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
        .context("failed to serialize actions document")?;
        Ok(json)
    }

    /// Persist the document. Failure here is fatal to the run.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        let mut json = self.to_json(pretty)?;
        json.push('\n');
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
