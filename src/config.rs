//! Lab catalog file support
//!
//! Computer labs are reference data: they are listed in a YAML file and
//! upserted by name at startup.
//!
//! ```yaml
//! labs:
//!   - name: "Lab #1"
//!     computer_count: 24
//!     description: "Ground floor, next to the library"
//!   - name: "Lab #2"
//!     computer_count: 16
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use arena_core::{ArenaService, LabSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lab catalog file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabCatalog {
    #[serde(default)]
    pub labs: Vec<LabSpec>,
}

impl LabCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lab catalog: {:?}", path))?;

        Self::parse(&content)
    }

    /// Parse a catalog from YAML
    pub fn parse(content: &str) -> Result<Self> {
        let catalog: LabCatalog =
            serde_yaml::from_str(content).context("Failed to parse YAML lab catalog")?;

        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for lab in &self.labs {
            let name = lab.name.trim();
            if name.is_empty() {
                anyhow::bail!("Lab name cannot be empty");
            }
            if !names.insert(name.to_lowercase()) {
                anyhow::bail!("Duplicate lab name: {}", name);
            }
            if lab.computer_count < 0 {
                anyhow::bail!(
                    "Lab '{}' has a negative computer count ({})",
                    name,
                    lab.computer_count
                );
            }
        }
        Ok(())
    }

    /// Upsert every lab, returning how many were registered
    pub async fn register(&self, service: &ArenaService) -> Result<usize> {
        for spec in &self.labs {
            let lab = service
                .register_lab(spec.clone())
                .await
                .with_context(|| format!("Failed to register lab '{}'", spec.name))?;
            debug!(
                "Lab {} ready with {} computers",
                lab.name, lab.computer_count
            );
        }
        Ok(self.labs.len())
    }
}
