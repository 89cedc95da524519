//! TOML merge plans.
//!
//! A plan names the JSON sources to merge, the policy applied between them,
//! literal values inserted last and an optional output path:
//!
//! ```toml
//! policy = "preserve"
//! sources = ["defaults.json", "site.json"]
//! output = "names.json"
//!
//! [values]
//! Environment = "staging"
//! Hosts = ["a.example.com", "b.example.com"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csub_naming::{MergePolicy, PropertyBag, RawValue};
use serde::{Deserialize, Serialize};

/// A merge plan loaded from TOML. Missing fields take their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePlan {
    /// Policy applied when a later source repeats an earlier name.
    pub policy: MergePolicy,
    /// JSON documents merged in order.
    pub sources: Vec<PathBuf>,
    /// Where to write the merged document.
    pub output: Option<PathBuf>,
    /// Literal values inserted after all sources, replacing existing ones.
    pub values: toml::Table,
}

impl MergePlan {
    /// Load a plan from a TOML file. Relative source and output paths are
    /// resolved against the plan's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading merge plan {}", path.display()))?;
        let mut plan: MergePlan = toml::from_str(&text)
            .with_context(|| format!("parsing merge plan {}", path.display()))?;

        if let Some(base) = path.parent() {
            plan.sources = plan.sources.into_iter().map(|s| base.join(s)).collect();
            plan.output = plan.output.map(|o| base.join(o));
        }
        Ok(plan)
    }

    /// The plan's literal values as raw merge input.
    pub fn literal_values(&self) -> PropertyBag {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), raw_from_toml(value)))
            .collect()
    }
}

/// TOML arrays are written as literal lists, so they flatten like arrays.
fn raw_from_toml(value: &toml::Value) -> RawValue {
    match value {
        toml::Value::String(s) => RawValue::from(s),
        toml::Value::Integer(i) => RawValue::from(*i),
        toml::Value::Float(f) => RawValue::from(*f),
        toml::Value::Boolean(b) => RawValue::from(*b),
        toml::Value::Datetime(dt) => RawValue::from(dt.to_string()),
        toml::Value::Array(items) => RawValue::Array(items.iter().map(raw_from_toml).collect()),
        toml::Value::Table(table) => RawValue::Bag(
            table
                .iter()
                .map(|(name, value)| (name.clone(), raw_from_toml(value)))
                .collect(),
        ),
    }
}
