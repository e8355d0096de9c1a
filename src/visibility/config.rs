use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Options controlling how meshes are grouped into big cubes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigCubeConfig {
    /// Most meshes a single cube may own.
    pub max_group_size: usize,
    /// Bound on the spread of member mesh centres: grouping cells are sized
    /// so every centre in one lies within this distance of the cell centre.
    /// The stored cube radius also covers the members' own spheres, so it
    /// can be larger.
    pub max_radius: f32,
}

impl Default for BigCubeConfig {
    fn default() -> Self {
        Self {
            max_group_size: 64,
            max_radius: 4096.0,
        }
    }
}

impl BigCubeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BigCubeConfig =
            serde_json::from_str(json).context("Failed to parse big cube config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_group_size == 0 {
            bail!("max_group_size must be at least 1");
        }
        if !self.max_radius.is_finite() || self.max_radius <= 0.0 {
            bail!("max_radius must be positive and finite, got {}", self.max_radius);
        }
        Ok(())
    }
}
