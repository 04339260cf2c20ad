use log::error;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default capacity of the traversal todo stack
pub const DEFAULT_TODO_CAPACITY: usize = 64;

/// Build and traversal parameters of a [`crate::KdTree`].
///
/// Every field has a default, so a partial YAML document (or an empty one) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KdTreeConfig {
    /// Estimated cost of one primitive intersection test
    pub intersect_cost: f32,

    /// Estimated cost of visiting one interior node
    pub traversal_cost: f32,

    /// Cost discount for splits that leave one side empty, in `[0, 1]`
    pub empty_bonus: f32,

    /// Nodes with at most this many primitives become leaves
    pub max_prims_per_leaf: usize,

    /// Maximum tree depth. Negative values select `round(8 + 1.3 * log2(N))`.
    pub max_depth: i32,

    /// Capacity of the traversal todo stack. Must be at least the tree depth.
    pub todo_capacity: usize,
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            intersect_cost: 80.0,
            traversal_cost: 1.0,
            empty_bonus: 0.5,
            max_prims_per_leaf: 1,
            max_depth: -1,
            todo_capacity: DEFAULT_TODO_CAPACITY,
        }
    }
}

impl KdTreeConfig {
    /// Reads the configuration from the provided YAML reader.
    ///
    /// # Arguments
    /// * `reader` - The reader to read the configuration from.
    pub fn read<R: std::io::Read>(reader: R) -> Result<Self> {
        let config: KdTreeConfig = serde_yaml::from_reader(reader).map_err(|e| {
            error!("Failed to parse the kd-tree configuration: {:?}", e);

            Error::DeserializationError(Box::new(e))
        })?;

        Ok(config)
    }

    /// Writes the configuration as YAML to the provided writer.
    ///
    /// # Arguments
    /// * `writer` - The writer to write the configuration to.
    pub fn write<W: std::io::Write>(&self, mut writer: W) -> Result<()> {
        let yaml = serde_yaml::to_string(&self).map_err(|e| {
            error!("Failed to serialize the kd-tree configuration: {:?}", e);

            Error::SerializationError(Box::new(e))
        })?;

        writer.write_all(yaml.as_bytes())?;

        Ok(())
    }

    /// Maximum depth for a tree over `primitive_count` primitives
    pub fn resolved_max_depth(&self, primitive_count: usize) -> u32 {
        if self.max_depth >= 0 {
            return self.max_depth as u32;
        }
        let n = primitive_count.max(1) as f32;
        (8.0 + 1.3 * n.log2()).round() as u32
    }

    /// Checks the parameters for a tree over `primitive_count` primitives
    pub fn validate(&self, primitive_count: usize) -> Result<()> {
        for (name, value) in [
            ("intersect_cost", self.intersect_cost),
            ("traversal_cost", self.traversal_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidCost { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.empty_bonus) {
            return Err(Error::InvalidEmptyBonus(self.empty_bonus));
        }

        if self.todo_capacity == 0 {
            return Err(Error::InvalidTodoCapacity);
        }

        // every todo entry is pushed by a distinct interior node on the current path
        let max_depth = self.resolved_max_depth(primitive_count);
        if max_depth as usize > self.todo_capacity {
            return Err(Error::MaxDepthExceedsStack {
                max_depth,
                capacity: self.todo_capacity,
            });
        }

        Ok(())
    }
}
