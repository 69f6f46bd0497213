//! Texture aliasing planner
//!
//! Two logical texture resources can share one physical texture when their
//! usage ranges in the compiled pass order never overlap and their formats
//! are identical. The assignment is greedy: a resource may only alias a
//! resource that appeared earlier in the pass order, which keeps the planner
//! linear-ish and predictable instead of an optimal packing.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::graph::pass::{RenderPassNode, TextureFormat, TextureResource};

/// Reserved name of the swap-chain texture; never aliased in either direction
pub const BACKBUFFER_TEXTURE: &str = "Backbuffer";

/// The span of pass indices over which one resource is read and written
#[derive(Debug, Clone, Copy)]
struct UsageRange {
    first_write_pass: u32,
    last_write_pass: u32,
    first_read_pass: u32,
    last_read_pass: u32,
}

impl Default for UsageRange {
    fn default() -> Self {
        Self {
            first_write_pass: u32::MAX,
            last_write_pass: 0,
            first_read_pass: u32::MAX,
            last_read_pass: 0,
        }
    }
}

impl UsageRange {
    fn record_write(&mut self, pass_idx: u32) {
        self.first_write_pass = self.first_write_pass.min(pass_idx);
        self.last_write_pass = self.last_write_pass.max(pass_idx);
    }

    fn record_read(&mut self, pass_idx: u32) {
        self.first_read_pass = self.first_read_pass.min(pass_idx);
        self.last_read_pass = self.last_read_pass.max(pass_idx);
    }

    fn has_writer(&self) -> bool {
        self.first_write_pass <= self.last_write_pass
    }

    fn has_reader(&self) -> bool {
        self.first_read_pass <= self.last_read_pass
    }

    fn is_used(&self) -> bool {
        self.has_writer() || self.has_reader()
    }

    fn can_alias(&self) -> bool {
        // If we read from this resource before its writes have finished we
        // have to preserve its contents, so no aliasing is possible
        !(self.has_reader() && self.has_writer() && self.first_read_pass <= self.first_write_pass)
    }

    fn first_used_pass(&self) -> u32 {
        let mut first_pass = u32::MAX;
        if self.has_writer() {
            first_pass = first_pass.min(self.first_write_pass);
        }
        if self.has_reader() {
            first_pass = first_pass.min(self.first_read_pass);
        }
        first_pass
    }

    fn last_used_pass(&self) -> u32 {
        let mut last_pass = 0;
        if self.has_writer() {
            last_pass = last_pass.max(self.last_write_pass);
        }
        if self.has_reader() {
            last_pass = last_pass.max(self.last_read_pass);
        }
        last_pass
    }

    fn is_disjoint_with(&self, other: &UsageRange) -> bool {
        if !self.is_used() || !other.is_used() {
            return false;
        }
        if !self.can_alias() || !other.can_alias() {
            return false;
        }

        let left = self.last_used_pass() < other.first_used_pass();
        let right = other.last_used_pass() < self.first_used_pass();
        left || right
    }
}

/// Physical texture assignments for every declared resource
///
/// `assignments` maps each logical resource name to an index into
/// `physical_textures`; aliased resources map to the same index.
#[derive(Debug, Clone, Default)]
pub struct TextureAliasPlan {
    pub physical_textures: Vec<TextureFormat>,
    pub assignments: HashMap<String, usize>,
}

impl TextureAliasPlan {
    /// The physical texture backing a resource, if the resource is known
    pub fn texture_for(&self, resource: &str) -> Option<&TextureFormat> {
        self.assignments
            .get(resource)
            .and_then(|&idx| self.physical_textures.get(idx))
    }
}

/// Plan physical texture storage for every declared resource
///
/// `ordered_passes` must be the compiled execution order. Resources are
/// considered in first-use order; each one may only alias an
/// already-considered resource, and only when their ranges are disjoint and
/// their formats match exactly.
pub fn plan_aliases(
    ordered_passes: &[RenderPassNode],
    textures: &HashMap<String, TextureResource>,
) -> TextureAliasPlan {
    // Look at what range of render passes each resource is used in
    let mut resource_used_range: HashMap<&str, UsageRange> = HashMap::new();
    let mut resources_in_order: Vec<&str> = Vec::new();

    for (pass_idx, pass) in ordered_passes.iter().enumerate() {
        let pass_idx = pass_idx as u32;

        for input in &pass.texture_inputs {
            resource_used_range
                .entry(input.as_str())
                .or_default()
                .record_read(pass_idx);
            if !resources_in_order.contains(&input.as_str()) {
                resources_in_order.push(input.as_str());
            }
        }

        for output in &pass.texture_outputs {
            resource_used_range
                .entry(output.as_str())
                .or_default()
                .record_write(pass_idx);
            if !resources_in_order.contains(&output.as_str()) {
                resources_in_order.push(output.as_str());
            }
        }
    }

    // Figure out which resources can be aliased. Each resource may only
    // alias one that appeared before it
    let mut aliases: HashMap<&str, &str> = HashMap::new();

    for i in 0..resources_in_order.len() {
        let to_alias_name = resources_in_order[i];
        if to_alias_name == BACKBUFFER_TEXTURE {
            continue;
        }
        let Some(to_alias_format) = textures.get(to_alias_name).map(|t| &t.format) else {
            warn!(
                resource = to_alias_name,
                "Passes use a texture resource that resources.json doesn't declare"
            );
            continue;
        };

        for j in 0..i {
            let try_alias_name = resources_in_order[j];
            if try_alias_name == BACKBUFFER_TEXTURE {
                continue;
            }
            let Some(try_alias_format) = textures.get(try_alias_name).map(|t| &t.format) else {
                continue;
            };

            let disjoint = resource_used_range[to_alias_name]
                .is_disjoint_with(&resource_used_range[try_alias_name]);
            if disjoint && to_alias_format == try_alias_format {
                aliases.insert(to_alias_name, try_alias_name);
            }
        }
    }

    // Allocate one physical texture per alias-chain representative and point
    // every member of the chain at it. Declared-but-unused resources still
    // get their own texture
    let mut plan = TextureAliasPlan::default();

    let mut names: Vec<&String> = textures.keys().collect();
    names.sort();

    for name in names {
        let mut representative = name.as_str();
        while let Some(next) = aliases.get(representative) {
            representative = next;
        }

        if let Some(&idx) = plan.assignments.get(representative) {
            plan.assignments.insert(name.clone(), idx);
        } else {
            let Some(resource) = textures.get(representative) else {
                continue;
            };
            let idx = plan.physical_textures.len();
            plan.physical_textures.push(resource.format);
            plan.assignments.insert(representative.to_string(), idx);
            if representative != name.as_str() {
                plan.assignments.insert(name.clone(), idx);
            }
        }
    }

    debug!(
        logical = plan.assignments.len(),
        physical = plan.physical_textures.len(),
        "Planned physical texture assignments"
    );
    plan
}
