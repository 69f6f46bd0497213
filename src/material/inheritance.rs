//! Definition inheritance resolution
//!
//! For every record with a parent, each unset field is filled from the
//! nearest ancestor that sets it. Fields are resolved independently: one
//! field missing along the whole chain never stops the others from
//! resolving. A parent name that matches no record simply ends the walk.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::material::definition::MaterialDefinition;
use crate::material::parser::MaterialError;

/// Copy every still-unset inheritable field from an ancestor record
///
/// Listing the fields once here replaces the original renderer's
/// pointer-to-member fill with a plain field table.
macro_rules! inherit_unset_fields {
    ($child:expr, $ancestor:expr; $($field:ident),* $(,)?) => {
        $(
            if $child.$field.is_none() && $ancestor.$field.is_some() {
                $child.$field = $ancestor.$field.clone();
            }
        )*
    };
}

fn fill_from_ancestor(child: &mut MaterialDefinition, ancestor: &MaterialDefinition) {
    inherit_unset_fields!(child, ancestor;
        states,
        defines,
        sampler_states,
        depth_bias,
        slope_scaled_depth_bias,
        vertex_shader,
        fragment_shader,
        geometry_shader,
        tessellation_evaluation_shader,
        tessellation_control_shader,
        vertex_fields,
        front_face,
        back_face,
        stencil_ref,
        stencil_read_mask,
        stencil_write_mask,
        msaa_support,
        primitive_mode,
        source_blend_factor,
        destination_blend_factor,
        alpha_src,
        alpha_dst,
        depth_func,
        textures,
        filters,
        fallback,
        render_queue,
        pass,
        dependencies,
        texture_inputs,
        texture_outputs,
    );
}

/// Resolve inheritance for every definition in the set, in place
///
/// Records are processed in sorted-name order so the result is
/// deterministic. Walking a chain visits the nearest ancestor first, so the
/// nearest ancestor that sets a field always wins. A cycle in the parent
/// chain is a configuration error and fails the whole set.
pub fn resolve_inheritance(
    definitions: &mut HashMap<String, MaterialDefinition>,
) -> Result<(), MaterialError> {
    let mut names: Vec<String> = definitions.keys().cloned().collect();
    names.sort();

    for name in names {
        let Some(record) = definitions.get(&name) else {
            continue;
        };
        if record.parent_name.is_none() {
            // No parent? I guess we get what we have then
            continue;
        }

        let mut resolved = record.clone();
        let mut visited = HashSet::new();
        visited.insert(name.clone());

        let mut cursor = resolved.parent_name.clone();
        while let Some(ancestor_name) = cursor {
            if !visited.insert(ancestor_name.clone()) {
                return Err(MaterialError::ParentCycle { name });
            }

            // A parent that doesn't exist in this set just ends the chain
            let Some(ancestor) = definitions.get(&ancestor_name) else {
                break;
            };

            fill_from_ancestor(&mut resolved, ancestor);
            cursor = ancestor.parent_name.clone();
        }

        trace!(definition = %name, "Filled in all inherited fields");
        definitions.insert(name, resolved);
    }

    Ok(())
}
