//! Render-graph dependency resolution
//!
//! Turns an unordered set of passes into a single execution order in which
//! every pass that writes a resource runs before every pass that reads it,
//! anchored at the mandatory `backbuffer` output. The traversal is a
//! backward walk from the backbuffer writers over the resource write maps,
//! driven by an explicit work stack with a visited set, so a cyclic or
//! misdeclared graph can never loop forever.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, warn};

use crate::graph::pass::RenderPassNode;

/// Reserved name of the final presentable output resource
pub const BACKBUFFER_RESOURCE: &str = "backbuffer";

/// Fatal render graph validation failures
///
/// Any of these abort the shaderpack load; the previously active shaderpack
/// stays in effect.
#[derive(Debug, thiserror::Error)]
pub enum RenderGraphError {
    #[error("render graph does not write to the backbuffer; this shaderpack cannot render anything")]
    NoBackbufferWriter,
}

enum Visit<'a> {
    Enter(&'a str),
    Exit(&'a str),
}

/// Compute the total execution order for a set of passes
///
/// Passes not transitively reachable from a backbuffer writer are left out
/// of the order. A pass reading a resource nobody writes is logged and
/// skipped, not an error: such reads usually name engine-provided resources
/// that are not modeled as passes. Ties among independent passes are broken
/// by sorted pass name, so the order is deterministic.
pub fn order_passes(
    passes: &HashMap<String, RenderPassNode>,
) -> Result<Vec<String>, RenderGraphError> {
    // Acceleration structures: resource name to the passes that write it,
    // and resource name to the passes that read it
    let mut resource_to_write_pass: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut resource_to_read_pass: HashMap<&str, Vec<&str>> = HashMap::new();

    let mut pass_names: Vec<&str> = passes.keys().map(String::as_str).collect();
    pass_names.sort_unstable();

    for &name in &pass_names {
        let pass = &passes[name];
        for input in &pass.texture_inputs {
            resource_to_read_pass
                .entry(input.as_str())
                .or_default()
                .push(name);
        }
        for output in &pass.texture_outputs {
            resource_to_write_pass
                .entry(output.as_str())
                .or_default()
                .push(name);
        }
    }

    let Some(backbuffer_writers) = resource_to_write_pass.get(BACKBUFFER_RESOURCE) else {
        error!("No pass writes to the backbuffer; unable to load this shaderpack because it can't render anything");
        return Err(RenderGraphError::NoBackbufferWriter);
    };

    // Post-order walk: a pass is emitted only after every pass that writes
    // one of its inputs, so writers always land before their readers
    let mut ordered_passes: Vec<String> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut visiting: HashSet<&str> = HashSet::new();
    let mut stack: Vec<Visit> = Vec::new();

    for &root in backbuffer_writers.iter().rev() {
        stack.push(Visit::Enter(root));
    }

    while let Some(item) = stack.pop() {
        match item {
            Visit::Enter(name) => {
                if visited.contains(name) {
                    continue;
                }
                if !visiting.insert(name) {
                    // Revisiting a pass currently on the stack means the
                    // graph has a cycle; break it here and keep going
                    warn!(
                        pass = name,
                        "Dependency cycle detected in render graph; breaking it at this pass"
                    );
                    continue;
                }
                stack.push(Visit::Exit(name));

                let pass = &passes[name];
                let mut upstream: Vec<&str> = Vec::new();

                for resource_name in &pass.texture_inputs {
                    match resource_to_write_pass.get(resource_name.as_str()) {
                        None => {
                            // Probably an implicitly defined resource, so the
                            // render order doesn't have to account for it
                            warn!(
                                pass = name,
                                resource = %resource_name,
                                "Pass reads from a resource that nothing writes to"
                            );
                        }
                        Some(write_passes) => upstream.extend(write_passes.iter().copied()),
                    }
                }

                for dependency in &pass.dependencies {
                    if passes.contains_key(dependency) {
                        upstream.push(dependency.as_str());
                    } else {
                        warn!(
                            pass = name,
                            dependency = %dependency,
                            "Pass depends on a pass that doesn't exist"
                        );
                    }
                }

                // Reversed so the first declared dependency is visited first
                for &dep in upstream.iter().rev() {
                    if !visited.contains(dep) {
                        stack.push(Visit::Enter(dep));
                    }
                }
            }
            Visit::Exit(name) => {
                visiting.remove(name);
                visited.insert(name);
                ordered_passes.push(name.to_string());
            }
        }
    }

    validate_order(&ordered_passes, &resource_to_write_pass, &resource_to_read_pass);

    debug!(passes = ?ordered_passes, "Compiled pass execution order");
    Ok(ordered_passes)
}

/// Sweep the final order for writer-after-reader pairs
///
/// With an acyclic graph this finds nothing; a broken cycle leaves the
/// best-effort order intact but flags each violated resource.
fn validate_order(
    ordered_passes: &[String],
    resource_to_write_pass: &HashMap<&str, Vec<&str>>,
    resource_to_read_pass: &HashMap<&str, Vec<&str>>,
) {
    let position: HashMap<&str, usize> = ordered_passes
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    for (resource, writers) in resource_to_write_pass {
        let Some(readers) = resource_to_read_pass.get(resource) else {
            continue;
        };
        for writer in writers {
            for reader in readers {
                if writer == reader {
                    continue;
                }
                let (Some(&write_at), Some(&read_at)) =
                    (position.get(writer), position.get(reader))
                else {
                    continue;
                };
                if write_at > read_at {
                    warn!(
                        resource = resource,
                        writer = writer,
                        reader = reader,
                        "Writer is ordered after a reader of its resource; output may be stale"
                    );
                }
            }
        }
    }
}
