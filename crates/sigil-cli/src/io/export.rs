//! Output materialization: turn a rehydrated description back into files.
//!
//! Trees of mappings and blobs (the shape directory ingestion produces)
//! materialize as directories and files. Any other shape is written as a
//! single JSON description, the inverse of `.json` ingestion.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sigil_core::model::{self, Node};

/// What `materialize` wrote at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Tree,
    Json,
}

impl Materialized {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Json => "json",
        }
    }
}

pub fn materialize(node: &Node, dest: &Path) -> Result<Materialized> {
    if fs_shaped(node) {
        write_tree(node, dest)?;
        return Ok(Materialized::Tree);
    }

    let value = model::to_json_value(node)?;
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut rendered = serde_json::to_string_pretty(&value)?;
    rendered.push('\n');
    fs::write(dest, rendered).with_context(|| format!("cannot write {}", dest.display()))?;
    Ok(Materialized::Json)
}

/// A tree is filesystem-shaped when it is a blob, or a mapping whose values
/// are all filesystem-shaped.
fn fs_shaped(node: &Node) -> bool {
    match node {
        Node::Blob(_) => true,
        Node::Mapping(entries) => entries.iter().all(|(_, v)| fs_shaped(v)),
        Node::Scalar(_) | Node::Sequence(_) | Node::ContentRef(_) => false,
    }
}

fn write_tree(node: &Node, dest: &Path) -> Result<()> {
    match node {
        Node::Blob(bytes) => {
            if let Some(parent) = dest.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(dest, bytes).with_context(|| format!("cannot write {}", dest.display()))?;
        }
        Node::Mapping(entries) => {
            fs::create_dir_all(dest)?;
            for (name, child) in entries {
                write_tree(child, &dest.join(name))?;
            }
        }
        // Unreachable behind fs_shaped; kept exhaustive on purpose.
        Node::Scalar(_) | Node::Sequence(_) | Node::ContentRef(_) => {
            anyhow::bail!("cannot materialize {} as a file", node.kind_name());
        }
    }
    Ok(())
}
