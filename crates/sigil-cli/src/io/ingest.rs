//! Input ingestion: turn a path into a system description tree.
//!
//! Rules:
//! - a directory walks into nested mappings (entry name -> node), file
//!   contents becoming blobs
//! - a `.json` file parses as a JSON description
//!   (`sigil_core::model::from_json_value`)
//! - any other file becomes a single blob node
//!
//! Walking is deterministic: entries are visited in file-name order, and the
//! canonicalizer re-sorts mapping keys anyway. Symlinks are denied rather
//! than followed so two checkouts of the same tree cannot diverge silently.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use path_clean::PathClean;
use sigil_core::model::{self, Node};
use sigil_core::SigilError;
use walkdir::WalkDir;

/// Ingestion limits, enforced while walking.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub max_files: u64,
    pub max_total_bytes: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_files: 50_000,
            max_total_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Walk statistics for presentation.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IngestStats {
    pub files: u64,
    pub dirs: u64,
    pub bytes: u64,
}

/// Load any supported input into a description tree.
pub fn load_input(input: &str, opts: &IngestOptions) -> Result<(Node, IngestStats)> {
    let path = PathBuf::from(input).clean();
    let meta = fs::symlink_metadata(&path)
        .with_context(|| format!("cannot read input: {}", path.display()))?;

    if meta.file_type().is_symlink() {
        return Err(SigilError::malformed_input(format!(
            "symlink not supported: {}",
            path.display()
        ))
        .into());
    }

    if meta.is_dir() {
        return ingest_dir(&path, opts);
    }

    let mut stats = IngestStats {
        files: 1,
        ..IngestStats::default()
    };

    if path.extension().map(|e| e == "json").unwrap_or(false) {
        let raw = fs::read_to_string(&path)?;
        stats.bytes = raw.len() as u64;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| SigilError::malformed_input(format!("invalid JSON description: {e}")))?;
        let node = model::from_json_value(&value)?;
        return Ok((node, stats));
    }

    let bytes = fs::read(&path)?;
    stats.bytes = bytes.len() as u64;
    Ok((Node::Blob(Bytes::from(bytes)), stats))
}

/// One level of the in-progress directory tree.
enum Entry {
    Dir(Vec<(String, Entry)>),
    File(Bytes),
}

impl Entry {
    fn into_node(self) -> Node {
        match self {
            Entry::File(bytes) => Node::Blob(bytes),
            Entry::Dir(children) => Node::Mapping(
                children
                    .into_iter()
                    .map(|(name, child)| (name, child.into_node()))
                    .collect(),
            ),
        }
    }

    fn insert(&mut self, components: &[String], leaf: Entry) -> Result<()> {
        let Entry::Dir(children) = self else {
            return Err(anyhow!("walk produced a child under a file"));
        };
        let (head, rest) = components
            .split_first()
            .ok_or_else(|| anyhow!("walk produced an empty path"))?;
        if rest.is_empty() {
            children.push((head.clone(), leaf));
            return Ok(());
        }
        let child = children
            .iter_mut()
            .rev()
            .find(|(name, _)| name == head)
            .map(|(_, e)| e)
            .ok_or_else(|| anyhow!("walk visited {head} before its parent"))?;
        child.insert(rest, leaf)
    }
}

fn ingest_dir(root: &Path, opts: &IngestOptions) -> Result<(Node, IngestStats)> {
    let mut stats = IngestStats::default();
    let mut tree = Entry::Dir(Vec::new());

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
    {
        let entry = entry?;

        if entry.file_type().is_symlink() {
            return Err(SigilError::malformed_input(format!(
                "symlink not supported: {}",
                entry.path().display()
            ))
            .into());
        }

        let rel = entry.path().strip_prefix(root)?;
        let components = utf8_components(rel)?;

        if entry.file_type().is_dir() {
            stats.dirs += 1;
            tree.insert(&components, Entry::Dir(Vec::new()))?;
            continue;
        }

        stats.files += 1;
        if stats.files > opts.max_files {
            return Err(SigilError::malformed_input(format!(
                "file count exceeds limit ({})",
                opts.max_files
            ))
            .into());
        }

        let bytes = fs::read(entry.path())
            .with_context(|| format!("cannot read {}", entry.path().display()))?;
        stats.bytes += bytes.len() as u64;
        if stats.bytes > opts.max_total_bytes {
            return Err(SigilError::malformed_input(format!(
                "total bytes exceed limit ({})",
                opts.max_total_bytes
            ))
            .into());
        }

        tree.insert(&components, Entry::File(Bytes::from(bytes)))?;
    }

    Ok((tree.into_node(), stats))
}

fn utf8_components(rel: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for c in rel.iter() {
        let Some(s) = c.to_str() else {
            return Err(SigilError::malformed_input(format!(
                "non-UTF-8 path segment in {}",
                rel.display()
            ))
            .into());
        };
        out.push(s.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::model::Scalar;

    fn write(path: &Path, bytes: &[u8]) {
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn directory_becomes_nested_mappings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("b.txt"), b"two");
        fs::create_dir(root.join("sub")).unwrap();
        write(&root.join("sub").join("a.txt"), b"one");

        let (node, stats) = load_input(root.to_str().unwrap(), &IngestOptions::default()).unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.dirs, 1);

        let Node::Mapping(entries) = node else {
            panic!("expected mapping root");
        };
        let names: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "sub"]);
        match &entries[1].1 {
            Node::Mapping(sub) => match &sub[0].1 {
                Node::Blob(b) => assert_eq!(&b[..], b"one"),
                other => panic!("expected blob, got {}", other.kind_name()),
            },
            other => panic!("expected mapping, got {}", other.kind_name()),
        }
    }

    #[test]
    fn empty_directory_is_an_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _) = load_input(dir.path().to_str().unwrap(), &IngestOptions::default()).unwrap();
        assert_eq!(node, Node::Mapping(vec![]));
    }

    #[test]
    fn json_file_parses_as_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desc.json");
        write(&path, br#"{"name":"demo","replicas":3}"#);

        let (node, _) = load_input(path.to_str().unwrap(), &IngestOptions::default()).unwrap();
        let Node::Mapping(entries) = node else {
            panic!("expected mapping root");
        };
        assert_eq!(entries[0].0, "name");
        assert_eq!(entries[1].1, Node::Scalar(Scalar::Number(3.0)));
    }

    #[test]
    fn plain_file_becomes_a_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        write(&path, b"\x00\x01\x02");

        let (node, stats) = load_input(path.to_str().unwrap(), &IngestOptions::default()).unwrap();
        assert_eq!(node, Node::Blob(Bytes::from_static(b"\x00\x01\x02")));
        assert_eq!(stats.bytes, 3);
    }

    #[test]
    fn file_limit_enforced() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a"), b"1");
        write(&dir.path().join("b"), b"2");

        let opts = IngestOptions {
            max_files: 1,
            ..IngestOptions::default()
        };
        let err = load_input(dir.path().to_str().unwrap(), &opts).unwrap_err();
        assert!(err.to_string().contains("file count"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_denied() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("real"), b"x");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let err = load_input(dir.path().to_str().unwrap(), &IngestOptions::default()).unwrap_err();
        assert!(err.to_string().contains("symlink"));
    }
}
