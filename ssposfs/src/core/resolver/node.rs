// SPDX-License-Identifier: MIT

pub use crate::core::resolver::attr::FileAttributes;
use core::fmt;

use alloc::{string::String, vec::Vec};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FsNodeCounts {
    pub dirs: usize,
    pub files: usize,
    pub bytes: u64,
}

impl fmt::Display for FsNodeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.dirs;
        let fi = self.files;
        let d_lbl = if d == 1 { "Dir" } else { "Dirs" };
        let f_lbl = if fi == 1 { "File" } else { "Files" };
        write!(f, "{d} {d_lbl} • {fi} {f_lbl} • {} bytes", self.bytes)
    }
}

/// Snapshot of a subtree read back from a volume.
///
/// The root of a snapshot taken at `/` is a `Dir` with an empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsNode {
    File {
        name: String,
        content: Vec<u8>,
        attr: FileAttributes,
    },
    Dir {
        name: String,
        children: Vec<FsNode>,
        attr: FileAttributes,
    },
}

impl FsNode {
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            FsNode::File { name, .. } | FsNode::Dir { name, .. } => name,
        }
    }

    #[inline]
    pub fn attr(&self) -> &FileAttributes {
        match self {
            FsNode::File { attr, .. } | FsNode::Dir { attr, .. } => attr,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self, FsNode::Dir { .. })
    }

    /// Child lookup by exact name (directories only).
    pub fn child(&self, name: &str) -> Option<&FsNode> {
        match self {
            FsNode::Dir { children, .. } => children.iter().find(|c| c.name() == name),
            FsNode::File { .. } => None,
        }
    }

    pub fn counts(&self) -> FsNodeCounts {
        fn walk(n: &FsNode, acc: &mut FsNodeCounts) {
            match n {
                FsNode::File { content, .. } => {
                    acc.files += 1;
                    acc.bytes = acc.bytes.saturating_add(content.len() as u64);
                }
                FsNode::Dir { children, .. } => {
                    acc.dirs += 1;
                    for c in children {
                        walk(c, acc);
                    }
                }
            }
        }
        let mut out = FsNodeCounts::default();
        walk(self, &mut out);
        out
    }
}

impl fmt::Display for FsNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(n: &FsNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = if n.name().is_empty() { "/" } else { n.name() };
            match n {
                FsNode::File { content, .. } => {
                    writeln!(f, "{:indent$}{name} ({} bytes)", "", content.len(), indent = depth * 4)
                }
                FsNode::Dir { children, .. } => {
                    let slash = if n.name().is_empty() { "" } else { "/" };
                    writeln!(f, "{:indent$}{name}{slash}", "", indent = depth * 4)?;
                    for c in children {
                        walk(c, depth + 1, f)?;
                    }
                    Ok(())
                }
            }
        }
        walk(self, 0, f)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    fn sample() -> FsNode {
        FsNode::Dir {
            name: String::new(),
            attr: FileAttributes::new_dir(),
            children: vec![
                FsNode::File {
                    name: "a".into(),
                    content: vec![1, 2, 3],
                    attr: FileAttributes::new_file().with_size(3),
                },
                FsNode::Dir {
                    name: "d".into(),
                    attr: FileAttributes::new_dir(),
                    children: vec![FsNode::File {
                        name: "f".into(),
                        content: vec![],
                        attr: FileAttributes::new_file(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_counts() {
        let counts = sample().counts();
        assert_eq!(counts.dirs, 2);
        assert_eq!(counts.files, 2);
        assert_eq!(counts.bytes, 3);
    }

    #[test]
    fn test_child_and_display() {
        let root = sample();
        assert!(root.child("d").is_some_and(FsNode::is_dir));
        assert!(root.child("missing").is_none());

        let text = root.to_string();
        assert!(text.starts_with("/\n"));
        assert!(text.contains("    a (3 bytes)"));
        assert!(text.contains("        f (0 bytes)"));
    }
}
