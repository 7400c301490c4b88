use callquest_graph::{slice_lines, CodeNode, SourceLookup};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Reads node text from files under a project root, one read per file
pub struct FsSourceLookup {
    root: PathBuf,
    files: RefCell<HashMap<String, Option<String>>>,
}

impl FsSourceLookup {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            files: RefCell::new(HashMap::new()),
        }
    }

    fn read(&self, relative: &str) -> Option<String> {
        let Some(path) = self.resolve(relative) else {
            log::warn!(
                "Ignoring {relative}: path escapes the source root {}",
                self.root.display()
            );
            return None;
        };
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) => {
                log::warn!("Cannot read {}: {err}", path.display());
                None
            }
        }
    }

    /// `relative` joined onto the root, or `None` when it would leave the root
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let confined = Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return None;
        }
        let path = self.root.join(relative);
        // Symlinks inside the root may still point outside of it
        match (path.canonicalize(), self.root.canonicalize()) {
            (Ok(real), Ok(root)) if !real.starts_with(&root) => None,
            _ => Some(path),
        }
    }
}

impl SourceLookup for FsSourceLookup {
    fn source_of(&self, node: &CodeNode) -> Option<String> {
        if node.file_path.is_empty() {
            return None;
        }
        let mut files = self.files.borrow_mut();
        let contents = files
            .entry(node.file_path.clone())
            .or_insert_with(|| self.read(&node.file_path));
        slice_lines(contents.as_deref()?, node.line_start, node.line_end)
    }
}
