use crate::types::{CallGraph, CodeNode};
use std::collections::HashMap;

/// Source text provider keyed by node (file path + line range)
///
/// Implemented by whoever owns the analyzed files; the graph itself never
/// touches the filesystem.
pub trait SourceLookup {
    /// Source text of `node`, or `None` when it is unavailable
    fn source_of(&self, node: &CodeNode) -> Option<String>;
}

/// Lookup that never has source text; snippets fall back to skeletons
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl SourceLookup for NoSource {
    fn source_of(&self, _node: &CodeNode) -> Option<String> {
        None
    }
}

/// In-memory lookup: whole files keyed by path, sliced by line range
#[derive(Debug, Clone, Default)]
pub struct MapSourceLookup {
    files: HashMap<String, String>,
}

impl MapSourceLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceLookup for MapSourceLookup {
    fn source_of(&self, node: &CodeNode) -> Option<String> {
        let contents = self.files.get(&node.file_path)?;
        slice_lines(contents, node.line_start, node.line_end)
    }
}

/// Lines `start..=end` (1-based) of `contents`, `None` for an empty or
/// out-of-range window
#[must_use]
pub fn slice_lines(contents: &str, start: usize, end: usize) -> Option<String> {
    if start == 0 || end < start {
        return None;
    }
    let lines: Vec<&str> = contents
        .lines()
        .skip(start - 1)
        .take(end - start + 1)
        .collect();
    if lines.iter().all(|line| line.trim().is_empty()) {
        return None;
    }
    Some(lines.join("\n"))
}

/// Render a deterministic code skeleton from node metadata
///
/// Used when no source text is available: decorators, signature, docstring,
/// one line per call target and a `return` placeholder when the node has a
/// return type.
#[must_use]
pub fn render_skeleton(graph: &CallGraph, node: &CodeNode) -> String {
    let mut out = String::new();

    for decorator in &node.decorators {
        let decorator = decorator.trim_start_matches('@');
        out.push_str(&format!("@{decorator}\n"));
    }

    let params = node
        .parameters
        .iter()
        .map(|p| {
            let mut rendered = p.name.clone();
            if let Some(ty) = &p.type_hint {
                rendered.push_str(&format!(": {ty}"));
            }
            if let Some(default) = &p.default_value {
                rendered.push_str(&format!(" = {default}"));
            }
            rendered
        })
        .collect::<Vec<_>>()
        .join(", ");

    let keyword = if node.kind == crate::NodeKind::Class {
        "class"
    } else if node.is_async {
        "async def"
    } else {
        "def"
    };
    out.push_str(&format!("{keyword} {}({params})", node.name));
    if let Some(ret) = &node.return_type {
        out.push_str(&format!(" -> {ret}"));
    }
    out.push_str(":\n");

    if let Some(summary) = node.doc_summary() {
        out.push_str(&format!("    \"\"\"{summary}.\"\"\"\n"));
    }

    let call_prefix = if node.is_async { "await " } else { "" };
    for target in &node.calls {
        out.push_str(&format!("    {call_prefix}{}(...)\n", graph.node_name(target)));
    }

    if node.is_generator {
        out.push_str("    yield ...\n");
    } else if node.return_type.is_some() {
        out.push_str("    return ...\n");
    } else if node.calls.is_empty() {
        out.push_str("    ...\n");
    }

    out.trim_end().to_string()
}

/// Source text when available, skeleton otherwise
#[must_use]
pub fn node_text(graph: &CallGraph, source: &dyn SourceLookup, node: &CodeNode) -> String {
    source
        .source_of(node)
        .unwrap_or_else(|| render_skeleton(graph, node))
}
