use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of callable code element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Function,
    Method,
    Class,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
        }
    }

    /// Functions and methods can start an execution chain, classes cannot
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }
}

/// Function/method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            default_value: None,
        }
    }

    #[must_use]
    pub fn typed(name: impl Into<String>, type_hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: Some(type_hint.into()),
            default_value: None,
        }
    }
}

/// A function, method or class extracted by the upstream analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeNode {
    /// Unique id, e.g. `app.py::Flask.wsgi_app`
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line_start: usize,
    #[serde(default)]
    pub line_end: usize,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub decorators: Vec<String>,

    /// Ids of nodes this node invokes
    #[serde(default)]
    pub calls: BTreeSet<String>,
    /// Ids of nodes invoking this node (inverse of `calls`)
    #[serde(default)]
    pub called_by: BTreeSet<String>,
    /// Module/import dependencies
    #[serde(default)]
    pub depends_on: BTreeSet<String>,

    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,

    /// Cyclomatic complexity
    #[serde(default = "default_complexity")]
    pub complexity: u32,
    #[serde(default)]
    pub loc: u32,
}

const fn default_complexity() -> u32 {
    1
}

impl CodeNode {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            file_path: String::new(),
            line_start: 0,
            line_end: 0,
            parameters: Vec::new(),
            return_type: None,
            decorators: Vec::new(),
            calls: BTreeSet::new(),
            called_by: BTreeSet::new(),
            depends_on: BTreeSet::new(),
            docstring: None,
            is_async: false,
            is_generator: false,
            complexity: default_complexity(),
            loc: 0,
        }
    }

    /// Whether the node has a non-blank docstring
    #[must_use]
    pub fn is_documented(&self) -> bool {
        self.docstring
            .as_deref()
            .is_some_and(|doc| !doc.trim().is_empty())
    }

    /// First sentence of the docstring, if any
    #[must_use]
    pub fn doc_summary(&self) -> Option<&str> {
        let doc = self.docstring.as_deref()?.trim();
        let summary = doc.split(['.', '\n']).next().unwrap_or(doc).trim();
        (!summary.is_empty()).then_some(summary)
    }

    #[must_use]
    pub fn line_range(&self) -> String {
        if self.file_path.is_empty() {
            format!("lines {}-{}", self.line_start, self.line_end)
        } else {
            format!(
                "{} (lines {}-{})",
                self.file_path, self.line_start, self.line_end
            )
        }
    }
}

/// A call relationship with its observed frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub from_node: String,
    pub to_node: String,
    #[serde(default = "default_call_count")]
    pub call_count: u32,
}

const fn default_call_count() -> u32 {
    1
}

impl CallEdge {
    #[must_use]
    pub fn new(from_node: impl Into<String>, to_node: impl Into<String>) -> Self {
        Self {
            from_node: from_node.into(),
            to_node: to_node.into(),
            call_count: default_call_count(),
        }
    }
}

/// Immutable call graph snapshot
///
/// Built only through [`crate::CallGraphBuilder`], which guarantees that every
/// edge references known nodes and that `calls`/`called_by` mirror each other.
#[derive(Debug, Clone)]
pub struct CallGraph {
    /// Petgraph representation (nodes = code elements, edges = calls)
    pub(crate) graph: DiGraph<CodeNode, CallEdge>,

    /// Id -> node index
    pub(crate) index: BTreeMap<String, NodeIndex>,

    /// Edges in input order
    pub(crate) edges: Vec<CallEdge>,

    pub(crate) entry_points: BTreeSet<String>,
}

impl CallGraph {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&CodeNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Display name of a node, falling back to the last `::` segment of the id
    #[must_use]
    pub fn node_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.node(id)
            .map_or_else(|| id.rsplit("::").next().unwrap_or(id), |n| n.name.as_str())
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &CodeNode> {
        self.index.values().map(|&idx| &self.graph[idx])
    }

    #[must_use]
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    #[must_use]
    pub const fn entry_points(&self) -> &BTreeSet<String> {
        &self.entry_points
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Serialized form of a call graph, as produced by the analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphDocument {
    pub nodes: Vec<CodeNode>,
    #[serde(default)]
    pub edges: Vec<CallEdge>,
    #[serde(default)]
    pub entry_points: Vec<String>,
}
