//! Graph builder: turns a source document tree into a deduplicated node list

use std::collections::HashMap;
use log::{debug, trace, warn};

use crate::error::PDFRebuildResult;
use crate::source::{NodeIdentity, SourceDocument, SourceValue};
use super::{NodeId, ObjectGraph, PDFObject, Stream};

/// A source node that could not be read and was replaced by `null`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identity of the offending source node
    pub identity: NodeIdentity,
    /// Node that stands in for it
    pub node: NodeId,
    pub message: String,
}

/// Children of a composite node still waiting to be visited
struct Frame<N> {
    parent: NodeId,
    children: std::vec::IntoIter<(Option<Vec<u8>>, N)>,
}

/// Builds one [`ObjectGraph`] from any number of source roots
///
/// All roots share a single deduplication table, so an object reachable
/// from several roots is built once. A node is registered before its
/// children are visited, which lets cycles resolve to the node under
/// construction instead of recursing forever.
pub struct GraphBuilder<'s, S: SourceDocument> {
    source: &'s S,
    graph: ObjectGraph,
    visited: HashMap<NodeIdentity, NodeId>,
    diagnostics: Vec<Diagnostic>,
    strict: bool,
}

impl<'s, S: SourceDocument> GraphBuilder<'s, S> {
    /// Create new builder over a source document
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            graph: ObjectGraph::new(),
            visited: HashMap::new(),
            diagnostics: Vec::new(),
            strict: false,
        }
    }

    /// Fail on unreadable nodes instead of substituting `null`
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Visit a root and everything reachable from it
    pub fn visit(&mut self, root: S::Node) -> PDFRebuildResult<NodeId> {
        trace!("Visiting root {}", self.source.identity(root));
        let (root_id, frame) = self.enter(root)?;

        // Depth-first, children in source order. An explicit stack keeps long
        // chains (outline siblings, page lists) off the call stack.
        let mut stack: Vec<Frame<S::Node>> = frame.into_iter().collect();
        while let Some(frame) = stack.last_mut() {
            let Some((key, child)) = frame.children.next() else {
                stack.pop();
                continue;
            };
            let parent = frame.parent;

            let (child_id, child_frame) = self.enter(child)?;
            if !self.graph.get_mut(parent).attach(key, child_id) {
                warn!("Node {} cannot hold children", parent.index());
            }
            if let Some(child_frame) = child_frame {
                stack.push(child_frame);
            }
        }

        debug!("Root visited, {} nodes so far", self.graph.len());
        Ok(root_id)
    }

    /// Resolve one source node to a graph node
    ///
    /// Returns the pending children when a new composite node was created.
    fn enter(&mut self, node: S::Node) -> PDFRebuildResult<(NodeId, Option<Frame<S::Node>>)> {
        let identity = self.source.identity(node);
        if let Some(&existing) = self.visited.get(&identity) {
            self.graph.get_mut(existing).increment_ref();
            return Ok((existing, None));
        }

        let value = match self.source.read(node) {
            Ok(value) => value,
            Err(err) if !self.strict => {
                let id = self.graph.push(PDFObject::null());
                self.visited.insert(identity, id);
                warn!("Replacing source object {} with null: {}", identity, err);
                self.diagnostics.push(Diagnostic {
                    identity,
                    node: id,
                    message: err.to_string(),
                });
                return Ok((id, None));
            }
            Err(err) => return Err(err),
        };

        let (object, children) = match value {
            SourceValue::Null => (PDFObject::null(), None),
            SourceValue::Boolean(b) => (PDFObject::boolean(b), None),
            SourceValue::Integer(i) => (PDFObject::integer(i), None),
            SourceValue::Real(r) => (PDFObject::real(r), None),
            SourceValue::Name(name) => (PDFObject::name(name), None),
            SourceValue::String(bytes) => (PDFObject::string(bytes), None),
            SourceValue::Array(items) => (
                PDFObject::array(),
                Some(items.into_iter().map(|item| (None, item)).collect::<Vec<_>>()),
            ),
            SourceValue::Dictionary(entries) => (
                PDFObject::dictionary(),
                Some(entries.into_iter().map(|(k, v)| (Some(k), v)).collect()),
            ),
            SourceValue::Stream { dict, data, format } => (
                PDFObject::stream(Stream::new(data, format)),
                Some(dict.into_iter().map(|(k, v)| (Some(k), v)).collect()),
            ),
        };

        let id = self.graph.push(object);
        self.visited.insert(identity, id);

        Ok((
            id,
            children.map(|children| Frame {
                parent: id,
                children: children.into_iter(),
            }),
        ))
    }

    /// Nodes built so far
    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    /// Finish building, releasing the deduplication table
    pub fn finish(self) -> (ObjectGraph, Vec<Diagnostic>) {
        (self.graph, self.diagnostics)
    }
}
