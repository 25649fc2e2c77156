//! Arena owning every node of one rebuild run

use super::{NodeId, PDFObject};

/// Ordered list of all nodes built for a document
///
/// Construction order is body order: indirect objects are numbered and
/// written in the order they were pushed. Nodes refer to each other through
/// [`NodeId`] handles into this list, so shared and cyclic structure needs no
/// shared ownership.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    objects: Vec<PDFObject>,
}

impl ObjectGraph {
    /// Create new empty graph
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Append a node and return its handle
    pub fn push(&mut self, object: PDFObject) -> NodeId {
        self.objects.push(object);
        NodeId(self.objects.len() - 1)
    }

    /// Get node by handle
    ///
    /// Handles are only ever produced by `push` on the same graph.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this graph and lies past its end.
    pub fn get(&self, id: NodeId) -> &PDFObject {
        &self.objects[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut PDFObject {
        &mut self.objects[id.0]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Nodes in construction order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PDFObject)> + '_ {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (NodeId(index), object))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PDFObject> + '_ {
        self.objects.iter_mut()
    }

    /// Look up `key` in a dictionary or stream parameter node
    pub fn lookup(&self, id: NodeId, key: impl AsRef<[u8]>) -> Option<NodeId> {
        let object = self.get(id);
        object
            .as_dict()
            .or_else(|| object.as_stream().map(|s| s.dict()))
            .and_then(|dict| dict.get(key))
    }

    /// Number of nodes written as indirect objects
    pub fn indirect_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_indirect()).count()
    }
}
