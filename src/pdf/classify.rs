//! Indirection policy and content marking passes over a finished graph

use log::{debug, trace};
use super::{NodeId, ObjectGraph};

/// Number indirect nodes in construction order, starting at 1
///
/// Must run after every root has been visited: reference counts are only
/// final once all referrers are known. Returns the number of ids handed out.
pub fn assign_object_ids(graph: &mut ObjectGraph) -> u32 {
    let mut next = 0;
    for object in graph.iter_mut() {
        if object.is_indirect() {
            next += 1;
            object.set_id(next);
        }
    }
    debug!("Assigned {} object ids", next);
    next
}

/// Mark streams that must be written as text
///
/// Page content streams and PostScript calculator functions (function
/// type 4) are marked. Returns the number of streams marked.
pub fn mark_text_streams(graph: &mut ObjectGraph) -> usize {
    let mut targets: Vec<NodeId> = Vec::new();

    for (id, object) in graph.iter() {
        if object.as_dict().is_some() {
            if is_name(graph, graph.lookup(id, "Type"), b"Page") {
                if let Some(contents) = graph.lookup(id, "Contents") {
                    targets.extend(page_contents(graph, contents));
                }
            }
        } else if object.as_stream().is_some() {
            let function_type = graph
                .lookup(id, "FunctionType")
                .and_then(|node| graph.get(node).as_number());
            if function_type.is_some_and(|n| n.as_integer() == 4) {
                targets.push(id);
            }
        }
    }

    let mut marked = 0;
    for id in targets {
        if let Some(stream) = graph.get_mut(id).as_stream_mut() {
            if !stream.output_as_text() {
                trace!("Node {} marked as text", id.index());
                stream.set_output_as_text(true);
                marked += 1;
            }
        }
    }
    marked
}

fn is_name(graph: &ObjectGraph, node: Option<NodeId>, expected: &[u8]) -> bool {
    node.and_then(|node| graph.get(node).as_name())
        .is_some_and(|name| name == expected)
}

/// Streams making up a page's contents: one stream or an array of them
fn page_contents(graph: &ObjectGraph, contents: NodeId) -> Vec<NodeId> {
    let object = graph.get(contents);
    if object.as_stream().is_some() {
        return vec![contents];
    }
    object
        .as_array()
        .map(|items| {
            items
                .iter()
                .copied()
                .filter(|&item| graph.get(item).as_stream().is_some())
                .collect()
        })
        .unwrap_or_default()
}
