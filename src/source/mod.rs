//! Source document collaborator
//!
//! The rebuilder never parses PDF syntax itself. It walks a tree exposed by a
//! [`SourceDocument`], which hands out node handles, a stable identity per
//! node, and typed values.

mod decode;
mod lopdf_source;

pub use lopdf_source::LopdfSource;

use std::fmt;
use crate::error::PDFRebuildResult;
use crate::pdf::{DataFormat, PDFVersion};

/// Stable identity of a source node, used as the deduplication key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdentity(pub usize);

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Typed view of one source node
#[derive(Debug, Clone)]
pub enum SourceValue<N> {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f32),
    /// Name bytes without the leading slash
    Name(Vec<u8>),
    String(Vec<u8>),
    Array(Vec<N>),
    /// Entries in the reader's key iteration order
    Dictionary(Vec<(Vec<u8>, N)>),
    Stream {
        dict: Vec<(Vec<u8>, N)>,
        data: Vec<u8>,
        format: DataFormat,
    },
}

impl<N> SourceValue<N> {
    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            SourceValue::Null => "null",
            SourceValue::Boolean(_) => "boolean",
            SourceValue::Integer(_) => "integer",
            SourceValue::Real(_) => "real",
            SourceValue::Name(_) => "name",
            SourceValue::String(_) => "string",
            SourceValue::Array(_) => "array",
            SourceValue::Dictionary(_) => "dictionary",
            SourceValue::Stream { .. } => "stream",
        }
    }
}

/// A parsed document the rebuilder can walk
pub trait SourceDocument {
    /// Handle to one node of the document tree
    type Node: Copy;

    /// Version declared by the document header
    fn version(&self) -> PDFVersion;

    /// Document catalog
    fn catalog(&self) -> PDFRebuildResult<Self::Node>;

    /// Document information record, if there is one
    fn info(&self) -> Option<Self::Node>;

    /// Identity of a node; two handles to the same object yield equal identities
    fn identity(&self, node: Self::Node) -> NodeIdentity;

    /// Read the typed value of a node
    fn read(&self, node: Self::Node) -> PDFRebuildResult<SourceValue<Self::Node>>;
}
