//! PDF object graph: construction, classification and serialization

mod object;
mod dict;
mod graph;
mod builder;
mod classify;
mod stream;
mod filter;
mod xref;
mod writer;

pub use object::{NodeId, Number, ObjectType, PDFObject, Value};
pub use dict::Dictionary;
pub use graph::ObjectGraph;
pub use builder::{Diagnostic, GraphBuilder};
pub use classify::{assign_object_ids, mark_text_streams};
pub use stream::{DataFormat, EncodedStream, Stream, StreamEncoding};
pub use filter::{encode_ascii_hex, Filter, DEFAULT_HEX_LINE_WIDTH};
pub use xref::XRefTable;
pub use writer::PDFWriter;

use std::fmt;
use std::str::FromStr;
use crate::error::PDFRebuildError;

/// PDF header version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PDFVersion {
    pub major: u8,
    pub minor: u8,
}

impl PDFVersion {
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for PDFVersion {
    fn default() -> Self {
        Self::new(1, 7)
    }
}

impl fmt::Display for PDFVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PDFVersion {
    type Err = PDFRebuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| PDFRebuildError::InvalidVersion(s.to_string()))?;
        Ok(Self::new(major.parse()?, minor.parse()?))
    }
}
