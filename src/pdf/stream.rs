//! PDF stream nodes and the encoding policy applied when writing them

use log::trace;
use super::{encode_ascii_hex, Dictionary, Filter, ObjectGraph};

/// Storage encoding of the bytes handed over by the source reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Fully decoded bytes
    #[default]
    Raw,
    /// Still DCT (JPEG) encoded
    Jpeg,
    /// Still JPEG 2000 encoded
    Jpeg2000,
}

/// PDF stream node payload
#[derive(Debug, Clone)]
pub struct Stream {
    /// Stream parameters
    dictionary: Dictionary,
    /// Bytes as read from the source
    data: Vec<u8>,
    /// Encoding of `data`
    format: DataFormat,
    /// Write the bytes untouched regardless of `format`
    output_as_text: bool,
}

/// How a stream payload is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEncoding {
    /// Bytes written as-is, no filter declared
    Raw,
    /// Bytes written as wrapped upper-case hex
    AsciiHex,
}

/// Payload ready for output together with the filters it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStream {
    pub encoding: StreamEncoding,
    pub filters: Vec<Filter>,
    pub payload: Vec<u8>,
}

impl Stream {
    /// Create new stream with empty parameters
    pub fn new(data: Vec<u8>, format: DataFormat) -> Self {
        Self {
            dictionary: Dictionary::new(),
            data,
            format,
            output_as_text: false,
        }
    }

    /// Stream parameter dictionary
    pub fn dict(&self) -> &Dictionary {
        &self.dictionary
    }

    pub(crate) fn dict_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    /// Raw source bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Declared source encoding
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Check if the stream was marked as textual content
    pub fn output_as_text(&self) -> bool {
        self.output_as_text
    }

    pub(crate) fn set_output_as_text(&mut self, value: bool) {
        self.output_as_text = value;
    }

    /// Decide how the payload is written
    ///
    /// Metadata streams and streams marked textual go out raw, everything
    /// else is hex armored.
    pub fn encoding(&self, graph: &ObjectGraph) -> StreamEncoding {
        let is_metadata = self
            .dictionary
            .get("Type")
            .and_then(|node| graph.get(node).as_name())
            .is_some_and(|name| name == b"Metadata");

        if is_metadata || self.output_as_text {
            StreamEncoding::Raw
        } else {
            StreamEncoding::AsciiHex
        }
    }

    /// Produce the payload and filter chain to write
    pub fn encode(&self, graph: &ObjectGraph, line_width: usize) -> EncodedStream {
        let encoding = self.encoding(graph);
        trace!("Encoding {} byte stream as {:?}", self.data.len(), encoding);

        match encoding {
            StreamEncoding::Raw => EncodedStream {
                encoding,
                filters: Vec::new(),
                payload: self.data.clone(),
            },
            StreamEncoding::AsciiHex => EncodedStream {
                encoding,
                filters: Filter::armored_chain(self.format),
                payload: encode_ascii_hex(&self.data, line_width),
            },
        }
    }
}
