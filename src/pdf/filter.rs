//! Stream filters declared on rebuilt streams, and hex armoring

use std::fmt;
use super::DataFormat;

/// Hex characters per armored line unless configured otherwise
pub const DEFAULT_HEX_LINE_WIDTH: usize = 40;

/// PDF stream filters the rebuilder can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    ASCIIHexDecode,
    DCTDecode,
    JPXDecode,
}

impl Filter {
    /// Filter name as written after the slash
    pub fn name(&self) -> &'static str {
        match self {
            Filter::ASCIIHexDecode => "ASCIIHexDecode",
            Filter::DCTDecode => "DCTDecode",
            Filter::JPXDecode => "JPXDecode",
        }
    }

    /// Filter chain for a hex armored payload with the given source encoding
    ///
    /// Hex decoding always comes first, followed by the image decoder the
    /// source bytes still need.
    pub fn armored_chain(format: DataFormat) -> Vec<Filter> {
        match format {
            DataFormat::Raw => vec![Filter::ASCIIHexDecode],
            DataFormat::Jpeg => vec![Filter::ASCIIHexDecode, Filter::DCTDecode],
            DataFormat::Jpeg2000 => vec![Filter::ASCIIHexDecode, Filter::JPXDecode],
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode bytes as upper-case hex, breaking the line every `line_width` characters
///
/// A final line break always follows the payload.
pub fn encode_ascii_hex(data: &[u8], line_width: usize) -> Vec<u8> {
    let bytes_per_line = (line_width / 2).max(1);
    let mut output = Vec::with_capacity(data.len() * 2 + data.len() / bytes_per_line + 1);

    for chunk in data.chunks(bytes_per_line) {
        output.extend_from_slice(hex::encode_upper(chunk).as_bytes());
        if chunk.len() == bytes_per_line {
            output.push(b'\n');
        }
    }

    output.push(b'\n');
    output
}
