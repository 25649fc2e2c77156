//! Serializer writing a classified object graph as a complete PDF file

use std::io::Write;
use log::{debug, trace, warn};

use crate::error::{PDFRebuildError, PDFRebuildResult};
use super::{
    NodeId, Number, ObjectGraph, PDFVersion, Stream, StreamEncoding, Value, XRefTable,
    DEFAULT_HEX_LINE_WIDTH,
};

/// Comment line following the header, flagging the file as binary
const BINARY_MARKER: &[u8] = b"%\xE2\xE3\xCF\xD3\n";

/// Writes an [`ObjectGraph`] whose object ids have been assigned
pub struct PDFWriter<'g> {
    graph: &'g ObjectGraph,
    hex_line_width: usize,
}

impl<'g> PDFWriter<'g> {
    /// Create new writer over a classified graph
    pub fn new(graph: &'g ObjectGraph) -> Self {
        Self {
            graph,
            hex_line_width: DEFAULT_HEX_LINE_WIDTH,
        }
    }

    /// Hex characters per line of armored stream data
    pub fn hex_line_width(mut self, width: usize) -> Self {
        self.hex_line_width = width;
        self
    }

    /// Serialize the whole document
    pub fn write_document(
        &self,
        version: PDFVersion,
        root: NodeId,
        info: Option<NodeId>,
    ) -> PDFRebuildResult<Vec<u8>> {
        let root_id = self.graph.get(root).id().ok_or(PDFRebuildError::MissingRoot)?;
        let info_id = info.and_then(|info| self.graph.get(info).id());

        let mut output = Vec::new();

        // Header
        write!(output, "%PDF-{}\n", version)?;
        output.extend_from_slice(BINARY_MARKER);

        // Body
        let mut xref = XRefTable::new();
        for (id, object) in self.graph.iter() {
            let Some(number) = object.id() else {
                continue;
            };
            trace!("Writing object {}", number);
            xref.insert(number, output.len() as u64);
            write!(output, "{} 0 obj\n", number)?;
            self.write_value(&mut output, id)?;
            output.extend_from_slice(b"\nendobj\n");
        }

        // Cross-reference table
        let xref_offset = output.len();
        xref.write_to(&mut output)?;

        // Trailer
        write!(output, "trailer\n<< /Size {} /Root {} 0 R", xref.len() + 1, root_id)?;
        if let Some(info_id) = info_id {
            write!(output, " /Info {} 0 R", info_id)?;
        }
        output.extend_from_slice(b" >>\n");
        write!(output, "startxref\n{}\n%%EOF\n", xref_offset)?;

        debug!("Wrote {} objects, {} bytes", xref.len(), output.len());
        Ok(output)
    }

    /// Render a node in full
    pub fn write_value(&self, output: &mut Vec<u8>, id: NodeId) -> PDFRebuildResult<()> {
        match self.graph.get(id).value() {
            Value::Boolean(b) => write!(output, "{}", b)?,
            Value::Number(n) => write_number(output, *n)?,
            Value::String(s) => write_string(output, s),
            Value::Name(n) => write_name(output, n),
            Value::Array(items) => {
                output.extend_from_slice(b"[ ");
                for &item in items {
                    self.write_child(output, item)?;
                    output.push(b' ');
                }
                output.push(b']');
            }
            Value::Dictionary(dict) => {
                output.extend_from_slice(b"<<\n");
                for (key, value) in dict.iter() {
                    self.write_entry(output, key, value)?;
                }
                output.extend_from_slice(b">>");
            }
            Value::Stream(stream) => self.write_stream(output, stream)?,
            Value::Null => output.extend_from_slice(b"null"),
        }
        Ok(())
    }

    /// Render a child as a reference if it is indirect, in full otherwise
    fn write_child(&self, output: &mut Vec<u8>, id: NodeId) -> PDFRebuildResult<()> {
        match self.graph.get(id).id() {
            Some(number) => write!(output, "{} 0 R", number)?,
            None => self.write_value(output, id)?,
        }
        Ok(())
    }

    fn write_entry(&self, output: &mut Vec<u8>, key: &[u8], value: NodeId) -> PDFRebuildResult<()> {
        write_name(output, key);
        output.push(b' ');
        self.write_child(output, value)?;
        output.push(b'\n');
        Ok(())
    }

    fn write_stream(&self, output: &mut Vec<u8>, stream: &Stream) -> PDFRebuildResult<()> {
        let encoded = stream.encode(self.graph, self.hex_line_width);
        let armored = encoded.encoding == StreamEncoding::AsciiHex;
        // Parameters only survive for the image decoder left in the chain
        let image_params = armored && encoded.filters.len() > 1;

        output.extend_from_slice(b"<<\n");
        match encoded.filters.as_slice() {
            [] => {}
            [single] => write!(output, "/Filter /{}\n", single)?,
            chain => {
                let names: Vec<_> = chain.iter().map(|f| format!("/{}", f)).collect();
                write!(output, "/Filter [{}]\n", names.join(" "))?;
            }
        }

        let mut length_written = false;
        for (key, value) in stream.dict().iter() {
            match key {
                b"Filter" => {}
                b"Length" => {
                    write!(output, "/Length {}\n", encoded.payload.len())?;
                    length_written = true;
                }
                b"DecodeParms" if image_params => {
                    if let Some(params) = self.image_decode_params(value) {
                        output.extend_from_slice(b"/DecodeParms [null ");
                        self.write_child(output, params)?;
                        output.extend_from_slice(b"]\n");
                    }
                }
                b"DecodeParms" => {}
                _ => self.write_entry(output, key, value)?,
            }
        }
        if !length_written {
            write!(output, "/Length {}\n", encoded.payload.len())?;
        }

        output.extend_from_slice(b">>\nstream\n");
        output.extend_from_slice(&encoded.payload);
        output.extend_from_slice(b"\nendstream");
        Ok(())
    }

    /// Parameters of the image decoder, the last entry when given per filter
    fn image_decode_params(&self, params: NodeId) -> Option<NodeId> {
        let params = match self.graph.get(params).as_array() {
            Some(items) => *items.last()?,
            None => params,
        };
        (!self.graph.get(params).is_null()).then_some(params)
    }
}

fn write_number(output: &mut Vec<u8>, number: Number) -> std::io::Result<()> {
    match number {
        Number::Integer(i) => write!(output, "{}", i),
        Number::Real(r) if r.is_finite() => write!(output, "{}", r),
        Number::Real(r) => {
            warn!("Non-finite real {} written as 0", r);
            output.push(b'0');
            Ok(())
        }
    }
}

/// Literal string with the bytes that would not survive re-parsing escaped
fn write_string(output: &mut Vec<u8>, value: &[u8]) {
    output.push(b'(');
    for &byte in value {
        match byte {
            b'(' | b')' | b'\\' => output.extend_from_slice(&[b'\\', byte]),
            b'\r' => output.extend_from_slice(b"\\r"),
            _ => output.push(byte),
        }
    }
    output.push(b')');
}

/// Name token; spaces, `#`, delimiters and non-printable bytes become `#XX`
fn write_name(output: &mut Vec<u8>, name: &[u8]) {
    output.push(b'/');
    for &byte in name {
        match byte {
            b'!'..=b'~' if !b"#()<>[]{}/%".contains(&byte) => output.push(byte),
            _ => {
                output.push(b'#');
                output.extend_from_slice(hex::encode_upper([byte]).as_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{assign_object_ids, DataFormat, PDFObject};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use test_log::test;

    fn attach(graph: &mut ObjectGraph, parent: NodeId, key: &str, child: NodeId) {
        attach_bytes(graph, parent, key.as_bytes(), child);
    }

    fn attach_bytes(graph: &mut ObjectGraph, parent: NodeId, key: &[u8], child: NodeId) {
        assert!(graph.get_mut(parent).attach(Some(key.to_vec()), child));
    }

    fn render(graph: &ObjectGraph, id: NodeId) -> String {
        let mut output = Vec::new();
        PDFWriter::new(graph).write_value(&mut output, id).unwrap();
        String::from_utf8_lossy(&output).into_owned()
    }

    /// Payload between `stream\n` and `\nendstream`
    fn payload(text: &str) -> &str {
        let start = text.find("stream\n").unwrap() + "stream\n".len();
        let end = text.rfind("\nendstream").unwrap();
        &text[start..end]
    }

    #[test]
    fn test_scalars() {
        let mut graph = ObjectGraph::new();
        let t = graph.push(PDFObject::boolean(true));
        let i = graph.push(PDFObject::integer(-12));
        let r = graph.push(PDFObject::real(0.5));
        let n = graph.push(PDFObject::null());

        assert_eq!(render(&graph, t), "true");
        assert_eq!(render(&graph, i), "-12");
        assert_eq!(render(&graph, r), "0.5");
        assert_eq!(render(&graph, n), "null");
    }

    #[test]
    fn test_name_escaping() {
        let mut graph = ObjectGraph::new();
        let plain = graph.push(PDFObject::name("Type"));
        let spaced = graph.push(PDFObject::name("Two Words"));
        let hash = graph.push(PDFObject::name("A#B(C)"));

        assert_eq!(render(&graph, plain), "/Type");
        assert_eq!(render(&graph, spaced), "/Two#20Words");
        assert_eq!(render(&graph, hash), "/A#23B#28C#29");
    }

    #[test]
    fn test_name_bytes_kept() {
        let mut graph = ObjectGraph::new();
        let latin1 = graph.push(PDFObject::name(b"Caf\xE9".to_vec()));
        let dict = graph.push(PDFObject::dictionary());
        attach_bytes(&mut graph, dict, b"Fo\xFFnt", latin1);
        assign_object_ids(&mut graph);

        assert_eq!(render(&graph, latin1), "/Caf#E9");
        assert_eq!(render(&graph, dict), "<<\n/Fo#FFnt /Caf#E9\n>>");
    }

    #[test]
    fn test_string_escaping() {
        let mut graph = ObjectGraph::new();
        let s = graph.push(PDFObject::string(b"a(b)c\\d\r".to_vec()));
        let binary = graph.push(PDFObject::string(vec![0x00, 0xfe]));

        assert_eq!(render(&graph, s), "(a\\(b\\)c\\\\d\\r)");

        let mut output = Vec::new();
        PDFWriter::new(&graph).write_value(&mut output, binary).unwrap();
        assert_eq!(output, vec![b'(', 0x00, 0xfe, b')']);
    }

    #[test]
    fn test_composites_reference_indirect_children() {
        let mut graph = ObjectGraph::new();
        let dict = graph.push(PDFObject::dictionary());
        let array = graph.push(PDFObject::array());
        let shared = graph.push(PDFObject::integer(5));
        let inline = graph.push(PDFObject::integer(6));
        graph.get_mut(shared).increment_ref();
        attach(&mut graph, dict, "Kids", array);
        attach(&mut graph, dict, "Count", shared);
        assert!(graph.get_mut(array).attach(None, shared));
        assert!(graph.get_mut(array).attach(None, inline));
        assign_object_ids(&mut graph);

        assert_eq!(render(&graph, dict), "<<\n/Kids [ 2 0 R 6 ]\n/Count 2 0 R\n>>");
    }

    #[test]
    fn test_raw_stream_length() {
        let mut graph = ObjectGraph::new();
        let stream = graph.push(PDFObject::stream(Stream::new(b"<rdf/>".to_vec(), DataFormat::Raw)));
        let kind = graph.push(PDFObject::name("Metadata"));
        let length = graph.push(PDFObject::integer(999));
        let filter = graph.push(PDFObject::name("FlateDecode"));
        attach(&mut graph, stream, "Type", kind);
        attach(&mut graph, stream, "Length", length);
        attach(&mut graph, stream, "Filter", filter);
        assign_object_ids(&mut graph);

        let text = render(&graph, stream);
        assert_eq!(text, "<<\n/Type /Metadata\n/Length 6\n>>\nstream\n<rdf/>\nendstream");
    }

    #[test]
    fn test_armored_jpeg_stream() {
        let mut graph = ObjectGraph::new();
        let data: Vec<u8> = (0..25).collect();
        let stream = graph.push(PDFObject::stream(Stream::new(data, DataFormat::Jpeg)));
        let length = graph.push(PDFObject::integer(25));
        attach(&mut graph, stream, "Length", length);
        assign_object_ids(&mut graph);

        let text = render(&graph, stream);
        assert!(text.starts_with("<<\n/Filter [/ASCIIHexDecode /DCTDecode]\n/Length 52\n>>"));
        assert_eq!(
            payload(&text),
            "000102030405060708090A0B0C0D0E0F10111213\n1415161718\n"
        );
    }

    #[test]
    fn test_armored_stream_without_length_key() {
        let mut graph = ObjectGraph::new();
        let stream = graph.push(PDFObject::stream(Stream::new(vec![0xab], DataFormat::Raw)));
        let params = graph.push(PDFObject::dictionary());
        attach(&mut graph, stream, "DecodeParms", params);
        assign_object_ids(&mut graph);

        let text = render(&graph, stream);
        assert_eq!(text, "<<\n/Filter /ASCIIHexDecode\n/Length 3\n>>\nstream\nAB\n\nendstream");
    }

    #[test]
    fn test_jpx_decode_parms_aligned() {
        let mut graph = ObjectGraph::new();
        let stream = graph.push(PDFObject::stream(Stream::new(vec![1, 2], DataFormat::Jpeg2000)));
        let params = graph.push(PDFObject::dictionary());
        attach(&mut graph, stream, "DecodeParms", params);
        assign_object_ids(&mut graph);

        let text = render(&graph, stream);
        assert!(text.contains("/Filter [/ASCIIHexDecode /JPXDecode]\n"));
        assert!(text.contains("/DecodeParms [null 2 0 R]\n"));
    }

    #[test]
    fn test_decode_parms_array_keeps_image_entry() {
        let mut graph = ObjectGraph::new();
        let stream = graph.push(PDFObject::stream(Stream::new(vec![1, 2], DataFormat::Jpeg)));
        let params = graph.push(PDFObject::array());
        let flate_params = graph.push(PDFObject::null());
        let dct_params = graph.push(PDFObject::dictionary());
        attach(&mut graph, stream, "DecodeParms", params);
        assert!(graph.get_mut(params).attach(None, flate_params));
        assert!(graph.get_mut(params).attach(None, dct_params));
        assign_object_ids(&mut graph);

        let text = render(&graph, stream);
        assert!(text.contains("/Filter [/ASCIIHexDecode /DCTDecode]\n"));
        assert!(text.contains("/DecodeParms [null 2 0 R]\n"));
    }

    #[test]
    fn test_decode_parms_array_without_image_entry_dropped() {
        let mut graph = ObjectGraph::new();
        let stream = graph.push(PDFObject::stream(Stream::new(vec![1, 2], DataFormat::Jpeg)));
        let params = graph.push(PDFObject::array());
        let flate_params = graph.push(PDFObject::dictionary());
        let dct_params = graph.push(PDFObject::null());
        attach(&mut graph, stream, "DecodeParms", params);
        assert!(graph.get_mut(params).attach(None, flate_params));
        assert!(graph.get_mut(params).attach(None, dct_params));
        assign_object_ids(&mut graph);

        assert!(!render(&graph, stream).contains("DecodeParms"));
    }

    #[test]
    fn test_document_layout() {
        let mut graph = ObjectGraph::new();
        let catalog = graph.push(PDFObject::dictionary());
        let kind = graph.push(PDFObject::name("Catalog"));
        attach(&mut graph, catalog, "Type", kind);
        let info = graph.push(PDFObject::dictionary());
        assign_object_ids(&mut graph);

        let output = PDFWriter::new(&graph)
            .write_document(PDFVersion::new(1, 4), catalog, Some(info))
            .unwrap();

        let mut expected = b"%PDF-1.4\n".to_vec();
        expected.extend_from_slice(BINARY_MARKER);
        let first = expected.len();
        expected.extend_from_slice(b"1 0 obj\n<<\n/Type /Catalog\n>>\nendobj\n");
        let second = expected.len();
        expected.extend_from_slice(b"2 0 obj\n<<\n>>\nendobj\n");
        let xref = expected.len();
        expected.extend_from_slice(
            format!(
                "xref\n0 3\n0000000000 00000 n \n{:010} 00000 n \n{:010} 00000 n \n\
                 trailer\n<< /Size 3 /Root 1 0 R /Info 2 0 R >>\nstartxref\n{}\n%%EOF\n",
                first, second, xref
            )
            .as_bytes(),
        );
        assert_eq!(output, expected);

        let table = XRefTable::parse(&mut Cursor::new(&output[xref..])).unwrap();
        assert_eq!(table.offset(1), Some(first as u64));
        assert_eq!(table.offset(2), Some(second as u64));
        assert_eq!(table.offset(0), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_root_must_be_indirect() {
        let mut graph = ObjectGraph::new();
        let root = graph.push(PDFObject::integer(1));
        assign_object_ids(&mut graph);

        let result = PDFWriter::new(&graph).write_document(PDFVersion::default(), root, None);
        assert!(matches!(result, Err(PDFRebuildError::MissingRoot)));
    }
}
