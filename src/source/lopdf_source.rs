//! Source document backed by a `lopdf` parse tree

use log::{trace, warn};
use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::{PDFRebuildError, PDFRebuildResult};
use crate::pdf::{DataFormat, PDFVersion};
use super::decode::decode_stage;
use super::{NodeIdentity, SourceDocument, SourceValue};

/// Longest chain of references followed before giving up
const MAX_REFERENCE_HOPS: usize = 32;

/// [`SourceDocument`] over a loaded [`lopdf::Document`]
///
/// Nodes are borrowed objects. A reference is followed to the object it
/// names, so every use of an indirect object shares the identity of that
/// object, while direct objects are distinct per position in the file.
#[derive(Debug, Clone, Copy)]
pub struct LopdfSource<'a> {
    document: &'a Document,
}

impl<'a> LopdfSource<'a> {
    /// Wrap a loaded document
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Follow references; `None` for dangling or runaway chains
    fn resolve(&self, object: &'a Object) -> Option<&'a Object> {
        let mut current = object;
        for _ in 0..MAX_REFERENCE_HOPS {
            match current {
                Object::Reference(id) => match self.document.get_object(*id) {
                    Ok(target) => current = target,
                    Err(_) => {
                        trace!("Dangling reference {} {} R", id.0, id.1);
                        return None;
                    }
                },
                _ => return Some(current),
            }
        }
        warn!("Reference chain exceeds {} hops", MAX_REFERENCE_HOPS);
        None
    }

    fn entries(dict: &'a Dictionary) -> Vec<(Vec<u8>, &'a Object)> {
        dict.iter()
            .map(|(key, value)| (key.clone(), value))
            .collect()
    }

    /// Filter names declared on a stream, in application order
    fn filter_names(&self, dict: &'a Dictionary) -> PDFRebuildResult<Vec<String>> {
        let Some(filter) = dict.get(b"Filter").ok().and_then(|f| self.resolve(f)) else {
            return Ok(Vec::new());
        };

        let name = |object: &'a Object| match self.resolve(object) {
            Some(Object::Name(name)) => Ok(String::from_utf8_lossy(name).into_owned()),
            _ => Err(PDFRebuildError::malformed_object("filter entry is not a name")),
        };

        match filter {
            Object::Name(_) => Ok(vec![name(filter)?]),
            Object::Array(items) => items.iter().map(name).collect(),
            _ => Err(PDFRebuildError::malformed_object("Filter is neither a name nor an array")),
        }
    }

    /// Parameter dictionary of each filter stage
    ///
    /// An array gives one entry per filter; a lone dictionary applies to
    /// every stage.
    fn decode_params(&self, dict: &'a Dictionary, stages: usize) -> Vec<Option<&'a Dictionary>> {
        let params = dict.get(b"DecodeParms").ok().and_then(|p| self.resolve(p));
        match params {
            Some(Object::Array(items)) => (0..stages)
                .map(|i| {
                    items
                        .get(i)
                        .and_then(|item| self.resolve(item))
                        .and_then(|item| item.as_dict().ok())
                })
                .collect(),
            Some(Object::Dictionary(params)) => vec![Some(params); stages],
            _ => vec![None; stages],
        }
    }

    /// Stream bytes with image encodings left in place and everything else decoded
    fn stream_payload(&self, stream: &'a Stream) -> PDFRebuildResult<(Vec<u8>, DataFormat)> {
        let filters = self.filter_names(&stream.dict)?;
        let params = self.decode_params(&stream.dict, filters.len());

        let (format, stages) = match filters.last().map(String::as_str) {
            Some("DCTDecode" | "DCT") => (DataFormat::Jpeg, filters.len() - 1),
            Some("JPXDecode") => (DataFormat::Jpeg2000, filters.len() - 1),
            _ => (DataFormat::Raw, filters.len()),
        };

        let mut data = stream.content.clone();
        for (filter, params) in filters.iter().zip(params).take(stages) {
            data = decode_stage(filter, &data, params)?;
        }
        Ok((data, format))
    }
}

impl<'a> SourceDocument for LopdfSource<'a> {
    type Node = &'a Object;

    fn version(&self) -> PDFVersion {
        self.document.version.parse().unwrap_or_else(|err| {
            warn!("{}; assuming {}", err, PDFVersion::default());
            PDFVersion::default()
        })
    }

    fn catalog(&self) -> PDFRebuildResult<&'a Object> {
        let root = self
            .document
            .trailer
            .get(b"Root")
            .map_err(|_| PDFRebuildError::MissingRoot)?;
        if self.resolve(root).is_none() {
            return Err(PDFRebuildError::malformed("Root does not resolve to an object"));
        }
        Ok(root)
    }

    fn info(&self) -> Option<&'a Object> {
        self.document.trailer.get(b"Info").ok()
    }

    fn identity(&self, node: &'a Object) -> NodeIdentity {
        let target = self.resolve(node).unwrap_or(node);
        NodeIdentity(target as *const Object as usize)
    }

    fn read(&self, node: &'a Object) -> PDFRebuildResult<SourceValue<&'a Object>> {
        let Some(object) = self.resolve(node) else {
            return Ok(SourceValue::Null);
        };

        let value = match object {
            Object::Null => SourceValue::Null,
            Object::Boolean(b) => SourceValue::Boolean(*b),
            Object::Integer(i) => SourceValue::Integer(*i),
            Object::Real(r) => SourceValue::Real(*r),
            Object::Name(name) => SourceValue::Name(name.clone()),
            Object::String(bytes, _) => SourceValue::String(bytes.clone()),
            Object::Array(items) => SourceValue::Array(items.iter().collect()),
            Object::Dictionary(dict) => SourceValue::Dictionary(Self::entries(dict)),
            Object::Stream(stream) => {
                let (data, format) = self.stream_payload(stream)?;
                SourceValue::Stream {
                    dict: Self::entries(&stream.dict),
                    data,
                    format,
                }
            }
            Object::Reference(id) => {
                return Err(PDFRebuildError::malformed_object(format!(
                    "unresolved reference {} {} R",
                    id.0, id.1
                )))
            }
        };
        Ok(value)
    }
}
