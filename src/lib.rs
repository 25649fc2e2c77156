//! PDF Rebuild Library for Rust
//!
//! Re-serializes a parsed PDF document into a self-contained file: every
//! object reachable from the catalog and the information record is rebuilt
//! once, shared objects become indirect objects, and the body is written
//! with a fresh cross-reference table.
//!
//! ```no_run
//! use pdf_rebuild::PDFRebuilder;
//!
//! let output = PDFRebuilder::new().rebuild_file("input.pdf")?;
//! std::fs::write("output.pdf", &output.data)?;
//! # Ok::<(), pdf_rebuild::PDFRebuildError>(())
//! ```

use std::path::Path;
use log::{debug, warn};

mod error;
pub mod pdf;
pub mod source;

pub use error::{PDFRebuildError, PDFRebuildResult};
use pdf::{
    assign_object_ids, mark_text_streams, Diagnostic, GraphBuilder, ObjectType, PDFWriter,
    DEFAULT_HEX_LINE_WIDTH,
};
use source::{LopdfSource, SourceDocument};

/// Options controlling a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildOptions {
    /// Fail on unreadable objects instead of writing `null` in their place
    pub strict: bool,
    /// Hex characters per line of armored stream data
    pub hex_line_width: usize,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self {
            strict: false,
            hex_line_width: DEFAULT_HEX_LINE_WIDTH,
        }
    }
}

/// Result of rebuilding one document
#[derive(Debug, Clone)]
pub struct RebuildOutput {
    /// The complete output file
    pub data: Vec<u8>,
    /// Number of indirect objects written
    pub object_count: usize,
    /// Source objects replaced by `null`
    pub diagnostics: Vec<Diagnostic>,
}

/// Main PDF rebuild interface
#[derive(Debug, Clone, Default)]
pub struct PDFRebuilder {
    options: RebuildOptions,
}

impl PDFRebuilder {
    /// Create a new rebuilder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new rebuilder with the given options
    pub fn with_options(options: RebuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RebuildOptions {
        &self.options
    }

    /// Rebuild a document exposed by any source reader
    ///
    /// Every call starts from an empty graph; nothing is shared between
    /// documents.
    pub fn rebuild<S: SourceDocument>(&self, source: &S) -> PDFRebuildResult<RebuildOutput> {
        let version = source.version();
        debug!("Rebuilding PDF {} document", version);

        let mut builder = GraphBuilder::new(source).strict(self.options.strict);
        let root = builder.visit(source.catalog()?)?;
        let info = match source.info() {
            Some(info) => Some(builder.visit(info)?),
            None => None,
        };
        let (mut graph, diagnostics) = builder.finish();

        let root_type = graph.get(root).object_type();
        if root_type != ObjectType::Dictionary {
            return Err(PDFRebuildError::InvalidObjectType {
                expected: ObjectType::Dictionary.as_str(),
                found: root_type.as_str(),
            });
        }

        let object_count = assign_object_ids(&mut graph) as usize;
        mark_text_streams(&mut graph);

        let info = info.filter(|&info| {
            let indirect = graph.get(info).id().is_some();
            if !indirect {
                warn!("Information record is a {}, leaving it out of the trailer", graph.get(info).object_type());
            }
            indirect
        });

        let data = PDFWriter::new(&graph)
            .hex_line_width(self.options.hex_line_width)
            .write_document(version, root, info)?;

        debug!(
            "Rebuilt {} nodes into {} objects ({} diagnostics)",
            graph.len(),
            object_count,
            diagnostics.len()
        );
        Ok(RebuildOutput {
            data,
            object_count,
            diagnostics,
        })
    }

    /// Rebuild a PDF held in memory
    pub fn rebuild_bytes(&self, pdf_data: &[u8]) -> PDFRebuildResult<RebuildOutput> {
        let document = lopdf::Document::load_mem(pdf_data)?;
        self.rebuild(&LopdfSource::new(&document))
    }

    /// Rebuild a PDF file
    pub fn rebuild_file(&self, path: impl AsRef<Path>) -> PDFRebuildResult<RebuildOutput> {
        let document = lopdf::Document::load(path.as_ref())?;
        self.rebuild(&LopdfSource::new(&document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NodeIdentity, SourceValue};
    use test_log::test;

    /// Catalog that is not a dictionary
    struct ScalarCatalog;

    impl SourceDocument for ScalarCatalog {
        type Node = u8;

        fn version(&self) -> pdf::PDFVersion {
            pdf::PDFVersion::new(1, 3)
        }

        fn catalog(&self) -> PDFRebuildResult<u8> {
            Ok(0)
        }

        fn info(&self) -> Option<u8> {
            Some(1)
        }

        fn identity(&self, node: u8) -> NodeIdentity {
            NodeIdentity(node as usize)
        }

        fn read(&self, node: u8) -> PDFRebuildResult<SourceValue<u8>> {
            Ok(SourceValue::Integer(node as i64))
        }
    }

    #[test]
    fn test_default_options() {
        let options = RebuildOptions::default();
        assert!(!options.strict);
        assert_eq!(options.hex_line_width, 40);
        assert_eq!(PDFRebuilder::new().options(), &options);
    }

    #[test]
    fn test_catalog_must_be_dictionary() {
        let result = PDFRebuilder::new().rebuild(&ScalarCatalog);
        assert!(matches!(
            result,
            Err(PDFRebuildError::InvalidObjectType { expected: "dictionary", found: "number" })
        ));
    }

    #[test]
    fn test_garbage_input() {
        let result = PDFRebuilder::new().rebuild_bytes(b"Not a PDF file");
        assert!(matches!(result, Err(PDFRebuildError::LoadError(_))));
    }
}
