//! PDF cross-reference table implementation

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use crate::error::{PDFRebuildError, PDFRebuildResult};

/// Entry 0, the reserved all-zero head of the table
const RESERVED_HEAD: &str = "0000000000 00000 n \n";

/// PDF cross-reference table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XRefTable {
    entries: BTreeMap<u32, u64>,
}

impl XRefTable {
    /// Create new xref table
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record the byte offset of an object
    pub fn insert(&mut self, object_number: u32, offset: u64) {
        self.entries.insert(object_number, offset);
    }

    /// Byte offset of an object
    pub fn offset(&self, object_number: u32) -> Option<u64> {
        self.entries.get(&object_number).copied()
    }

    /// Number of in-use entries, not counting the free-list head
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending object number order
    pub fn entries(&self) -> Vec<(u32, u64)> {
        self.entries.iter().map(|(&k, &v)| (k, v)).collect()
    }

    /// Write the `xref` section, starting with the keyword
    ///
    /// Object numbers must run densely from 1; the table has a single
    /// subsection starting at object 0. Every entry, the reserved head
    /// included, is a 10 digit offset, a 5 digit generation and `n`.
    pub fn write_to(&self, output: &mut Vec<u8>) -> io::Result<()> {
        write!(output, "xref\n0 {}\n", self.entries.len() + 1)?;
        output.extend_from_slice(RESERVED_HEAD.as_bytes());
        for offset in self.entries.values() {
            write!(output, "{:010} {:05} n \n", offset, 0)?;
        }
        Ok(())
    }

    /// Parse an xref table from input, starting at the `xref` keyword
    pub fn parse<R: BufRead>(input: &mut R) -> PDFRebuildResult<Self> {
        let mut table = Self::new();
        let mut line = String::new();

        input.read_line(&mut line)?;
        if line.trim() != "xref" {
            return Err(PDFRebuildError::XRefError("Missing xref keyword".to_string()));
        }

        // Parse subsection header
        line.clear();
        input.read_line(&mut line)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(PDFRebuildError::XRefError("Invalid xref subsection".to_string()));
        }

        let start = parts[0].parse::<u32>()
            .map_err(|_| PDFRebuildError::XRefError("Invalid xref start number".to_string()))?;
        let count = parts[1].parse::<u32>()
            .map_err(|_| PDFRebuildError::XRefError("Invalid xref count".to_string()))?;

        // Parse entries
        for i in 0..count {
            line.clear();
            input.read_line(&mut line)?;

            let entry = line.trim_end_matches(['\r', '\n']);
            if entry.len() != 19 || !entry.is_ascii() {
                return Err(PDFRebuildError::XRefError("Invalid xref entry length".to_string()));
            }

            let offset = entry[0..10].parse::<u64>()
                .map_err(|_| PDFRebuildError::XRefError("Invalid xref offset".to_string()))?;
            let _generation = entry[11..16].parse::<u16>()
                .map_err(|_| PDFRebuildError::XRefError("Invalid xref generation".to_string()))?;

            match &entry[17..18] {
                // Object 0 is the reserved head, never a real object
                "n" if start + i == 0 => {}
                "n" => table.insert(start + i, offset),
                "f" => {}
                _ => return Err(PDFRebuildError::XRefError("Invalid xref entry type".to_string())),
            }
        }

        Ok(table)
    }
}
