//! Span-to-location mapping shared by the lowerer and the symbol model.
//!
//! `proc-macro2` spans carry 1-based lines and 0-based character columns;
//! the core's `Location` additionally wants a byte offset so edits can be
//! applied textually. The lowerer and the symbol collector must agree on
//! these offsets byte for byte, so both go through this module.

use namelint_core::Location;
use std::path::Path;

/// Computes the byte offset of a (1-based line, 0-based char column)
/// position within `source`. Out-of-bounds positions clamp to the end.
pub(crate) fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let mut offset = 0;
    for (i, line_content) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let within: usize = line_content
                .chars()
                .take(column)
                .map(char::len_utf8)
                .sum();
            return offset + within;
        }
        offset += line_content.len();
    }
    source.len()
}

/// Maps an identifier to a `Location` with file, 1-based line/column, byte
/// offset, and byte length.
pub(crate) fn ident_location(file: &Path, source: &str, ident: &syn::Ident) -> Location {
    let start = ident.span().start();
    let text = ident.to_string();
    let offset = byte_offset(source, start.line, start.column);
    Location::new(file.to_path_buf(), start.line, start.column + 1).with_span(offset, text.len())
}
