//! The document handle the engine validates.
//!
//! Parsing is left to the caller: any navigable tree that can report its root
//! element, count top-level children and resolve its schema version can be
//! checked. Rule implementations are generic over the concrete document type
//! and may use whatever richer API it offers.

use crate::error::Result;

pub trait Document {
    /// Schema version declared by the document (for OpenDRIVE, `revMajor.revMinor`
    /// from the file header). `Ok(None)` when the document does not declare one;
    /// `Err` only when the document cannot be read at all.
    fn schema_version(&self) -> Result<Option<String>>;

    /// Name of the root element, without namespace prefix.
    fn root_tag(&self) -> Option<&str>;

    /// Number of direct children of the root element named `tag`.
    fn child_count(&self, tag: &str) -> usize;
}
