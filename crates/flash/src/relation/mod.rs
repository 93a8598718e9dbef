//! Relations: the typed tables the filter reads and rewrites.

mod attribute;
mod reader;
mod table;
mod writer;

pub use attribute::{Attribute, AttributeKind, MISSING_MARKER, NumericPolicy, Value};
pub use reader::{ReaderConfig, RelationReader, SourceMetadata, is_missing_value};
pub use table::Relation;
pub use writer::RelationWriter;
