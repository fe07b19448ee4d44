//! Records and value types produced by the recovery engine.

pub mod objects;
pub mod parts;
pub mod value;

pub use objects::{FooterRecord, ObjectRecord, ParsedObject, StreamRecord};
pub use parts::{FilePart, FilePartKind, MemoryMap, PartMask, PartProperties};
pub use value::{TypedValue, all_values_by_key, first_value_by_key};
