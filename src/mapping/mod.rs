mod field_map;
mod record;

pub use field_map::{FieldMap, apply};
pub use record::TargetRecord;
