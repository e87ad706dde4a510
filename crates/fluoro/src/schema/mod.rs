//! Schema types describing table columns before and after prediction.

mod column;
mod table;
mod types;

pub use column::ColumnSchema;
pub use table::TableSchema;
pub use types::ColumnType;
