pub mod column_names;
pub mod duplicates;
pub mod text;
pub mod values;

pub use column_names::{clean_columns, normalize_column_name, strip_structural_suffix};
pub use duplicates::rename_after_column;
pub use text::{normalize_str, normalize_text};
pub use values::ValueMap;
