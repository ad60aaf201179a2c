pub mod catalog;
pub mod config;
pub mod validate;

pub use config::{Choice, ColumnSpec, FieldKind, FieldSpec, PermissionKeys, ResourceConfig};
pub use validate::validate_values;
