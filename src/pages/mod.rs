pub mod form;
pub mod list;

pub use form::{FormMode, FormPage, FormPhase};
pub use list::{ListPage, ListPhase};
