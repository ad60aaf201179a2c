pub mod pagination;
pub mod state;

pub use pagination::{PageInfo, PaginationState};
pub use state::{default_row_key, FetchTicket, RowKeyFn, TableOptions, TableState};
