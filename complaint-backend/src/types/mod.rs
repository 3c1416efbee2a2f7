pub mod pagination;
pub mod query;
pub mod response;

pub use pagination::{PageLink, PageLinks, Paginated};
pub use query::{PaginationQuery, SortKey, SortOrder};
pub use response::ApiResponse;
