mod catalog_service;
mod errors;

pub(crate) use catalog_service::resolve_titles;
pub use catalog_service::{
    UNKNOWN_TITLE, add_book, delete_book, get_book, list_ebooks, search_catalog, seed_defaults,
};
pub use errors::{CatalogApplicationError, Result};
