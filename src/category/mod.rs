mod core;
mod endpoints;

pub use core::{Category, CategoryKind, create_category_table};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
    get_category_endpoint, list_categories_endpoint,
};
