mod core;
mod endpoints;

pub use core::{User, create_user_table};
pub use endpoints::{
    change_password_endpoint, create_user_endpoint, delete_user_endpoint, edit_user_endpoint,
    get_user_endpoint, list_users_endpoint,
};
