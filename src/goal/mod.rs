mod core;
mod endpoints;

pub use core::{Goal, create_goal_table};
pub use endpoints::{
    contribute_to_goal_endpoint, create_goal_endpoint, delete_goal_endpoint, edit_goal_endpoint,
    get_goal_endpoint, list_goals_endpoint,
};
