mod core;
mod endpoints;

pub use core::{Reminder, count_pending_reminders, create_reminder_table};
pub use endpoints::{
    create_reminder_endpoint, delete_reminder_endpoint, edit_reminder_endpoint,
    get_reminder_endpoint, list_pending_reminders_endpoint, list_reminders_endpoint,
};
