mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{Card, CardForm, CardId, create_card, create_card_table, get_card};
pub use create_endpoint::create_card_endpoint;
pub use delete_endpoint::delete_card_endpoint;
pub use edit_endpoint::edit_card_endpoint;
pub use list_endpoint::{get_card_endpoint, list_cards_endpoint};

#[cfg(test)]
pub(crate) use core::test_card_form;
