//! The budget domain: categories, entries, the in-memory budget book, and
//! the budget page with its htmx endpoints.

mod book;
mod budget_page;
mod category;
mod chart;
mod create_endpoint;
mod delete_endpoint;
mod entry;
mod grid;
mod summary;
mod summary_cards;

pub use book::{BudgetBook, spawn_session_sync};
pub use budget_page::get_budget_page;
pub use category::Category;
pub use create_endpoint::create_entry;
pub use delete_endpoint::delete_entry;
pub use entry::create_budget_entry_table;
