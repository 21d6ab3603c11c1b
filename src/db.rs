//! Schema creation for the application database.

use rusqlite::Connection;

use crate::{budget::create_budget_entry_table, user::create_user_table};

/// Create the application's tables if they do not exist.
///
/// # Errors
///
/// Returns an error if a table or index cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_user_table(connection)?;
    create_budget_entry_table(connection)?;

    Ok(())
}
