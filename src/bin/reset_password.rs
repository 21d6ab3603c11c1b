//! Resets the household password from the command line.
//!
//! Useful when the password has been forgotten, since the web app has no
//! recovery flow. The server does not need to be stopped; the update runs in
//! its own transaction.

use std::{io, path::Path, process::exit};

use bcrypt::DEFAULT_COST;
use clap::Parser;
use rusqlite::Connection;

use centsible::{PasswordHash, UserID, ValidatedPassword, get_user_by_id};

/// Change the household password for an existing database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() {
    let args = Args::parse();

    if let Err(error) = reset_password(Path::new(&args.db_path)) {
        eprintln!("\x1b[31;1m{error}\x1b[0m");
        exit(1);
    }
}

fn reset_password(db_path: &Path) -> Result<(), String> {
    if !db_path.is_file() {
        return Err(format!("No database file at {db_path:?}."));
    }

    let mut connection = Connection::open(db_path)
        .map_err(|error| format!("Could not open the database at {db_path:?}: {error}"))?;

    let user = get_user_by_id(UserID::new(1), &connection)
        .map_err(|_| "No user found. Register through the web app first.".to_owned())?;

    println!("Resetting the password for user {}.", user.id);

    let Some(password_hash) = prompt_for_new_password() else {
        println!("No changes made.");
        return Ok(());
    };

    let transaction = connection
        .transaction()
        .map_err(|error| format!("Could not start a transaction: {error}"))?;

    let rows_affected = transaction
        .execute(
            "UPDATE user SET password = ?1 WHERE user.id = ?2;",
            (&password_hash.to_string(), &user.id.as_i64()),
        )
        .map_err(|error| format!("Could not update the password: {error}"))?;

    if rows_affected != 1 {
        // Leaving the transaction uncommitted rolls it back on drop.
        return Err(format!(
            "Updating the password affected {rows_affected} row(s), expected 1. No changes made."
        ));
    }

    transaction
        .commit()
        .map_err(|error| format!("Could not commit the password update: {error}"))?;

    println!("Password updated.");

    Ok(())
}

/// Prompt until the user enters a valid password twice, or gives up (EOF).
fn prompt_for_new_password() -> Option<PasswordHash> {
    loop {
        println!();

        let password = read_password("New password: ")?;

        if let Err(error) = ValidatedPassword::new(&password) {
            eprintln!("{error}");
            continue;
        }

        if read_password("Confirm password: ")? != password {
            eprintln!("The passwords do not match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&password, DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                eprintln!("Could not hash the password: {error}. Try again.");
            }
        }
    }
}

fn read_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            eprintln!("Could not read from stdin: {error}");
            None
        }
    }
}
