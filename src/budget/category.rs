//! The five fixed budget categories.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A budget category.
///
/// Categories partition budget entries; they are not stored entities and the
/// set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Money coming in (salary, interest).
    Income,
    /// Day-to-day spending.
    Expenses,
    /// Recurring obligations (rent, power, subscriptions).
    Bills,
    /// Money put aside.
    Savings,
    /// Repayments on money owed.
    Debt,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 5] = [
        Category::Income,
        Category::Expenses,
        Category::Bills,
        Category::Savings,
        Category::Debt,
    ];

    /// The lowercase name used in URLs, form values and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Expenses => "expenses",
            Category::Bills => "bills",
            Category::Savings => "savings",
            Category::Debt => "debt",
        }
    }

    /// The capitalised name shown to the user.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expenses => "Expenses",
            Category::Bills => "Bills",
            Category::Savings => "Savings",
            Category::Debt => "Debt",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Category::Income),
            "expenses" => Ok(Category::Expenses),
            "bills" => Ok(Category::Bills),
            "savings" => Ok(Category::Savings),
            "debt" => Ok(Category::Debt),
            other => Err(Error::InvalidCategory(other.to_owned())),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod category_tests {
    use crate::Error;

    use super::Category;

    #[test]
    fn parses_each_category_name() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();

            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn rejects_unknown_name() {
        let result = "holidays".parse::<Category>();

        assert_eq!(result, Err(Error::InvalidCategory("holidays".to_owned())));
    }

    #[test]
    fn rejects_capitalised_name() {
        assert!("Income".parse::<Category>().is_err());
    }

    #[test]
    fn round_trips_through_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();

        let got: Category = conn
            .query_row("SELECT ?1", (Category::Savings,), |row| row.get(0))
            .unwrap();

        assert_eq!(got, Category::Savings);
    }
}
