//! The aggregation core: per-category totals and the derived budget summary.

use super::{Category, entry::BudgetEntry};

/// Sum the amounts of `entries`.
///
/// The entries are assumed to belong to a single category; no validation of
/// signs or currency is done, so negative amounts flow through as-is. An
/// empty slice sums to `0.0`.
pub fn category_total(entries: &[BudgetEntry]) -> f64 {
    entries.iter().map(|entry| entry.amount).sum()
}

/// The total amount per category.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTotals {
    /// Total income.
    pub income: f64,
    /// Total expenses.
    pub expenses: f64,
    /// Total bills.
    pub bills: f64,
    /// Total savings.
    pub savings: f64,
    /// Total debt repayments.
    pub debt: f64,
}

impl CategoryTotals {
    /// The demo budget shown to anonymous visitors.
    pub fn sample() -> Self {
        Self {
            income: 5000.0,
            expenses: 2000.0,
            bills: 1500.0,
            savings: 500.0,
            debt: 0.0,
        }
    }

    /// The total for `category`.
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Income => self.income,
            Category::Expenses => self.expenses,
            Category::Bills => self.bills,
            Category::Savings => self.savings,
            Category::Debt => self.debt,
        }
    }

    /// Set the total for `category`.
    pub fn set(&mut self, category: Category, total: f64) {
        match category {
            Category::Income => self.income = total,
            Category::Expenses => self.expenses = total,
            Category::Bills => self.bills = total,
            Category::Savings => self.savings = total,
            Category::Debt => self.debt = total,
        }
    }
}

/// The derived summary figures shown at the top of the budget page.
///
/// Wholly recomputable from [CategoryTotals]; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BudgetSummary {
    /// Total income.
    pub income: f64,
    /// Total expenses.
    pub expenses: f64,
    /// Total bills.
    pub bills: f64,
    /// Total savings.
    pub savings: f64,
    /// Total debt repayments.
    pub debt: f64,
    /// Income minus outgoings.
    pub net_cash_flow: f64,
    /// How much is left to spend this period.
    pub amount_left_to_spend: f64,
}

impl BudgetSummary {
    /// Derive the summary figures from per-category totals.
    ///
    /// Debt is carried through for display but deliberately left out of the
    /// net cash flow formula; it is treated as a balance being tracked, not
    /// an outgoing in the period.
    pub fn from_totals(totals: &CategoryTotals) -> Self {
        let net_cash_flow = totals.income - (totals.expenses + totals.bills + totals.savings);

        Self {
            income: totals.income,
            expenses: totals.expenses,
            bills: totals.bills,
            savings: totals.savings,
            debt: totals.debt,
            net_cash_flow,
            amount_left_to_spend: net_cash_flow,
        }
    }

    /// The per-category totals this summary was derived from.
    pub fn totals(&self) -> CategoryTotals {
        CategoryTotals {
            income: self.income,
            expenses: self.expenses,
            bills: self.bills,
            savings: self.savings,
            debt: self.debt,
        }
    }
}

#[cfg(test)]
mod aggregation_tests {
    use time::macros::date;

    use crate::{
        budget::{Category, entry::BudgetEntry},
        user::UserID,
    };

    use super::{BudgetSummary, CategoryTotals, category_total};

    fn entry(amount: f64) -> BudgetEntry {
        BudgetEntry {
            id: 1,
            user_id: UserID::new(1),
            category: Category::Expenses,
            date: date!(2024 - 03 - 01),
            description: "Groceries".to_owned(),
            amount,
            created_at: None,
        }
    }

    #[test]
    fn category_total_of_empty_slice_is_zero() {
        assert_eq!(category_total(&[]), 0.0);
    }

    #[test]
    fn category_total_sums_amounts() {
        let entries = [entry(200.0), entry(49.5), entry(0.5)];

        assert_eq!(category_total(&entries), 250.0);
    }

    #[test]
    fn category_total_propagates_negative_amounts() {
        let entries = [entry(100.0), entry(-40.0)];

        assert_eq!(category_total(&entries), 60.0);
    }

    #[test]
    fn from_totals_computes_net_cash_flow() {
        let totals = CategoryTotals {
            income: 5000.0,
            expenses: 2000.0,
            bills: 1500.0,
            savings: 500.0,
            debt: 300.0,
        };

        let summary = BudgetSummary::from_totals(&totals);

        assert_eq!(summary.net_cash_flow, 1000.0);
        assert_eq!(summary.amount_left_to_spend, summary.net_cash_flow);
    }

    #[test]
    fn from_totals_excludes_debt_from_net_cash_flow() {
        let without_debt = BudgetSummary::from_totals(&CategoryTotals {
            income: 1000.0,
            ..CategoryTotals::default()
        });
        let with_debt = BudgetSummary::from_totals(&CategoryTotals {
            income: 1000.0,
            debt: 999.0,
            ..CategoryTotals::default()
        });

        assert_eq!(with_debt.net_cash_flow, without_debt.net_cash_flow);
        assert_eq!(with_debt.debt, 999.0);
    }

    #[test]
    fn from_totals_is_pure() {
        let totals = CategoryTotals::sample();

        assert_eq!(
            BudgetSummary::from_totals(&totals),
            BudgetSummary::from_totals(&totals)
        );
    }

    #[test]
    fn single_income_entry_scenario() {
        let mut totals = CategoryTotals::default();
        totals.set(Category::Income, 5000.0);

        let summary = BudgetSummary::from_totals(&totals);

        assert_eq!(summary.income, 5000.0);
        assert_eq!(summary.expenses, 0.0);
        assert_eq!(summary.bills, 0.0);
        assert_eq!(summary.savings, 0.0);
        assert_eq!(summary.net_cash_flow, 5000.0);
        assert_eq!(summary.amount_left_to_spend, 5000.0);
    }

    #[test]
    fn totals_round_trip() {
        let totals = CategoryTotals::sample();

        let summary = BudgetSummary::from_totals(&totals);

        assert_eq!(summary.totals(), totals);
    }
}
