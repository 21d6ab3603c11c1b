//! The summary card section at the top of the budget page.

use maud::{Markup, html};

use crate::html::{currency_rounded_with_tooltip, format_currency};

use super::summary::BudgetSummary;

/// How comfortable the amount left to spend is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BadgeTone {
    /// More than $2,000 left.
    Comfortable,
    /// More than $500 left.
    Tight,
    /// $500 or less left.
    Low,
}

fn determine_badge_tone(amount_left_to_spend: f64) -> BadgeTone {
    if amount_left_to_spend > 2000.0 {
        BadgeTone::Comfortable
    } else if amount_left_to_spend > 500.0 {
        BadgeTone::Tight
    } else {
        BadgeTone::Low
    }
}

fn badge_style(tone: BadgeTone) -> &'static str {
    match tone {
        BadgeTone::Comfortable => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full \
             text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300"
        }
        BadgeTone::Tight => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full \
             text-yellow-800 bg-yellow-100 dark:bg-yellow-900 dark:text-yellow-300"
        }
        BadgeTone::Low => {
            "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full \
             text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300"
        }
    }
}

/// Renders a single summary card.
fn summary_card(title: &str, amount: f64, badge: Option<Markup>) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md"
            aria-label=(format!("{title}: {}", format_currency(amount)))
        {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-1"
            {
                (title)
            }

            div class="text-2xl font-bold"
            {
                (currency_rounded_with_tooltip(amount))
            }

            @if let Some(badge) = badge
            {
                div class="mt-2" { (badge) }
            }
        }
    }
}

/// Renders the summary section: one card per figure, with a status badge on
/// the amount left to spend.
pub(super) fn summary_cards_view(summary: &BudgetSummary) -> Markup {
    let tone = determine_badge_tone(summary.amount_left_to_spend);
    let badge = html! {
        span class=(badge_style(tone))
        {
            @match tone {
                BadgeTone::Comfortable => "Looking good",
                BadgeTone::Tight => "Getting tight",
                BadgeTone::Low => "Running low",
            }
        }
    };

    html! {
        section class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-2 sm:grid-cols-3 xl:grid-cols-7 gap-4"
            {
                (summary_card("Income", summary.income, None))
                (summary_card("Expenses", summary.expenses, None))
                (summary_card("Bills", summary.bills, None))
                (summary_card("Savings", summary.savings, None))
                (summary_card("Debt", summary.debt, None))
                (summary_card("Net Cash Flow", summary.net_cash_flow, None))
                (summary_card("Left to Spend", summary.amount_left_to_spend, Some(badge)))
            }
        }
    }
}
