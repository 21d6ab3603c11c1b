//! The tabbed category grid for entering and deleting budget entries.
//!
//! All five category panels are rendered server-side; switching tabs is done
//! client-side by `static/app.js` toggling the `hidden` class. Adding or
//! deleting an entry swaps the whole budget content via htmx, with the edited
//! category as the active tab.

use maud::{Markup, html};
use time::Date;

use crate::{
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
    },
};

use super::{Category, book::BudgetBook, entry::BudgetEntry};

/// Renders the grid: a tab button row plus one panel per category.
pub(super) fn grid_view(book: &BudgetBook, active_tab: Category, today: Date) -> Markup {
    html! {
        section id="category-grid" class="w-full mx-auto mb-4"
        {
            div
                role="tablist"
                class="flex flex-wrap border-b border-gray-200 dark:border-gray-700 mb-4"
            {
                @for category in Category::ALL {
                    // Styled via .tab-button in main.css; app.js flips
                    // aria-selected on click.
                    button
                        type="button"
                        role="tab"
                        class="tab-button"
                        data-tab=(category.as_str())
                        aria-selected=(category == active_tab)
                    {
                        (category.display_name())
                    }
                }
            }

            @for category in Category::ALL {
                div
                    role="tabpanel"
                    data-panel=(category.as_str())
                    class=[(category != active_tab).then_some("hidden")]
                {
                    (category_panel(book.entries(category), category, today))
                }
            }
        }
    }
}

/// Renders one category's entry table and its add-entry form.
fn category_panel(entries: &[BudgetEntry], category: Category, today: Date) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg mb-4"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Delete" } }
                    }
                }

                tbody
                {
                    @if entries.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) colspan="4"
                            {
                                "No " (category.as_str()) " entries yet."
                            }
                        }
                    }

                    @for entry in entries {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (entry.date) }
                            td class=(TABLE_CELL_STYLE) { (entry.description) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(entry.amount)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                button
                                    class=(BUTTON_DELETE_STYLE)
                                    hx-delete=(delete_entry_endpoint(category, entry.id))
                                    hx-target="#budget-content"
                                    hx-swap="outerHTML"
                                    hx-target-error="#alert-container"
                                {
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }

        (add_entry_form(category, today))
    }
}

/// The form for adding an entry to `category`.
fn add_entry_form(category: Category, today: Date) -> Markup {
    html! {
        form
            class="flex flex-wrap items-end gap-2"
            hx-post=(endpoints::ENTRIES_API)
            hx-target="#budget-content"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            input type="hidden" name="category" value=(category.as_str());

            input
                type="date"
                name="date"
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 11rem"
                value=(today)
                required;

            input
                type="text"
                name="description"
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 16rem"
                placeholder="Description"
                required;

            div class="input-wrapper"
            {
                input
                    type="number"
                    name="amount"
                    class=(FORM_TEXT_INPUT_STYLE)
                    style="max-width: 9rem"
                    step="0.01"
                    placeholder="0.00"
                    required;
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) style="max-width: 8rem"
            {
                "Add"
            }
        }
    }
}

fn delete_entry_endpoint(category: Category, entry_id: i64) -> String {
    endpoints::format_endpoint(
        &endpoints::format_endpoint(endpoints::DELETE_ENTRY, category),
        entry_id,
    )
}

#[cfg(test)]
mod grid_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::budget::{Category, book::BudgetBook};

    use super::{delete_entry_endpoint, grid_view};

    fn render_sample(active_tab: Category) -> Html {
        let book = BudgetBook::sample();
        let markup = grid_view(&book, active_tab, date!(2024 - 03 - 01));

        Html::parse_fragment(&markup.into_string())
    }

    #[test]
    fn renders_a_tab_per_category() {
        let document = render_sample(Category::Income);
        let tab_selector = Selector::parse("[role=tab]").unwrap();

        assert_eq!(document.select(&tab_selector).count(), Category::ALL.len());
    }

    #[test]
    fn only_active_panel_is_visible() {
        let document = render_sample(Category::Bills);
        let panel_selector = Selector::parse("[role=tabpanel]").unwrap();

        for panel in document.select(&panel_selector) {
            let is_hidden = panel.value().classes().any(|class| class == "hidden");
            let is_bills = panel.value().attr("data-panel") == Some("bills");

            assert_eq!(is_bills, !is_hidden);
        }
    }

    #[test]
    fn renders_sample_entries() {
        let document = render_sample(Category::Income);
        let text = document.root_element().text().collect::<String>();

        assert!(text.contains("Salary"));
        assert!(text.contains("Groceries"));
        assert!(text.contains("$5,000.00"));
    }

    #[test]
    fn each_panel_has_an_add_form() {
        let document = render_sample(Category::Income);
        let form_selector = Selector::parse("form[hx-post=\"/api/entries\"]").unwrap();

        assert_eq!(document.select(&form_selector).count(), Category::ALL.len());
    }

    #[test]
    fn delete_buttons_target_the_entry_endpoint() {
        assert_eq!(
            delete_entry_endpoint(Category::Savings, 7),
            "/api/entries/savings/7"
        );
    }
}
