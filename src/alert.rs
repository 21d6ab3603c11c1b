//! Alert partials for surfacing endpoint errors to the user.
//!
//! Error responses from htmx endpoints swap one of these partials into the
//! fixed alert container rendered by `html::base`, via the response-targets
//! extension.

use maud::{Markup, html};

/// Render an error alert to be swapped into the page's alert container.
///
/// The alert dismisses itself when the close button is clicked.
pub fn alert_error(message: &str, details: &str) -> Markup {
    html! {
        div
            id="alert-container"
            hx-swap-oob="true"
            class="w-full max-w-md px-4"
            style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
        {
            div
                role="alert"
                class="flex items-start gap-3 p-4 rounded border border-red-300 \
                    bg-red-50 text-red-800 dark:bg-gray-800 dark:text-red-400 \
                    dark:border-red-800 shadow"
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty()
                    {
                        p class="mt-1 text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    class="text-red-800 dark:text-red-400 hover:opacity-75"
                    aria-label="Close"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                {
                    "✕"
                }
            }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::alert_error;

    #[test]
    fn renders_message_and_details() {
        let markup = alert_error("Something went wrong", "Check the logs.");

        let document = Html::parse_fragment(&markup.into_string());
        let alert_selector = Selector::parse("[role=alert]").unwrap();
        let alert = document
            .select(&alert_selector)
            .next()
            .expect("want an alert element");
        let text = alert.text().collect::<String>();

        assert!(text.contains("Something went wrong"));
        assert!(text.contains("Check the logs."));
    }

    #[test]
    fn omits_empty_details() {
        let markup = alert_error("Something went wrong", "");

        let document = Html::parse_fragment(&markup.into_string());
        let paragraph_selector = Selector::parse("p").unwrap();
        let paragraph_count = document.select(&paragraph_selector).count();

        assert_eq!(paragraph_count, 1, "want only the message paragraph");
    }
}
