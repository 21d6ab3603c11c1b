//! The budget distribution pie chart.
//!
//! The chart is generated as JSON configuration for the ECharts library and
//! rendered into an HTML container with an inline initialization script.
//! htmx executes scripts inside swapped content, so the same markup works
//! for the initial page load and for partial swaps.

use charming::{
    Chart,
    component::Legend,
    element::{Color, Label, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use super::summary::BudgetSummary;

/// The HTML element ID of the chart container.
const CHART_ID: &str = "budget-distribution-chart";

/// The slice palette: green income, red expenses, blue bills, purple savings.
const PALETTE: [&str; 4] = ["#22c55e", "#ef4444", "#3b82f6", "#a855f7"];

/// The distribution chart with its container ID and ECharts configuration.
pub(super) struct BudgetChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the pie chart showing how the budget splits across income,
/// expenses, bills and savings. Debt is shown in the summary cards but has
/// no slice.
pub(super) fn distribution_chart(summary: &BudgetSummary) -> BudgetChart {
    let chart = Chart::new()
        .color(PALETTE.iter().map(|color| Color::from(*color)).collect())
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new())
        .series(
            Pie::new()
                .name("Budget")
                .radius("60%")
                .label(Label::new().show(true).formatter("{b}: {d}%"))
                .data(vec![
                    (summary.income, "Income"),
                    (summary.expenses, "Expenses"),
                    (summary.bills, "Bills"),
                    (summary.savings, "Savings"),
                ]),
        );

    BudgetChart {
        id: CHART_ID,
        options: chart.to_string(),
    }
}

/// Renders the HTML container for the chart.
pub(super) fn chart_view(chart: &BudgetChart) -> Markup {
    html!(
        section
            id="chart"
            class="w-full mx-auto mb-4"
        {
            div
                id=(chart.id)
                class="min-h-[380px] rounded dark:bg-gray-100"
            {}
        }
    )
}

/// The JavaScript that initializes the chart in an existing container.
///
/// The script runs again after every htmx swap, so it tears down the previous
/// chart instance and resize listener before creating new ones.
fn init_snippet(chart: &BudgetChart) -> String {
    format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");

            if (window.budgetChartResize) {{
                window.removeEventListener('resize', window.budgetChartResize);
            }}

            const previous = echarts.getInstanceByDom(chartDom);
            if (previous) {{
                previous.dispose();
            }}

            const chart = echarts.init(chartDom);
            chart.setOption({});

            window.budgetChartResize = () => chart.resize();
            window.addEventListener('resize', window.budgetChartResize);
        }})();"#,
        chart.id, chart.options
    )
}

/// The inline script that initializes the chart.
pub(super) fn chart_inline_script(chart: &BudgetChart) -> Markup {
    html!(
        script { (PreEscaped(init_snippet(chart))) }
    )
}
