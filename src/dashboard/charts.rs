//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations of the filtered transactions:
//! - **Totals by category**: bar chart of the summed amount per category
//! - **Share by category**: pie chart of the same totals
//! - **Monthly totals**: line chart of the summed amount per calendar month
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, ItemStyle, JsFunction,
        Orient, Tooltip, Trigger,
    },
    series::{Line, Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{html::HeadElement, transaction::Bucket};

/// The ECharts build loaded by the dashboard page.
const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The script link for the ECharts library.
pub(super) fn echarts_script_link() -> HeadElement {
    HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned())
}

/// Renders the HTML containers for dashboard charts followed by the script
/// that initializes them.
///
/// The script is inline so that charts swapped in by htmx are initialized
/// too.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-3 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="chart min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }

        script { (charts_script(charts)) }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
fn charts_script(charts: &[DashboardChart]) -> PreEscaped<String> {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom || typeof echarts === 'undefined') {{
                        return;
                    }}
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                escape_script_text(&chart.options)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(script_content)
}

/// Escape the sequences that would end or confuse an inline script element.
///
/// Chart labels come from the transactions API. Inside JSON strings `<\/` and
/// `<\!--` read the same as the unescaped text.
fn escape_script_text(options: &str) -> String {
    options
        .replace("</", "<\\/")
        .replace("<!--", "<\\!--")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Build the three dashboard charts from the grouped totals of the filtered
/// transactions.
pub(super) fn build_dashboard_charts(
    category_totals: &[Bucket],
    monthly_totals: &[Bucket],
    currency: &str,
) -> [DashboardChart; 3] {
    [
        DashboardChart {
            id: "category-bar-chart",
            options: category_bar_chart(category_totals, currency).to_string(),
        },
        DashboardChart {
            id: "category-pie-chart",
            options: category_pie_chart(category_totals, currency).to_string(),
        },
        DashboardChart {
            id: "monthly-line-chart",
            options: monthly_line_chart(monthly_totals, currency).to_string(),
        },
    ]
}

fn labels_and_values(buckets: &[Bucket]) -> (Vec<String>, Vec<f64>) {
    buckets
        .iter()
        .map(|bucket| (bucket.label.clone(), bucket.total))
        .unzip()
}

pub(super) fn category_bar_chart(category_totals: &[Bucket], currency: &str) -> Chart {
    let (labels, values) = labels_and_values(category_totals);

    Chart::new()
        .title(Title::new().text("Totals by category"))
        .tooltip(currency_tooltip(currency))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(bar::Bar::new().name("Amount").data(values))
}

pub(super) fn category_pie_chart(category_totals: &[Bucket], currency: &str) -> Chart {
    let data: Vec<(f64, String)> = category_totals
        .iter()
        .map(|bucket| (bucket.total, bucket.label.clone()))
        .collect();

    Chart::new()
        .title(Title::new().text("Share by category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(currency)),
        )
        .legend(Legend::new().orient(Orient::Vertical).left("left").top("15%"))
        .series(
            Pie::new()
                .name("Amount")
                .radius(vec!["40%", "70%"])
                .item_style(ItemStyle::new().border_radius(4))
                .emphasis(Emphasis::new())
                .data(data),
        )
}

pub(super) fn monthly_line_chart(monthly_totals: &[Bucket], currency: &str) -> Chart {
    let (labels, values) = labels_and_values(monthly_totals);

    Chart::new()
        .title(Title::new().text("Monthly totals"))
        .tooltip(currency_tooltip(currency))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(Line::new().name("Amount").data(values))
}

fn currency_formatter(currency: &str) -> JsFunction {
    // The currency code is shown as a suffix since MoMo currencies such as
    // RWF have no widely supported symbol.
    let currency = serde_json::to_string(currency).unwrap_or_else(|_| "\"\"".to_owned());

    JsFunction::new_with_args(
        "number",
        &format!(
            "const numberFormatter = new Intl.NumberFormat('en-US', {{
              maximumFractionDigits: 2
            }});
            return (number) ? numberFormatter.format(number) + ' ' + {currency} : \"-\";"
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency: &str) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
