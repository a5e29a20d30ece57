//! The dashboard page layout and the markup for each session state.
//!
//! Everything that changes when the session changes lives in the
//! `#dashboard-content` container, which htmx swaps as a whole. The filter
//! form and the detail panel live outside of it so that typing in the form is
//! not interrupted by a swap.

use maud::{Markup, html};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    dashboard::charts::echarts_script_link,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    pagination::PaginationConfig,
    transaction::FilterQuery,
};

/// The page sizes offered in the page size selector.
const PAGE_SIZE_OPTIONS: [u64; 4] = [10, 25, 50, 100];

/// How long a loading or refreshing dashboard waits before asking for the
/// content again.
const POLL_TRIGGER: &str = "load delay:1s";

/// Renders the full dashboard page around `content`.
pub(super) fn dashboard_page(
    content: Markup,
    filters: &FilterQuery,
    page_size: u64,
    pagination_config: &PaginationConfig,
) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            header class="w-full flex flex-wrap justify-between items-center gap-4 mb-6"
            {
                h1 class="text-3xl font-bold" { "MoMo Dashboard" }

                button
                    id="indicator"
                    type="button"
                    hx-post=(endpoints::REFRESH_API)
                    hx-target="#dashboard-content"
                    hx-target-error="#alert-container"
                    hx-swap="outerHTML"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="htmx-indicator" { (loading_spinner()) }
                    "Refresh"
                }
            }

            (filter_form(filters, page_size, pagination_config))

            div id="detail-panel" class="w-full" {}

            (content)
        }
    );

    base("Dashboard", &[echarts_script_link()], &content)
}

/// Wraps the content for the current session state.
///
/// With `poll` set, the container asks for itself again shortly after it is
/// shown, until the pending fetch resolves.
pub(super) fn content_container(poll: bool, content: Markup) -> Markup {
    html!(
        @if poll {
            div
                id="dashboard-content"
                class="w-full"
                hx-get=(endpoints::DASHBOARD_VIEW)
                hx-trigger=(POLL_TRIGGER)
                hx-swap="outerHTML"
            {
                (content)
            }
        } @else {
            div id="dashboard-content" class="w-full"
            {
                (content)
            }
        }
    )
}

/// Shown until the first fetch resolves.
pub(super) fn loading_view() -> Markup {
    html!(
        div id="loading" class="flex flex-col items-center py-16" role="status"
        {
            (loading_spinner())
            p class="mt-2" { "Loading transactions..." }
        }
    )
}

/// Shown when the fetch succeeded without any usable transactions.
pub(super) fn empty_view(skipped_records: usize) -> Markup {
    html!(
        div id="empty" class="flex flex-col items-center py-16"
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "The transactions API did not return any transactions.
                Charts and the table will show up here once it does."
            }

            @if skipped_records > 0 {
                (skipped_notice(skipped_records))
            }
        }
    )
}

/// Shown when the fetch failed. Only a refresh leaves this state.
pub(super) fn fetch_error_view(message: &str) -> Markup {
    html!(
        div
            id="fetch-error"
            role="alert"
            class="w-full p-4 mb-4 border rounded-lg text-red-800 border-red-300 bg-red-50
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        {
            p class="font-medium" { (message) }
            p class="text-sm mt-1" { "Check that the transactions API is running, then press Refresh." }
        }
    )
}

/// Shown above the data while a refresh is pending.
pub(super) fn refreshing_notice() -> Markup {
    html!(
        p id="refreshing" class="text-sm text-gray-600 dark:text-gray-400 mb-2" role="status"
        {
            (loading_spinner())
            "Refreshing..."
        }
    )
}

/// Tells the user that some records were left out.
pub(super) fn skipped_notice(skipped_records: usize) -> Markup {
    let records = if skipped_records == 1 {
        "record"
    } else {
        "records"
    };

    html!(
        p id="skipped-records" class="text-sm text-yellow-700 dark:text-yellow-400 mb-2"
        {
            (skipped_records) " malformed " (records) " could not be shown. Check the server logs for details."
        }
    )
}

/// When the data was fetched, e.g., "Last updated 14:05:09 UTC".
pub(super) fn fetched_at_notice(fetched_at: OffsetDateTime) -> Markup {
    let time = fetched_at
        .format(format_description!("[hour]:[minute]:[second]"))
        .inspect_err(|error| tracing::warn!("could not format fetch time: {error}"))
        .ok();

    html!(
        @if let Some(time) = time {
            p id="fetched-at" class="text-xs text-gray-500 dark:text-gray-400 mb-2"
            {
                "Last updated " (time) " UTC"
            }
        }
    )
}

/// The filter controls.
///
/// Text inputs wait for typing to settle before they ask for new content, the
/// other controls ask on every change. A value the server cannot parse is
/// ignored, so the form never shows an error.
fn filter_form(filters: &FilterQuery, page_size: u64, pagination_config: &PaginationConfig) -> Markup {
    let page_sizes: Vec<u64> = PAGE_SIZE_OPTIONS
        .into_iter()
        .chain(std::iter::once(page_size))
        .map(|size| pagination_config.clamp_page_size(size))
        .fold(Vec::new(), |mut sizes, size| {
            if !sizes.contains(&size) {
                sizes.push(size);
            }
            sizes
        });

    html!(
        form
            id="filter-form"
            hx-get=(endpoints::DASHBOARD_VIEW)
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-trigger="change, submit"
            class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-6"
        {
            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="search"
                    type="search"
                    name="search"
                    placeholder="Category, type, amount or date"
                    value=[filters.search.as_deref()]
                    hx-get=(endpoints::DASHBOARD_VIEW)
                    hx-include="#filter-form"
                    hx-trigger="input changed delay:500ms"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                input
                    id="category"
                    type="text"
                    name="category"
                    list="category-options"
                    value=[filters.category.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                input
                    id="date"
                    type="date"
                    name="date"
                    value=[filters.date.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="per_page" class=(FORM_LABEL_STYLE) { "Rows per page" }
                select id="per_page" name="per_page" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for size in &page_sizes {
                        option value=(size) selected[*size == page_size] { (size) }
                    }
                }
            }

            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="date_from"
                    type="date"
                    name="date_from"
                    value=[filters.date_from.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="date_to"
                    type="date"
                    name="date_to"
                    value=[filters.date_to.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="min_amount" class=(FORM_LABEL_STYLE) { "Minimum amount" }
                input
                    id="min_amount"
                    type="number"
                    step="any"
                    name="min_amount"
                    value=[filters.min_amount.as_deref()]
                    hx-get=(endpoints::DASHBOARD_VIEW)
                    hx-include="#filter-form"
                    hx-trigger="input changed delay:500ms"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="max_amount" class=(FORM_LABEL_STYLE) { "Maximum amount" }
                input
                    id="max_amount"
                    type="number"
                    step="any"
                    name="max_amount"
                    value=[filters.max_amount.as_deref()]
                    hx-get=(endpoints::DASHBOARD_VIEW)
                    hx-include="#filter-form"
                    hx-trigger="input changed delay:500ms"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            p class="sm:col-span-2 lg:col-span-4 text-sm"
            {
                // Any filter parameter, even an empty one, replaces all filters.
                a href={(endpoints::DASHBOARD_VIEW) "?search="} class=(LINK_STYLE) { "Clear filters" }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use crate::{
        pagination::PaginationConfig,
        test_utils::{assert_valid_html, count_matches, select_text},
        transaction::FilterQuery,
    };

    use super::{content_container, dashboard_page, loading_view, skipped_notice};

    #[test]
    fn page_has_filter_form_and_containers() {
        let filters = FilterQuery {
            search: Some("airtime".to_owned()),
            ..Default::default()
        };

        let markup = dashboard_page(
            content_container(false, loading_view()),
            &filters,
            25,
            &PaginationConfig::default(),
        );
        let html = Html::parse_document(&markup.into_string());

        assert_valid_html(&html);
        assert_eq!(count_matches(&html, "form#filter-form"), 1);
        assert_eq!(count_matches(&html, "#detail-panel"), 1);
        assert_eq!(count_matches(&html, "#dashboard-content"), 1);
        assert_eq!(
            count_matches(&html, "input[name=search][value=airtime]"),
            1
        );
        assert_eq!(
            count_matches(&html, "input[name=search][hx-trigger='input changed delay:500ms']"),
            1
        );
        assert_eq!(select_text(&html, "select[name=per_page] option[selected]"), vec!["25"]);
    }

    #[test]
    fn unusual_page_size_is_offered() {
        let markup = dashboard_page(
            content_container(false, loading_view()),
            &FilterQuery::default(),
            7,
            &PaginationConfig::default(),
        );
        let html = Html::parse_document(&markup.into_string());

        assert_eq!(count_matches(&html, "select[name=per_page] option"), 5);
        assert_eq!(select_text(&html, "select[name=per_page] option[selected]"), vec!["7"]);
    }

    #[test]
    fn polling_container_asks_for_itself() {
        let html =
            Html::parse_fragment(&content_container(true, loading_view()).into_string());

        assert_eq!(
            count_matches(&html, "#dashboard-content[hx-trigger='load delay:1s'][hx-get='/dashboard']"),
            1
        );
    }

    #[test]
    fn settled_container_does_not_poll() {
        let html =
            Html::parse_fragment(&content_container(false, loading_view()).into_string());

        assert_eq!(count_matches(&html, "#dashboard-content[hx-trigger]"), 0);
    }

    #[test]
    fn skipped_notice_uses_singular_for_one_record() {
        let html = Html::parse_fragment(&skipped_notice(1).into_string());

        let text = select_text(&html, "#skipped-records").concat();
        assert!(text.starts_with("1 malformed record could"), "got {text:?}");
    }
}
