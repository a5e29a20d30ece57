//! Table views for the transactions: the paginated table, its pagination bar
//! and the search preview.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, amount_with_tooltip,
        truncate_text,
    },
    pagination::{PageSlice, PaginationIndicator},
    transaction::Transaction,
};

/// The number of user-perceived characters of a description shown in a table cell.
const DESCRIPTION_MAX_LENGTH: usize = 40;

/// The number of matches listed in the search preview.
const SEARCH_PREVIEW_LIMIT: usize = 5;

const PAGINATION_LINK_STYLE: &str = "block px-3 py-2 leading-tight text-gray-500 \
    bg-white border border-gray-300 hover:bg-gray-100 hover:text-gray-700 \
    dark:bg-gray-800 dark:border-gray-700 dark:text-gray-400 \
    dark:hover:bg-gray-700 dark:hover:text-white";

const PAGINATION_CURRENT_STYLE: &str = "block px-3 py-2 leading-tight text-blue-600 \
    border border-gray-300 bg-blue-50 dark:border-gray-700 dark:bg-gray-700 \
    dark:text-white";

/// The URL of the detail panel for `transaction`.
fn detail_url(transaction: &Transaction) -> String {
    format_endpoint(endpoints::TRANSACTION_DETAIL_VIEW, transaction.id.as_str())
}

/// Renders one page of transactions. Clicking a row opens its detail panel.
pub(super) fn transactions_table(page: &PageSlice<&Transaction>, currency: &str) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow w-full"
        {
            table id="transactions-table" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    }
                }

                tbody
                {
                    @for transaction in page.visible {
                        tr
                            class={(TABLE_ROW_STYLE) " cursor-pointer hover:bg-gray-50 dark:hover:bg-gray-600"}
                            data-transaction-id=(transaction.id.as_str())
                            hx-get=(detail_url(transaction))
                            hx-target="#detail-panel"
                            hx-target-error="#alert-container"
                            hx-swap="innerHTML"
                        {
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} { (transaction.date_text) }
                            td class=(TABLE_CELL_STYLE) {
                                span class=(BADGE_STYLE) { (transaction.category) }
                            }
                            td class=(TABLE_CELL_STYLE) {
                                (transaction.transaction_type.as_deref().unwrap_or("-"))
                            }
                            td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap"} {
                                (amount_with_tooltip(transaction.amount, currency))
                            }
                            td class=(TABLE_CELL_STYLE) title=[transaction.description.as_deref()] {
                                (truncate_text(
                                    transaction.description.as_deref().unwrap_or(""),
                                    DESCRIPTION_MAX_LENGTH,
                                ))
                            }
                        }
                    }

                    @if page.visible.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No transactions match the current filters."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the pagination bar.
///
/// `page_url` maps a page number to the URL that shows that page with the
/// current filters.
pub(super) fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    let page_link = |page: u64, text: &str| {
        let url = page_url(page);

        html! {
            a
                href=(url)
                hx-get=(url)
                hx-target="#dashboard-content"
                hx-swap="outerHTML"
                class=(PAGINATION_LINK_STYLE)
            {
                (text)
            }
        }
    };

    html! {
        nav class="pagination mt-4" aria-label="Transaction pages"
        {
            ul class="pagination inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => { (page_link(*page, "Back")) }
                            PaginationIndicator::NextButton(page) => { (page_link(*page, "Next")) }
                            PaginationIndicator::Page(page) => { (page_link(*page, &page.to_string())) }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(PAGINATION_CURRENT_STYLE) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(PAGINATION_LINK_STYLE) { "..." }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Lists the first few matches of the search. Clicking one opens its detail panel.
pub(super) fn search_preview(search: &str, matches: &[&Transaction], currency: &str) -> Markup {
    html! {
        section id="search-preview" class="w-full mb-4"
        {
            h3 class="text-lg font-semibold mb-2"
            {
                "Matches for \"" (search) "\""
            }

            @if matches.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-400" { "No matches." }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in matches.iter().take(SEARCH_PREVIEW_LIMIT) {
                        li
                            class="py-2 cursor-pointer hover:bg-gray-100 dark:hover:bg-gray-700"
                            hx-get=(detail_url(transaction))
                            hx-target="#detail-panel"
                            hx-target-error="#alert-container"
                            hx-swap="innerHTML"
                        {
                            span class=(BADGE_STYLE) { (transaction.category) }
                            " "
                            (amount_with_tooltip(transaction.amount, currency))
                            " "
                            span class="text-gray-500" { (transaction.date_text) }
                        }
                    }
                }
            }
        }
    }
}
