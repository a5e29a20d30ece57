//! Summary cards shown above the transaction table.

use maud::{Markup, html};

use crate::{
    html::{amount_with_tooltip, format_amount},
    transaction::{INCOMING_CATEGORY, Summary},
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

/// Renders the summary cards for the filtered transactions.
pub(super) fn summary_cards_view(summary: &Summary, currency: &str) -> Markup {
    let outgoing_amount = summary.total_amount - summary.incoming_amount;
    let outgoing_count = summary.transaction_count - summary.incoming_count;

    html! {
        section id="summary-cards" class="w-full mx-auto mb-6"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (card("Transactions", html!((summary.transaction_count)), None))
                (card(
                    "Total amount",
                    amount_with_tooltip(summary.total_amount, currency),
                    None,
                ))
                (card(
                    "Incoming",
                    amount_with_tooltip(summary.incoming_amount, currency),
                    Some(format!("{} \"{INCOMING_CATEGORY}\" transactions", summary.incoming_count)),
                ))
                (card(
                    "Other",
                    amount_with_tooltip(outgoing_amount, currency),
                    Some(format!("{outgoing_count} transactions")),
                ))
            }
        }
    }
}

fn card(title: &str, value: Markup, caption: Option<String>) -> Markup {
    html! {
        div class=(CARD_STYLE) aria-label=(title)
        {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            p class="text-2xl font-bold mt-1" { (value) }

            @if let Some(caption) = caption {
                p class="text-xs text-gray-500 dark:text-gray-400 mt-1" { (caption) }
            }
        }
    }
}

/// A one line description of the totals, e.g., for screen readers and tests.
pub(super) fn summary_text(summary: &Summary, currency: &str) -> String {
    format!(
        "{} transactions totalling {}",
        summary.transaction_count,
        format_amount(summary.total_amount, currency)
    )
}
