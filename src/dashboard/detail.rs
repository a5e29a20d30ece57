//! The detail panel for a single transaction.

use maud::{Markup, html};

use crate::{
    html::{BUTTON_SECONDARY_STYLE, format_amount},
    transaction::{DetailField, TransactionDetail},
};

/// Renders the detail panel. Fields that do not apply to the transaction are
/// shown in italics with an explanation rather than left blank.
pub(super) fn detail_panel_view(detail: &TransactionDetail, currency: &str) -> Markup {
    let amount = format_amount(detail.amount, currency);

    html! {
        section
            id="transaction-detail"
            aria-label="Transaction details"
            class="w-full rounded-lg border border-gray-200 dark:border-gray-700
                bg-white dark:bg-gray-800 p-4 shadow-md mb-4"
        {
            div class="flex justify-between items-start mb-3"
            {
                h3 class="text-lg font-semibold" { "Transaction " (detail.id.as_str()) }

                button
                    type="button"
                    class=(BUTTON_SECONDARY_STYLE)
                    onclick="document.getElementById('detail-panel').innerHTML = ''"
                {
                    "Close"
                }
            }

            dl class="grid grid-cols-1 sm:grid-cols-[max-content_1fr] gap-x-6 gap-y-2 text-sm"
            {
                (detail_row("Amount", html!((amount))))
                (detail_row("Category", html!((detail.category))))
                (detail_row("Type", field_value(&detail.transaction_type)))
                (detail_row("Date", html!((detail.date))))
                (detail_row("Sender", field_value(&detail.sender)))
                (detail_row("Receiver", field_value(&detail.receiver)))
                (detail_row("Message", field_value(&detail.description)))
            }
        }
    }
}

fn detail_row(label: &str, value: Markup) -> Markup {
    html! {
        dt class="font-medium text-gray-600 dark:text-gray-400" { (label) }
        dd { (value) }
    }
}

fn field_value(field: &DetailField) -> Markup {
    match field {
        DetailField::Value(text) => html!((text)),
        DetailField::NotApplicable => html! {
            span class="not-applicable italic text-gray-500" { (field.display_text()) }
        },
    }
}
