//! Grouped totals over filtered transactions for the dashboard charts.
//!
//! Buckets keep the order in which their keys first appear in the input.
//! Transactions arrive in the order the source sorted them, so the buckets are
//! never re-sorted here.

use std::{collections::HashMap, hash::Hash};

use serde::Serialize;
use time::Month;

use super::core::Transaction;

/// The category that counts as money received.
pub const INCOMING_CATEGORY: &str = "Coming";

/// The label for transactions whose source did not report a type.
pub const UNSPECIFIED_TYPE_LABEL: &str = "Unspecified";

/// The total amount and number of transactions for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// The display label of the group, e.g., "Coming" or "Jan 2024".
    pub label: String,
    /// The sum of the amounts in the group.
    pub total: f64,
    /// How many transactions are in the group.
    pub count: usize,
}

/// Overall numbers for a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// The number of transactions.
    pub transaction_count: usize,
    /// The sum of all amounts.
    pub total_amount: f64,
    /// The number of incoming transactions.
    pub incoming_count: usize,
    /// The sum of incoming amounts.
    pub incoming_amount: f64,
}

/// Accumulates totals per key while remembering the order keys were first seen.
struct OrderedTotals<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, f64, usize)>,
}

impl<K: Eq + Hash + Clone> OrderedTotals<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: K, amount: f64) {
        let position = *self.index.entry(key.clone()).or_insert_with(|| {
            self.entries.push((key, 0.0, 0));
            self.entries.len() - 1
        });

        let (_, total, count) = &mut self.entries[position];
        *total += amount;
        *count += 1;
    }

    fn into_buckets(self, label: impl Fn(&K) -> String) -> Vec<Bucket> {
        self.entries
            .into_iter()
            .map(|(key, total, count)| Bucket {
                label: label(&key),
                total,
                count,
            })
            .collect()
    }
}

/// Sum the amounts of `transactions` per category.
pub fn totals_by_category(transactions: &[&Transaction]) -> Vec<Bucket> {
    let mut totals = OrderedTotals::new();

    for transaction in transactions {
        totals.add(transaction.category.as_str(), transaction.amount);
    }

    totals.into_buckets(|category| category.to_string())
}

/// Sum the amounts of `transactions` per transaction type.
///
/// Transactions without a type are grouped under [UNSPECIFIED_TYPE_LABEL].
pub fn totals_by_type(transactions: &[&Transaction]) -> Vec<Bucket> {
    let mut totals = OrderedTotals::new();

    for transaction in transactions {
        let transaction_type = transaction
            .transaction_type
            .as_deref()
            .unwrap_or(UNSPECIFIED_TYPE_LABEL);
        totals.add(transaction_type, transaction.amount);
    }

    totals.into_buckets(|transaction_type| transaction_type.to_string())
}

/// Sum the amounts of `transactions` per calendar month.
///
/// Months from different years are different buckets. The labels carry the
/// year only when the buckets span more than one year, e.g., "Jan" versus
/// "Jan 2024".
pub fn totals_by_month(transactions: &[&Transaction]) -> Vec<Bucket> {
    let mut totals = OrderedTotals::new();

    for transaction in transactions {
        let date = transaction.date();
        totals.add((date.year(), date.month()), transaction.amount);
    }

    let first_year = totals.entries.first().map(|((year, _), _, _)| *year);
    let spans_years = totals
        .entries
        .iter()
        .any(|((year, _), _, _)| Some(*year) != first_year);

    totals.into_buckets(|(year, month)| {
        if spans_years {
            format!("{} {year}", month_abbreviation(*month))
        } else {
            month_abbreviation(*month).to_owned()
        }
    })
}

/// Count and sum `transactions`, overall and for the incoming category.
pub fn summarize(transactions: &[&Transaction]) -> Summary {
    transactions
        .iter()
        .fold(Summary::default(), |mut summary, transaction| {
            summary.transaction_count += 1;
            summary.total_amount += transaction.amount;

            if transaction.category == INCOMING_CATEGORY {
                summary.incoming_count += 1;
                summary.incoming_amount += transaction.amount;
            }

            summary
        })
}

/// Three-letter month abbreviations, e.g., "Jan", "Feb".
pub fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::transaction::core::{Transaction, test_utils::transaction};

    use super::{
        Bucket, Summary, UNSPECIFIED_TYPE_LABEL, summarize, totals_by_category, totals_by_month,
        totals_by_type,
    };

    fn bucket(label: &str, total: f64, count: usize) -> Bucket {
        Bucket {
            label: label.to_owned(),
            total,
            count,
        }
    }

    #[test]
    fn totals_by_category_sums_amounts() {
        let transactions = [
            transaction(1, 100.0, "Coming", date!(2024 - 01 - 05)),
            transaction(2, 50.0, "Going", date!(2024 - 02 - 10)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = totals_by_category(&refs);

        assert_eq!(got, [bucket("Coming", 100.0, 1), bucket("Going", 50.0, 1)]);
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let transactions = [
            transaction(1, 5.0, "Zebra", date!(2024 - 01 - 05)),
            transaction(2, 7.0, "Alpha", date!(2024 - 01 - 06)),
            transaction(3, 1.0, "Zebra", date!(2024 - 01 - 07)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = totals_by_category(&refs);

        assert_eq!(got, [bucket("Zebra", 6.0, 2), bucket("Alpha", 7.0, 1)]);
    }

    #[test]
    fn category_totals_add_up_to_overall_total() {
        let transactions: Vec<Transaction> = (1..=40)
            .map(|i| {
                let category = ["Coming", "Going", "Airtime"][i as usize % 3];
                transaction(i, f64::from(i) * 10.25, category, date!(2024 - 01 - 05))
            })
            .collect();
        let refs: Vec<_> = transactions.iter().collect();

        let bucket_sum: f64 = totals_by_category(&refs)
            .iter()
            .map(|bucket| bucket.total)
            .sum();
        let overall: f64 = transactions.iter().map(|t| t.amount).sum();

        assert!((bucket_sum - overall).abs() < 1e-9);
    }

    #[test]
    fn same_month_shares_a_bucket() {
        let transactions = [
            transaction(1, 10.0, "Coming", date!(2024 - 01 - 05)),
            transaction(2, 20.0, "Going", date!(2024 - 01 - 28)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = totals_by_month(&refs);

        assert_eq!(got, [bucket("Jan", 30.0, 2)]);
    }

    #[test]
    fn same_month_in_different_years_are_separate_buckets() {
        let transactions = [
            transaction(1, 10.0, "Coming", date!(2024 - 01 - 05)),
            transaction(2, 20.0, "Going", date!(2025 - 01 - 05)),
            transaction(3, 5.0, "Going", date!(2024 - 01 - 20)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = totals_by_month(&refs);

        assert_eq!(
            got,
            [bucket("Jan 2024", 15.0, 2), bucket("Jan 2025", 20.0, 1)]
        );
    }

    #[test]
    fn month_buckets_are_not_resorted() {
        let transactions = [
            transaction(1, 1.0, "Coming", date!(2024 - 03 - 05)),
            transaction(2, 2.0, "Coming", date!(2024 - 01 - 05)),
            transaction(3, 3.0, "Coming", date!(2024 - 02 - 05)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let labels: Vec<_> = totals_by_month(&refs)
            .into_iter()
            .map(|bucket| bucket.label)
            .collect();

        assert_eq!(labels, ["Mar", "Jan", "Feb"]);
    }

    #[test]
    fn totals_by_type_groups_missing_types() {
        let mut airtime = transaction(1, 100.0, "Going", date!(2024 - 01 - 05));
        airtime.transaction_type = Some("Airtime".to_owned());
        let transactions = [
            airtime,
            transaction(2, 50.0, "Coming", date!(2024 - 01 - 06)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = totals_by_type(&refs);

        assert_eq!(
            got,
            [
                bucket("Airtime", 100.0, 1),
                bucket(UNSPECIFIED_TYPE_LABEL, 50.0, 1)
            ]
        );
    }

    #[test]
    fn empty_input_has_no_buckets() {
        assert!(totals_by_category(&[]).is_empty());
        assert!(totals_by_month(&[]).is_empty());
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn summarize_counts_incoming_transactions() {
        let transactions = [
            transaction(1, 100.0, "Coming", date!(2024 - 01 - 05)),
            transaction(2, 50.0, "Going", date!(2024 - 02 - 10)),
            transaction(3, 25.0, "Coming", date!(2024 - 02 - 11)),
        ];
        let refs: Vec<_> = transactions.iter().collect();

        let got = summarize(&refs);

        assert_eq!(
            got,
            Summary {
                transaction_count: 3,
                total_amount: 175.0,
                incoming_count: 2,
                incoming_amount: 125.0,
            }
        );
    }
}
