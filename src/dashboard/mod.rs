//! Dashboard module
//!
//! Provides the page with the filter controls, summary cards, charts, the
//! paginated transaction table and the transaction detail panel.

mod cards;
mod charts;
mod detail;
mod handlers;
mod tables;
mod view;

pub use handlers::{
    DashboardQuery, DashboardState, get_dashboard_page, get_transaction_detail, post_refresh,
};
