//! Earnings analytics: row normalization, quarter selection, beat/miss
//! classification and aggregation into a [`types::DashboardResult`].

pub mod aggregate;
pub mod classify;
pub mod normalize;
pub mod pipeline;
pub mod quarter;
pub mod types;
pub mod utility;
