//! Group statistics handlers.

mod group_statistics;

pub use group_statistics::{GroupReport, GroupStatisticsHandler, GroupStatisticsQuery};
