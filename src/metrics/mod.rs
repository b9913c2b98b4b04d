//! Coverage metrics per function, method, class and namespace.
//!
//! Leaf entries are measured from a structural tree and filtered coverage by
//! [`MetricsAggregator`]; [`Metrics`] rolls them up into their ancestors.

pub mod aggregator;
pub mod data;
pub mod table;

pub use aggregator::{leaf_metrics, qualified_name, MetricsAggregator};
pub use data::MetricsData;
pub use table::{Metrics, MetricsKind, MetricsReport};
