//! Metrics engine, schema, history collection and text reports.

pub mod curves;
pub mod evaluation;
pub mod monitoring;
pub mod report;
pub mod schema;

pub use evaluation::{LOGLOSS_EPSILON, compute_metrics};
pub use monitoring::{HistoryReport, HistoryWarning, SkipReason, collect_performance_history};
pub use schema::{
    ClassBalance, InputMetrics, Metrics, Performance, PerformanceHistory, PerformanceMetrics,
    PrCurve, Prediction, PredictionMetrics, RocCurve,
};
