pub mod aggregator;
pub mod handlers;


pub use aggregator::{
    aggregate, format_duration_label, parse_duration_label, period_bounds, Granularity,
    PeriodCard, ProjectBreakdown,
};
pub use handlers::reports_handler;
