use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Invalid period key '{0}': expected YYYY-MM")]
    InvalidPeriodKey(String),
}
