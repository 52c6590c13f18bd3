pub mod aggregation_service;
pub mod entry_service;
pub mod insight_service;
pub mod patient_service;
pub mod settlement_service;
pub mod summary_service;

pub use aggregation_service::{
    bucket_key, percent_change, percentage, AggregationService, BucketQuery, BucketReport,
    RollingWindow,
};
pub use entry_service::{EntryService, NewEntry};
pub use insight_service::{DashboardSnapshot, InsightService};
pub use patient_service::{NewPatient, PatientService};
pub use settlement_service::{SettlementReport, SettlementService};
pub use summary_service::{EntryFilter, SummaryService, Totals};
