pub mod budget;
pub mod calculations;
pub mod catalog;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod index;
pub mod persistence;
pub mod report;
pub mod snapshot;
pub mod validation;

pub use budget::{BudgetItem, MaterialReceipt, Project};
pub use calculations::{
    CrashingAnalysis, CrashingScenario, EvmReport, ParetoReport, UnitPriceBreakdown,
    analyze_unit_price, classify_pareto, compare_with_standard, material_requirements,
    roll_up_project, simulate_crashing,
};
pub use catalog::{
    Catalog, Crew, CrewMember, CrewUsage, LaborCategory, Material, MaterialUsage, Task, Tool,
    ToolUsage,
};
pub use crate::config::{ConfigError, CrashingParameters, EngineConfig, ScheduleParameters};
pub use index::CatalogIndexes;
pub use persistence::{
    PersistenceError, PersistenceResult, load_snapshot_from_json, save_snapshot_to_json,
};
pub use snapshot::EstimateSnapshot;
pub use validation::{CatalogIssue, SnapshotIssue, SnapshotValidationError, audit_catalog};
