pub mod costing;
pub mod crashing;
pub mod pareto;
pub mod requirements;
pub mod rollup;
pub mod standard;
pub mod unit_price;

pub use costing::{CostedItems, ItemCost, cost_items, planned_duration_days};
pub use crashing::{
    CrashingAnalysis, CrashingScenario, FrontierPoint, simulate_crashing, simulate_crashing_with,
};
pub use pareto::{
    ClassBreakdown, ClassStats, CostClass, ParetoReport, RankedItem, classify_costs,
    classify_pareto,
};
pub use requirements::{MaterialRequirement, material_requirements};
pub use rollup::{
    CategoryTotal, EvmReport, PerformanceIndices, SCurvePoint, roll_up_project, s_curve_series,
    smoothstep,
};
pub use standard::{UnitPriceComparison, compare_with_standard};
pub use unit_price::{
    CrewCosting, UnitPriceBreakdown, analyze, analyze_unit_price, analyze_unit_price_with,
    crew_hourly_cost,
};
