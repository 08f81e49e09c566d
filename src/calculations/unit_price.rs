use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    Crew, CrewUsage, LaborCategory, Material, MaterialUsage, Task, Tool, ToolUsage, non_negative,
};
use crate::config::ScheduleParameters;
use crate::index::CatalogIndexes;

/// Cost of one unit of a task's output, split by resource type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitPriceBreakdown {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub tool_cost: f64,
    pub fixed_cost: f64,
    pub total_unit_cost: f64,
}

impl UnitPriceBreakdown {
    pub fn new(material_cost: f64, labor_cost: f64, tool_cost: f64, fixed_cost: f64) -> Self {
        Self {
            material_cost,
            labor_cost,
            tool_cost,
            fixed_cost,
            total_unit_cost: material_cost + labor_cost + tool_cost + fixed_cost,
        }
    }

    /// Breakdown for `quantity` units of output.
    pub fn scaled(&self, quantity: f64) -> Self {
        Self::new(
            self.material_cost * quantity,
            self.labor_cost * quantity,
            self.tool_cost * quantity,
            self.fixed_cost * quantity,
        )
    }

    /// Labor plus tool cost: the part of the price that accrues with physical progress.
    pub fn labor_and_tool(&self) -> f64 {
        self.labor_cost + self.tool_cost
    }
}

/// Lookups needed to price labor from crew composition.
///
/// When the bundle is absent the analyzer uses the task's manual labor cost.
#[derive(Debug, Clone, Copy)]
pub struct CrewCosting<'a> {
    pub crew_usage: &'a HashMap<String, Vec<CrewUsage>>,
    pub crews: &'a HashMap<String, Crew>,
    pub labor_categories: &'a HashMap<String, LaborCategory>,
    pub hours_per_workday: f64,
}

impl<'a> CrewCosting<'a> {
    pub fn from_indexes(indexes: &'a CatalogIndexes, schedule: &ScheduleParameters) -> Self {
        Self {
            crew_usage: indexes.crew_usage_index(),
            crews: indexes.crews(),
            labor_categories: indexes.labor_categories(),
            hours_per_workday: schedule.hours_per_workday,
        }
    }
}

/// Fully-loaded hourly cost of a crew; unknown labor categories contribute nothing.
pub fn crew_hourly_cost(crew: &Crew, labor_categories: &HashMap<String, LaborCategory>) -> f64 {
    crew.composition
        .iter()
        .map(|member| match labor_categories.get(&member.labor_category_id) {
            Some(category) => {
                category.loaded_hourly_cost()
                    * non_negative(member.headcount)
                    * non_negative(member.participation_percent)
                    / 100.0
            }
            None => {
                tracing::debug!(
                    crew = %crew.id,
                    labor_category = %member.labor_category_id,
                    "crew member references unknown labor category"
                );
                0.0
            }
        })
        .sum()
}

/// Prices one unit of `task`.
pub fn analyze(
    task: &Task,
    material_usage: &HashMap<String, Vec<MaterialUsage>>,
    materials: &HashMap<String, Material>,
    tool_usage: &HashMap<String, Vec<ToolUsage>>,
    tools: &HashMap<String, Tool>,
    crew_costing: Option<CrewCosting<'_>>,
) -> UnitPriceBreakdown {
    let material_cost = material_cost(
        task,
        material_usage.get(&task.id).map(Vec::as_slice).unwrap_or(&[]),
        materials,
    );
    let tool_cost = tool_cost(
        task,
        tool_usage.get(&task.id).map(Vec::as_slice).unwrap_or(&[]),
        tools,
    );

    let first_crew_record = crew_costing.as_ref().and_then(|costing| {
        costing
            .crew_usage
            .get(&task.id)
            .and_then(|records| records.first())
    });
    let labor_cost = match (crew_costing.as_ref(), first_crew_record) {
        (Some(costing), Some(record)) => crew_labor_cost(task, record, costing),
        _ => non_negative(task.labor_cost),
    };

    let fixed_cost = non_negative(task.fixed_cost.unwrap_or(0.0));
    UnitPriceBreakdown::new(material_cost, labor_cost, tool_cost, fixed_cost)
}

/// Prices `task` with every lookup the indexes provide, including crew data.
pub fn analyze_unit_price(task: &Task, indexes: &CatalogIndexes) -> UnitPriceBreakdown {
    analyze_unit_price_with(task, indexes, &ScheduleParameters::default())
}

pub fn analyze_unit_price_with(
    task: &Task,
    indexes: &CatalogIndexes,
    schedule: &ScheduleParameters,
) -> UnitPriceBreakdown {
    analyze(
        task,
        indexes.material_usage_index(),
        indexes.materials(),
        indexes.tool_usage_index(),
        indexes.tools(),
        Some(CrewCosting::from_indexes(indexes, schedule)),
    )
}

pub(crate) fn material_cost(
    task: &Task,
    records: &[MaterialUsage],
    materials: &HashMap<String, Material>,
) -> f64 {
    records
        .iter()
        .map(|record| match materials.get(&record.material_id) {
            Some(material) => {
                non_negative(material.unit_cost)
                    * non_negative(record.quantity)
                    * material.waste_factor()
            }
            None => {
                tracing::debug!(task = %task.id, material = %record.material_id, "dangling material reference");
                0.0
            }
        })
        .sum()
}

pub(crate) fn tool_cost(task: &Task, records: &[ToolUsage], tools: &HashMap<String, Tool>) -> f64 {
    records
        .iter()
        .map(|record| match tools.get(&record.tool_id) {
            Some(tool) => non_negative(tool.cost_per_hour) * non_negative(record.hours_per_unit),
            None => {
                tracing::debug!(task = %task.id, tool = %record.tool_id, "dangling tool reference");
                0.0
            }
        })
        .sum()
}

pub(crate) fn crew_labor_cost(task: &Task, record: &CrewUsage, costing: &CrewCosting<'_>) -> f64 {
    let Some(crew) = costing.crews.get(&record.crew_id) else {
        tracing::debug!(task = %task.id, crew = %record.crew_id, "dangling crew reference");
        return 0.0;
    };
    crew_hourly_cost(crew, costing.labor_categories)
        * hours_per_unit(task, record.quantity, costing.hours_per_workday)
}

/// Crew-hours needed per unit of output.
///
/// Taken from the crew record when positive, then from the task's own
/// hours-per-unit yield, then derived from its daily yield.
pub(crate) fn hours_per_unit(task: &Task, record_quantity: f64, hours_per_workday: f64) -> f64 {
    if record_quantity.is_finite() && record_quantity > 0.0 {
        return record_quantity;
    }
    if let Some(hours) = task.hours_per_unit.filter(|h| h.is_finite() && *h > 0.0) {
        return hours;
    }
    match task.schedulable_yield() {
        Some(daily_yield) => non_negative(hours_per_workday) / daily_yield,
        None => 0.0,
    }
}
