use serde::{Deserialize, Serialize};

use super::unit_price::{
    CrewCosting, UnitPriceBreakdown, analyze_unit_price_with, crew_labor_cost, material_cost,
    tool_cost,
};
use crate::catalog::{CrewUsage, MaterialUsage, StandardYields, Task, ToolUsage, non_negative};
use crate::config::ScheduleParameters;
use crate::index::CatalogIndexes;

/// A task's configured recipe priced side by side with its standard recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPriceComparison {
    pub task_id: String,
    pub actual: UnitPriceBreakdown,
    pub standard: UnitPriceBreakdown,
    /// `actual - standard`, component by component.
    pub delta: UnitPriceBreakdown,
}

impl UnitPriceComparison {
    /// Relative deviation of the total unit cost from the standard, in percent.
    pub fn total_deviation_percent(&self) -> f64 {
        if self.standard.total_unit_cost > 0.0 {
            self.delta.total_unit_cost / self.standard.total_unit_cost * 100.0
        } else {
            0.0
        }
    }
}

/// Compares the task's consumption records with its standard yields.
///
/// Returns `None` when the task has no standard recipe.
pub fn compare_with_standard(
    task: &Task,
    indexes: &CatalogIndexes,
    schedule: &ScheduleParameters,
) -> Option<UnitPriceComparison> {
    let recipe = task.standard_yields.as_ref()?;
    let actual = analyze_unit_price_with(task, indexes, schedule);
    let standard = price_standard_recipe(task, recipe, indexes, schedule);
    let delta = UnitPriceBreakdown::new(
        actual.material_cost - standard.material_cost,
        actual.labor_cost - standard.labor_cost,
        actual.tool_cost - standard.tool_cost,
        actual.fixed_cost - standard.fixed_cost,
    );
    Some(UnitPriceComparison {
        task_id: task.id.clone(),
        actual,
        standard,
        delta,
    })
}

fn price_standard_recipe(
    task: &Task,
    recipe: &StandardYields,
    indexes: &CatalogIndexes,
    schedule: &ScheduleParameters,
) -> UnitPriceBreakdown {
    let material_lines: Vec<MaterialUsage> = recipe
        .materials
        .iter()
        .map(|line| MaterialUsage::new(&task.id, &line.material_id, line.quantity))
        .collect();
    let tool_lines: Vec<ToolUsage> = recipe
        .tools
        .iter()
        .map(|line| ToolUsage::new(&task.id, &line.tool_id, line.hours_per_unit))
        .collect();

    let labor = match &recipe.crew {
        Some(line) => {
            let record = CrewUsage::new(&task.id, &line.crew_id, line.quantity);
            let costing = CrewCosting::from_indexes(indexes, schedule);
            crew_labor_cost(task, &record, &costing)
        }
        None => non_negative(task.labor_cost),
    };

    UnitPriceBreakdown::new(
        material_cost(task, &material_lines, indexes.materials()),
        labor,
        tool_cost(task, &tool_lines, indexes.tools()),
        non_negative(task.fixed_cost.unwrap_or(0.0)),
    )
}
