use chrono::{NaiveDate, TimeDelta};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::unit_price::{UnitPriceBreakdown, analyze_unit_price_with};
use crate::budget::{BudgetItem, Project};
use crate::catalog::Task;
use crate::config::ScheduleParameters;
use crate::index::CatalogIndexes;

/// One budget line priced against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCost {
    pub item_id: String,
    pub task_id: String,
    pub task_name: String,
    pub category: String,
    pub unit: String,
    /// Normalized (non-negative) quantity.
    pub quantity: f64,
    /// Progress as a fraction in `[0, 1]`.
    pub progress: f64,
    pub unit_price: UnitPriceBreakdown,
    /// `unit_price` scaled by `quantity`.
    pub cost: UnitPriceBreakdown,
    pub start: NaiveDate,
    /// `None` when the task has no usable yield and no manual duration.
    pub duration_days: Option<i64>,
}

impl ItemCost {
    /// Budget at completion for this line.
    pub fn budget(&self) -> f64 {
        self.cost.total_unit_cost
    }

    /// `None` when unscheduled or when the end falls outside the calendar range.
    pub fn end(&self) -> Option<NaiveDate> {
        self.duration_days
            .and_then(|days| offset_date(self.start, days))
    }

    pub fn earned_value(&self) -> f64 {
        self.budget() * self.progress
    }

    /// Planned value on `as_of`, assuming linear progress between start and end.
    pub fn planned_value(&self, as_of: NaiveDate) -> f64 {
        let (Some(duration), Some(end)) = (self.duration_days, self.end()) else {
            return 0.0;
        };
        if as_of >= end {
            self.budget()
        } else if as_of > self.start {
            let elapsed = (as_of - self.start).num_days() as f64;
            self.budget() * elapsed / duration as f64
        } else {
            0.0
        }
    }

    /// Labor and tool cost implied by the progress made so far.
    pub fn inferred_labor_and_tool_actual(&self) -> f64 {
        self.cost.labor_and_tool() * self.progress
    }
}

/// Priced lines plus the ids of lines that could not be priced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostedItems {
    pub items: Vec<ItemCost>,
    /// Items whose task is missing from the catalog.
    pub skipped: Vec<String>,
}

/// `start` moved by `days`, or `None` past the representable date range.
pub fn offset_date(start: NaiveDate, days: i64) -> Option<NaiveDate> {
    start.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Planned duration in days: the manual override, else output over crew yield.
pub fn planned_duration_days(item: &BudgetItem, task: &Task) -> Option<i64> {
    if let Some(days) = item.manual_duration_days {
        return Some(days.max(0));
    }
    let daily_yield = task.schedulable_yield()?;
    let crew_output = daily_yield * f64::from(item.crew_count());
    Some((item.normalized_quantity() / crew_output).ceil() as i64)
}

pub fn cost_item(
    project: &Project,
    item: &BudgetItem,
    task: &Task,
    indexes: &CatalogIndexes,
    schedule: &ScheduleParameters,
) -> ItemCost {
    let quantity = item.normalized_quantity();
    let unit_price = analyze_unit_price_with(task, indexes, schedule);
    let start = item.start_or(project.start_date);
    let duration_days = match planned_duration_days(item, task) {
        Some(days) if offset_date(start, days).is_none() => {
            tracing::debug!(item = %item.id, task = %task.id, days, "duration not computable: end date out of range");
            None
        }
        Some(days) => Some(days),
        None => {
            tracing::debug!(item = %item.id, task = %task.id, "duration not computable: task has no daily yield");
            None
        }
    };
    ItemCost {
        item_id: item.id.clone(),
        task_id: task.id.clone(),
        task_name: task.name.clone(),
        category: task.category.clone(),
        unit: task.unit.clone(),
        quantity,
        progress: item.progress_fraction(),
        unit_price,
        cost: unit_price.scaled(quantity),
        start,
        duration_days,
    }
}

/// Prices every item of `project`, preserving input order.
///
/// Items of other projects are ignored; items whose task is unknown are
/// reported in [`CostedItems::skipped`].
pub fn cost_items(
    project: &Project,
    items: &[BudgetItem],
    indexes: &CatalogIndexes,
    schedule: &ScheduleParameters,
) -> CostedItems {
    let priced: Vec<Result<ItemCost, &str>> = items
        .par_iter()
        .filter(|item| item.project_id == project.id)
        .map(|item| match indexes.task(&item.task_id) {
            Some(task) => Ok(cost_item(project, item, task, indexes, schedule)),
            None => Err(item.id.as_str()),
        })
        .collect();

    let mut costed = CostedItems::default();
    for entry in priced {
        match entry {
            Ok(cost) => costed.items.push(cost),
            Err(item_id) => {
                tracing::debug!(item = %item_id, "budget item has no task in the catalog; skipped");
                costed.skipped.push(item_id.to_string());
            }
        }
    }
    costed
}
