use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::costing::{ItemCost, cost_items};
use crate::budget::{BudgetItem, Project};
use crate::config::ScheduleParameters;
use crate::index::CatalogIndexes;

/// Cumulative share of cost (percent) up to which items are class A.
pub const CLASS_A_LIMIT: f64 = 80.0;
/// Cumulative share of cost (percent) up to which items are class B.
pub const CLASS_B_LIMIT: f64 = 95.0;

const PERCENT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostClass {
    A,
    B,
    C,
}

impl CostClass {
    pub fn for_cumulative_percent(percent: f64) -> Self {
        if percent <= CLASS_A_LIMIT + PERCENT_TOLERANCE {
            CostClass::A
        } else if percent <= CLASS_B_LIMIT + PERCENT_TOLERANCE {
            CostClass::B
        } else {
            CostClass::C
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostClass::A => "A",
            CostClass::B => "B",
            CostClass::C => "C",
        }
    }
}

impl fmt::Display for CostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub rank: usize,
    pub item_id: String,
    pub task_id: String,
    pub task_name: String,
    pub cost: f64,
    /// This item's share of the project total, in percent.
    pub percent: f64,
    pub cumulative_percent: f64,
    pub class: CostClass,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub count: usize,
    pub cost: f64,
    /// Share of all ranked items, in percent.
    pub count_percent: f64,
    /// Share of the project total, in percent.
    pub cost_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassBreakdown {
    pub a: ClassStats,
    pub b: ClassStats,
    pub c: ClassStats,
}

impl ClassBreakdown {
    pub fn get(&self, class: CostClass) -> &ClassStats {
        match class {
            CostClass::A => &self.a,
            CostClass::B => &self.b,
            CostClass::C => &self.c,
        }
    }

    fn get_mut(&mut self, class: CostClass) -> &mut ClassStats {
        match class {
            CostClass::A => &mut self.a,
            CostClass::B => &mut self.b,
            CostClass::C => &mut self.c,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParetoReport {
    pub total_cost: f64,
    pub ranked_items: Vec<RankedItem>,
    pub class_stats: ClassBreakdown,
}

/// Prices the project's items and classifies them.
pub fn classify_pareto(
    project: &Project,
    items: &[BudgetItem],
    indexes: &CatalogIndexes,
    schedule: &ScheduleParameters,
) -> ParetoReport {
    let costed = cost_items(project, items, indexes, schedule);
    classify_costs(&costed.items)
}

/// Ranks already-priced items by budget, highest first, and assigns ABC classes.
///
/// When the total is zero every item is class C at 100% cumulative.
pub fn classify_costs(items: &[ItemCost]) -> ParetoReport {
    let mut ordered: Vec<&ItemCost> = items.iter().collect();
    ordered.sort_by(|a, b| b.budget().partial_cmp(&a.budget()).unwrap_or(Ordering::Equal));

    let total_cost: f64 = ordered.iter().map(|item| item.budget()).sum();
    let item_count = ordered.len();

    let mut running = 0.0;
    let mut class_stats = ClassBreakdown::default();
    let mut ranked_items = Vec::with_capacity(item_count);
    for (idx, item) in ordered.into_iter().enumerate() {
        let cost = item.budget();
        running += cost;
        let (percent, cumulative_percent) = if total_cost > 0.0 {
            (cost * 100.0 / total_cost, (running * 100.0 / total_cost).min(100.0))
        } else {
            (0.0, 100.0)
        };
        let class = CostClass::for_cumulative_percent(cumulative_percent);
        let stats = class_stats.get_mut(class);
        stats.count += 1;
        stats.cost += cost;
        ranked_items.push(RankedItem {
            rank: idx + 1,
            item_id: item.item_id.clone(),
            task_id: item.task_id.clone(),
            task_name: item.task_name.clone(),
            cost,
            percent,
            cumulative_percent,
            class,
        });
    }

    for stats in [&mut class_stats.a, &mut class_stats.b, &mut class_stats.c] {
        if item_count > 0 {
            stats.count_percent = stats.count as f64 * 100.0 / item_count as f64;
        }
        if total_cost > 0.0 {
            stats.cost_percent = stats.cost * 100.0 / total_cost;
        }
    }

    ParetoReport {
        total_cost,
        ranked_items,
        class_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_thresholds_are_inclusive() {
        assert_eq!(CostClass::for_cumulative_percent(80.0), CostClass::A);
        assert_eq!(CostClass::for_cumulative_percent(80.1), CostClass::B);
        assert_eq!(CostClass::for_cumulative_percent(95.0), CostClass::B);
        assert_eq!(CostClass::for_cumulative_percent(95.1), CostClass::C);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = classify_costs(&[]);
        assert_eq!(report.total_cost, 0.0);
        assert!(report.ranked_items.is_empty());
        assert_eq!(report.class_stats.a.count, 0);
    }
}
