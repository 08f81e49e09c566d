use serde::{Deserialize, Serialize};

use super::unit_price::{UnitPriceBreakdown, analyze_unit_price_with};
use crate::budget::BudgetItem;
use crate::catalog::Task;
use crate::config::{CrashingParameters, ScheduleParameters};
use crate::index::CatalogIndexes;

/// Acceleration requested for one budget item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrashingScenario {
    /// Crews added on top of the item's assigned crews.
    pub added_crews: u32,
    pub overtime_percent: f64,
}

impl CrashingScenario {
    pub fn new(added_crews: u32, overtime_percent: f64) -> Self {
        Self {
            added_crews,
            overtime_percent,
        }
    }

    /// Clamps extra crews to the configured maximum and snaps overtime to the
    /// nearest supported option (the lower one on ties).
    pub fn normalized(&self, params: &CrashingParameters) -> Self {
        let added_crews = self.added_crews.min(params.max_extra_crews);
        let requested = if self.overtime_percent.is_finite() {
            self.overtime_percent
        } else {
            0.0
        };
        let overtime_percent = params
            .overtime_options
            .iter()
            .copied()
            .filter(|option| option.is_finite())
            .fold(None::<f64>, |best, option| match best {
                Some(current) if (current - requested).abs() <= (option - requested).abs() => {
                    Some(current)
                }
                _ => Some(option),
            })
            .unwrap_or(0.0);
        Self {
            added_crews,
            overtime_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    pub extra_crews: u32,
    pub overtime_percent: f64,
    /// Total crews working, base plus extra.
    pub crews: u32,
    pub duration_days: i64,
    pub cost: f64,
}

impl FrontierPoint {
    fn dominates(&self, other: &FrontierPoint) -> bool {
        self.duration_days <= other.duration_days
            && self.cost <= other.cost
            && (self.duration_days < other.duration_days || self.cost < other.cost)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashingAnalysis {
    pub item_id: String,
    pub task_id: String,
    /// False when the task has no usable daily yield.
    pub computable: bool,
    /// The scenario actually simulated, after normalisation.
    pub scenario: CrashingScenario,
    pub normal_duration: i64,
    pub normal_cost: f64,
    pub sim_duration: i64,
    pub sim_cost: f64,
    pub days_saved: i64,
    pub cost_increase: f64,
    /// Extra cost per day saved; 0 when no day is saved.
    pub cost_slope: f64,
    pub frontier: Vec<FrontierPoint>,
}

impl CrashingAnalysis {
    /// Frontier points no other point beats on both duration and cost, fastest first.
    pub fn efficient_frontier(&self) -> Vec<FrontierPoint> {
        let mut efficient: Vec<FrontierPoint> = Vec::new();
        for point in &self.frontier {
            if self.frontier.iter().any(|other| other.dominates(point)) {
                continue;
            }
            let repeated = efficient
                .iter()
                .any(|kept| kept.duration_days == point.duration_days && kept.cost == point.cost);
            if !repeated {
                efficient.push(*point);
            }
        }
        efficient.sort_by_key(|point| point.duration_days);
        efficient
    }
}

/// Baseline figures of one item, shared by every frontier point.
struct CrashingModel<'a> {
    params: &'a CrashingParameters,
    quantity: f64,
    daily_yield: f64,
    base_crews: u32,
    baseline: UnitPriceBreakdown,
    daily_tool_rate: f64,
}

impl CrashingModel<'_> {
    fn effective_yield(&self, crews: u32, overtime_percent: f64) -> f64 {
        let overtime = overtime_percent / 100.0;
        let fatigue = if self.params.fatigue_divisor > 0.0 {
            1.0 - overtime_percent / self.params.fatigue_divisor
        } else {
            1.0
        };
        self.daily_yield
            * f64::from(crews)
            * (1.0 + overtime * self.params.overtime_productivity)
            * fatigue
    }

    fn evaluate(&self, extra_crews: u32, overtime_percent: f64) -> Option<FrontierPoint> {
        let crews = self.base_crews + extra_crews;
        let effective_yield = self.effective_yield(crews, overtime_percent);
        if !effective_yield.is_finite() || effective_yield <= 0.0 {
            return None;
        }
        let duration_days = (self.quantity / effective_yield).ceil() as i64;

        let overtime = overtime_percent / 100.0;
        let labor = self.baseline.labor_cost
            * (1.0 + overtime * self.params.overtime_premium)
            * (1.0 + f64::from(extra_crews) * self.params.supervision_overhead_per_crew);
        let tool = (self.daily_tool_rate * (1.0 + overtime) * duration_days as f64 * f64::from(crews))
            .max(self.baseline.tool_cost);

        Some(FrontierPoint {
            extra_crews,
            overtime_percent,
            crews,
            duration_days,
            cost: self.baseline.material_cost + labor + tool + self.baseline.fixed_cost,
        })
    }
}

/// Simulates adding crews and overtime to one budget item with default schedule parameters.
pub fn simulate_crashing(
    item: &BudgetItem,
    task: &Task,
    indexes: &CatalogIndexes,
    scenario: CrashingScenario,
    params: &CrashingParameters,
) -> CrashingAnalysis {
    simulate_crashing_with(item, task, indexes, scenario, params, &ScheduleParameters::default())
}

/// Simulates adding crews and overtime to one budget item.
///
/// The frontier holds every combination of `0..=max_extra_crews` extra crews
/// and each overtime option. The item itself is never modified.
pub fn simulate_crashing_with(
    item: &BudgetItem,
    task: &Task,
    indexes: &CatalogIndexes,
    scenario: CrashingScenario,
    params: &CrashingParameters,
    schedule: &ScheduleParameters,
) -> CrashingAnalysis {
    let normalized = scenario.normalized(params);
    if normalized != scenario {
        tracing::debug!(
            item = %item.id,
            requested_crews = scenario.added_crews,
            requested_overtime = scenario.overtime_percent,
            crews = normalized.added_crews,
            overtime = normalized.overtime_percent,
            "crashing scenario normalised"
        );
    }

    let quantity = item.normalized_quantity();
    let baseline = analyze_unit_price_with(task, indexes, schedule).scaled(quantity);
    let normal_cost = baseline.total_unit_cost;

    let Some(daily_yield) = task.schedulable_yield() else {
        tracing::debug!(item = %item.id, task = %task.id, "crashing not computable: task has no daily yield");
        return CrashingAnalysis {
            item_id: item.id.clone(),
            task_id: task.id.clone(),
            computable: false,
            scenario: normalized,
            normal_duration: 0,
            normal_cost,
            sim_duration: 0,
            sim_cost: normal_cost,
            days_saved: 0,
            cost_increase: 0.0,
            cost_slope: 0.0,
            frontier: Vec::new(),
        };
    };

    let base_crews = item.crew_count();
    let normal_duration = (quantity / (daily_yield * f64::from(base_crews))).ceil() as i64;
    let normal_crew_days = normal_duration as f64 * f64::from(base_crews);
    let daily_tool_rate = if normal_crew_days > 0.0 {
        baseline.tool_cost / normal_crew_days
    } else {
        0.0
    };

    let model = CrashingModel {
        params,
        quantity,
        daily_yield,
        base_crews,
        baseline,
        daily_tool_rate,
    };

    let mut frontier = Vec::new();
    for extra_crews in 0..=params.max_extra_crews {
        for &overtime_percent in &params.overtime_options {
            match model.evaluate(extra_crews, overtime_percent) {
                Some(point) => frontier.push(point),
                None => tracing::debug!(
                    item = %item.id,
                    extra_crews,
                    overtime_percent,
                    "combination has no positive yield; left off the frontier"
                ),
            }
        }
    }

    let (sim_duration, sim_cost) = match model.evaluate(normalized.added_crews, normalized.overtime_percent) {
        Some(point) => (point.duration_days, point.cost),
        None => (normal_duration, normal_cost),
    };
    let days_saved = normal_duration - sim_duration;
    let cost_increase = sim_cost - normal_cost;
    let cost_slope = if days_saved > 0 {
        cost_increase / days_saved as f64
    } else {
        0.0
    };

    CrashingAnalysis {
        item_id: item.id.clone(),
        task_id: task.id.clone(),
        computable: true,
        scenario: normalized,
        normal_duration,
        normal_cost,
        sim_duration,
        sim_cost,
        days_saved,
        cost_increase,
        cost_slope,
        frontier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_clamps_crews_and_snaps_overtime() {
        let params = CrashingParameters::default();
        let scenario = CrashingScenario::new(9, 70.0).normalized(&params);
        assert_eq!(scenario.added_crews, 3);
        assert_eq!(scenario.overtime_percent, 50.0);

        let tie = CrashingScenario::new(1, 25.0).normalized(&params);
        assert_eq!(tie.overtime_percent, 0.0);

        let nan = CrashingScenario::new(0, f64::NAN).normalized(&params);
        assert_eq!(nan.overtime_percent, 0.0);
    }

    #[test]
    fn dominated_points_are_dropped() {
        let point = |duration_days, cost| FrontierPoint {
            extra_crews: 0,
            overtime_percent: 0.0,
            crews: 1,
            duration_days,
            cost,
        };
        let analysis = CrashingAnalysis {
            item_id: "I".into(),
            task_id: "T".into(),
            computable: true,
            scenario: CrashingScenario::default(),
            normal_duration: 10,
            normal_cost: 100.0,
            sim_duration: 10,
            sim_cost: 100.0,
            days_saved: 0,
            cost_increase: 0.0,
            cost_slope: 0.0,
            frontier: vec![point(10, 100.0), point(8, 120.0), point(8, 130.0), point(10, 100.0)],
        };
        let efficient = analysis.efficient_frontier();
        assert_eq!(efficient, vec![point(8, 120.0), point(10, 100.0)]);
    }
}
