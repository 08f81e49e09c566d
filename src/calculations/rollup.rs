use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::costing::{ItemCost, cost_items, offset_date};
use super::unit_price::UnitPriceBreakdown;
use crate::budget::{BudgetItem, MaterialReceipt, Project};
use crate::catalog::non_negative;
use crate::config::ScheduleParameters;
use crate::index::CatalogIndexes;

/// Project-level earned value figures on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmReport {
    pub as_of: NaiveDate,
    pub bac: f64,
    pub pv: f64,
    pub ev: f64,
    pub ac: f64,
    pub cv: f64,
    pub sv: f64,
    pub cpi: f64,
    pub spi: f64,
    pub eac: f64,
    pub etc: f64,
    pub vac: f64,
    /// Material part of `ac`, taken from receipts.
    pub material_actual: f64,
    /// Labor and tool part of `ac`, inferred from progress.
    pub labor_tool_actual: f64,
    /// Budget totals per cost component.
    pub totals: UnitPriceBreakdown,
    pub by_category: Vec<CategoryTotal>,
    pub items: Vec<ItemCost>,
    /// Items skipped because their task is not in the catalog.
    pub skipped_items: Vec<String>,
    /// Items priced but left out of the schedule (no yield, no manual duration).
    pub unscheduled_items: Vec<String>,
    pub horizon_end: NaiveDate,
    pub s_curve: Vec<SCurvePoint>,
}

impl EvmReport {
    /// Physical completion of the whole project, 0-100.
    pub fn percent_complete(&self) -> f64 {
        if self.bac > 0.0 {
            self.ev / self.bac * 100.0
        } else {
            0.0
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.cpi < 1.0
    }

    pub fn is_behind_schedule(&self) -> bool {
        self.spi < 1.0
    }

    pub fn to_cli_summary(&self) -> String {
        format!(
            "BAC={:.2}, PV={:.2}, EV={:.2}, AC={:.2}, CPI={:.3}, SPI={:.3}, EAC={:.2}, VAC={:.2}",
            self.bac, self.pv, self.ev, self.ac, self.cpi, self.spi, self.eac, self.vac
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub item_count: usize,
    pub budget: f64,
}

/// One bucket boundary of the S-curve.
///
/// `earned` and `actual` are `None` for buckets in the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SCurvePoint {
    pub index: usize,
    pub date: NaiveDate,
    pub planned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
}

/// Rolls item costs up into project earned value metrics as of `as_of`.
pub fn roll_up_project(
    project: &Project,
    items: &[BudgetItem],
    indexes: &CatalogIndexes,
    receipts: &[MaterialReceipt],
    as_of: NaiveDate,
    schedule: &ScheduleParameters,
) -> EvmReport {
    let costed = cost_items(project, items, indexes, schedule);

    let mut bac = 0.0;
    let mut pv = 0.0;
    let mut ev = 0.0;
    let mut labor_tool_actual = 0.0;
    let mut totals = UnitPriceBreakdown::default();
    let mut by_category: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    let mut unscheduled_items = Vec::new();
    let mut horizon_end = project.start_date;

    for item in &costed.items {
        bac += item.budget();
        ev += item.earned_value();
        pv += item.planned_value(as_of);
        labor_tool_actual += item.inferred_labor_and_tool_actual();
        totals = UnitPriceBreakdown::new(
            totals.material_cost + item.cost.material_cost,
            totals.labor_cost + item.cost.labor_cost,
            totals.tool_cost + item.cost.tool_cost,
            totals.fixed_cost + item.cost.fixed_cost,
        );
        let entry = by_category.entry(item.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 += item.budget();
        match item.end() {
            Some(end) => horizon_end = horizon_end.max(end),
            None => unscheduled_items.push(item.item_id.clone()),
        }
    }

    let by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (item_count, budget))| CategoryTotal {
            category: category.to_string(),
            item_count,
            budget,
        })
        .collect();

    let material_actual = material_actual_cost(receipts, indexes, as_of);
    let ac = material_actual + labor_tool_actual;
    let indices = PerformanceIndices::compute(bac, pv, ev, ac);
    let s_curve = s_curve_series(
        project.start_date,
        horizon_end,
        as_of,
        bac,
        ev,
        ac,
        schedule,
    );

    tracing::debug!(
        project = %project.id,
        items = costed.items.len(),
        skipped = costed.skipped.len(),
        unscheduled = unscheduled_items.len(),
        bac,
        "project rolled up"
    );

    EvmReport {
        as_of,
        bac,
        pv,
        ev,
        ac,
        cv: indices.cv,
        sv: indices.sv,
        cpi: indices.cpi,
        spi: indices.spi,
        eac: indices.eac,
        etc: indices.etc,
        vac: indices.vac,
        material_actual,
        labor_tool_actual,
        totals,
        by_category,
        items: costed.items,
        skipped_items: costed.skipped,
        unscheduled_items,
        horizon_end,
        s_curve,
    }
}

/// Derived EVM indices with guarded divisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIndices {
    pub cv: f64,
    pub sv: f64,
    pub cpi: f64,
    pub spi: f64,
    pub eac: f64,
    pub etc: f64,
    pub vac: f64,
}

impl PerformanceIndices {
    pub fn compute(bac: f64, pv: f64, ev: f64, ac: f64) -> Self {
        let cpi = if ac > 0.0 { ev / ac } else { 1.0 };
        let spi = if pv > 0.0 { ev / pv } else { 1.0 };
        let eac = if cpi > 0.0 { bac / cpi } else { bac };
        Self {
            cv: ev - ac,
            sv: ev - pv,
            cpi,
            spi,
            eac,
            etc: eac - ac,
            vac: bac - eac,
        }
    }
}

/// Material actuals: catalog unit cost of everything received on or before `as_of`.
pub fn material_actual_cost(
    receipts: &[MaterialReceipt],
    indexes: &CatalogIndexes,
    as_of: NaiveDate,
) -> f64 {
    receipts
        .iter()
        .filter(|receipt| receipt.date <= as_of)
        .map(|receipt| match indexes.material(&receipt.material_id) {
            Some(material) => {
                non_negative(material.unit_cost) * non_negative(receipt.quantity_received)
            }
            None => {
                tracing::debug!(receipt = %receipt.id, material = %receipt.material_id, "receipt for unknown material");
                0.0
            }
        })
        .sum()
}

/// Ease-in-ease-out progress curve, `p^2 (3 - 2p)` on `[0, 1]`.
pub fn smoothstep(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    p * p * (3.0 - 2.0 * p)
}

/// Planned/earned/actual series at bucket boundaries from `start` to `horizon_end`.
///
/// Buckets are `s_curve_bucket_days` wide, widened as needed so the horizon
/// fits in `max_s_curve_buckets`. Planned value follows [`smoothstep`] scaled
/// by `bac`. Earned and actual are not read from per-period ledgers: the
/// totals `ev` and `ac` are spread over the elapsed buckets by the ratio `index / buckets_elapsed`.
/// A bucket counts as elapsed once its boundary date is on or before `as_of`,
/// so the last non-future boundary always equals the totals.
pub fn s_curve_series(
    start: NaiveDate,
    horizon_end: NaiveDate,
    as_of: NaiveDate,
    bac: f64,
    ev: f64,
    ac: f64,
    schedule: &ScheduleParameters,
) -> Vec<SCurvePoint> {
    let span_days = (horizon_end - start).num_days().max(0);
    let max_buckets = schedule.max_s_curve_buckets.max(1) as i64;
    let mut bucket_days = schedule.s_curve_bucket_days.max(1);
    if (span_days + bucket_days - 1) / bucket_days > max_buckets {
        bucket_days = (span_days + max_buckets - 1) / max_buckets;
    }
    let buckets = (span_days + bucket_days - 1) / bucket_days;
    let buckets = buckets.max(1) as usize;

    let elapsed = if as_of < start {
        None
    } else {
        let days = (as_of - start).num_days();
        Some(((days / bucket_days) as usize).min(buckets))
    };

    (0..=buckets)
        .map(|index| {
            let progress = index as f64 / buckets as f64;
            let ratio = elapsed.filter(|elapsed| index <= *elapsed).map(|elapsed| {
                if elapsed == 0 {
                    1.0
                } else {
                    index as f64 / elapsed as f64
                }
            });
            SCurvePoint {
                index,
                date: offset_date(start, index as i64 * bucket_days).unwrap_or(horizon_end),
                planned: bac * smoothstep(progress),
                earned: ratio.map(|r| ev * r),
                actual: ratio.map(|r| ac * r),
            }
        })
        .collect()
}
