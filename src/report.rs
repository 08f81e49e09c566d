//! Tabular views of engine results as polars `DataFrame`s.
//!
//! Date columns are stored as polars `Date` (days since the Unix epoch).

use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

use crate::calculations::{
    CrashingAnalysis, EvmReport, ItemCost, MaterialRequirement, ParetoReport, SCurvePoint,
};

fn date_to_i32(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn date_column(name: &'static str, values: Vec<Option<i32>>) -> PolarsResult<Column> {
    Ok(Series::new(PlSmallStr::from_static(name), values)
        .cast(&DataType::Date)?
        .into_column())
}

fn column<T, V>(name: &'static str, values: V) -> Column
where
    Series: NamedFrom<V, T>,
    T: ?Sized,
{
    Series::new(PlSmallStr::from_static(name), values).into_column()
}

/// One row per priced budget item.
pub fn item_costs_frame(items: &[ItemCost]) -> PolarsResult<DataFrame> {
    let columns = vec![
        column("item_id", items.iter().map(|i| i.item_id.clone()).collect::<Vec<_>>()),
        column("task_id", items.iter().map(|i| i.task_id.clone()).collect::<Vec<_>>()),
        column("task_name", items.iter().map(|i| i.task_name.clone()).collect::<Vec<_>>()),
        column("category", items.iter().map(|i| i.category.clone()).collect::<Vec<_>>()),
        column("quantity", items.iter().map(|i| i.quantity).collect::<Vec<_>>()),
        column(
            "unit_cost",
            items.iter().map(|i| i.unit_price.total_unit_cost).collect::<Vec<_>>(),
        ),
        column("budget", items.iter().map(|i| i.budget()).collect::<Vec<_>>()),
        column("progress_pct", items.iter().map(|i| i.progress * 100.0).collect::<Vec<_>>()),
        date_column("start", items.iter().map(|i| Some(date_to_i32(i.start))).collect())?,
        column("duration_days", items.iter().map(|i| i.duration_days).collect::<Vec<_>>()),
        date_column("end", items.iter().map(|i| i.end().map(date_to_i32)).collect())?,
    ];
    DataFrame::new(columns)
}

pub fn evm_summary_frame(report: &EvmReport) -> PolarsResult<DataFrame> {
    let metrics = [
        ("BAC", report.bac),
        ("PV", report.pv),
        ("EV", report.ev),
        ("AC", report.ac),
        ("CV", report.cv),
        ("SV", report.sv),
        ("CPI", report.cpi),
        ("SPI", report.spi),
        ("EAC", report.eac),
        ("ETC", report.etc),
        ("VAC", report.vac),
    ];
    DataFrame::new(vec![
        column("metric", metrics.iter().map(|(name, _)| *name).collect::<Vec<_>>()),
        column("value", metrics.iter().map(|(_, value)| *value).collect::<Vec<_>>()),
    ])
}

pub fn pareto_frame(report: &ParetoReport) -> PolarsResult<DataFrame> {
    let rows = &report.ranked_items;
    DataFrame::new(vec![
        column("rank", rows.iter().map(|r| r.rank as u32).collect::<Vec<_>>()),
        column("item_id", rows.iter().map(|r| r.item_id.clone()).collect::<Vec<_>>()),
        column("task_name", rows.iter().map(|r| r.task_name.clone()).collect::<Vec<_>>()),
        column("cost", rows.iter().map(|r| r.cost).collect::<Vec<_>>()),
        column("percent", rows.iter().map(|r| r.percent).collect::<Vec<_>>()),
        column(
            "cumulative_percent",
            rows.iter().map(|r| r.cumulative_percent).collect::<Vec<_>>(),
        ),
        column("class", rows.iter().map(|r| r.class.as_str()).collect::<Vec<_>>()),
    ])
}

pub fn s_curve_frame(points: &[SCurvePoint]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        column("bucket", points.iter().map(|p| p.index as u32).collect::<Vec<_>>()),
        date_column("date", points.iter().map(|p| Some(date_to_i32(p.date))).collect())?,
        column("planned", points.iter().map(|p| p.planned).collect::<Vec<_>>()),
        column("earned", points.iter().map(|p| p.earned).collect::<Vec<_>>()),
        column("actual", points.iter().map(|p| p.actual).collect::<Vec<_>>()),
    ])
}

pub fn frontier_frame(analysis: &CrashingAnalysis) -> PolarsResult<DataFrame> {
    let points = &analysis.frontier;
    DataFrame::new(vec![
        column("extra_crews", points.iter().map(|p| p.extra_crews).collect::<Vec<_>>()),
        column(
            "overtime_pct",
            points.iter().map(|p| p.overtime_percent).collect::<Vec<_>>(),
        ),
        column("crews", points.iter().map(|p| p.crews).collect::<Vec<_>>()),
        column("duration_days", points.iter().map(|p| p.duration_days).collect::<Vec<_>>()),
        column("cost", points.iter().map(|p| p.cost).collect::<Vec<_>>()),
    ])
}

pub fn requirements_frame(lines: &[MaterialRequirement]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        column("material_id", lines.iter().map(|l| l.material_id.clone()).collect::<Vec<_>>()),
        column("name", lines.iter().map(|l| l.name.clone()).collect::<Vec<_>>()),
        column("unit", lines.iter().map(|l| l.unit.clone()).collect::<Vec<_>>()),
        column("required", lines.iter().map(|l| l.required_quantity).collect::<Vec<_>>()),
        column("received", lines.iter().map(|l| l.received_quantity).collect::<Vec<_>>()),
        column("pending", lines.iter().map(|l| l.pending_quantity).collect::<Vec<_>>()),
        column("required_cost", lines.iter().map(|l| l.required_cost).collect::<Vec<_>>()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::s_curve_series;
    use crate::config::ScheduleParameters;

    #[test]
    fn s_curve_frame_keeps_future_buckets_null() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let points = s_curve_series(start, end, as_of, 300.0, 90.0, 100.0, &ScheduleParameters::default());
        let df = s_curve_frame(&points).unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("earned").unwrap().null_count(), 2);
    }

    #[test]
    fn empty_inputs_build_empty_frames() {
        let df = item_costs_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 11);
    }
}
