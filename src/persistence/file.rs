use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PersistenceError, PersistenceResult};
use crate::budget::BudgetItem;
use crate::calculations::{
    CrashingAnalysis, ItemCost, MaterialRequirement, ParetoReport, SCurvePoint,
};
use crate::snapshot::EstimateSnapshot;

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &EstimateSnapshot,
    path: P,
) -> PersistenceResult<()> {
    snapshot.validate()?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, snapshot)?;
    tracing::info!(path = %path.as_ref().display(), items = snapshot.items.len(), "snapshot saved");
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<EstimateSnapshot> {
    let file = File::open(path.as_ref())?;
    let snapshot: EstimateSnapshot = serde_json::from_reader(file)?;
    snapshot.validate()?;
    tracing::info!(
        path = %path.as_ref().display(),
        project = %snapshot.project.id,
        tasks = snapshot.catalog.tasks.len(),
        items = snapshot.items.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

#[derive(Serialize, Deserialize)]
struct BudgetItemCsvRecord {
    id: String,
    project_id: String,
    task_id: String,
    quantity: f64,
    manual_duration_days: String,
    start_date: String,
    progress_percent: String,
    crews_assigned: String,
    snapshot_ref: String,
}

impl From<&BudgetItem> for BudgetItemCsvRecord {
    fn from(item: &BudgetItem) -> Self {
        Self {
            id: item.id.clone(),
            project_id: item.project_id.clone(),
            task_id: item.task_id.clone(),
            quantity: item.quantity,
            manual_duration_days: format_option(item.manual_duration_days),
            start_date: format_date(item.start_date),
            progress_percent: format_option(item.progress_percent),
            crews_assigned: format_option(item.crews_assigned),
            snapshot_ref: item.snapshot_ref.clone().unwrap_or_default(),
        }
    }
}

impl BudgetItemCsvRecord {
    fn into_item(self) -> PersistenceResult<BudgetItem> {
        let mut item = BudgetItem::new(self.id, self.project_id, self.task_id, self.quantity);
        item.manual_duration_days = parse_option(&self.manual_duration_days, "integer")?;
        item.start_date = parse_date(&self.start_date)?;
        item.progress_percent = parse_option(&self.progress_percent, "float")?;
        item.crews_assigned = parse_option(&self.crews_assigned, "crew count")?;
        item.snapshot_ref = parse_string_option(self.snapshot_ref);
        Ok(item)
    }
}

pub fn save_items_to_csv<P: AsRef<Path>>(items: &[BudgetItem], path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for item in items {
        writer.serialize(BudgetItemCsvRecord::from(item))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads budget lines written by [`save_items_to_csv`].
pub fn load_items_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<BudgetItem>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut items = Vec::new();
    for record in reader.deserialize::<BudgetItemCsvRecord>() {
        items.push(record?.into_item()?);
    }
    if items.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no budget items".into(),
        ));
    }
    Ok(items)
}

#[derive(Serialize)]
struct ItemCostCsvRow<'a> {
    item_id: &'a str,
    task_id: &'a str,
    task_name: &'a str,
    category: &'a str,
    unit: &'a str,
    quantity: f64,
    material_unit_cost: f64,
    labor_unit_cost: f64,
    tool_unit_cost: f64,
    fixed_unit_cost: f64,
    total_unit_cost: f64,
    budget: f64,
    progress_percent: f64,
    start: String,
    duration_days: String,
    end: String,
}

pub fn export_item_costs_csv<P: AsRef<Path>>(items: &[ItemCost], path: P) -> PersistenceResult<()> {
    write_rows(
        path,
        items.iter().map(|item| ItemCostCsvRow {
            item_id: &item.item_id,
            task_id: &item.task_id,
            task_name: &item.task_name,
            category: &item.category,
            unit: &item.unit,
            quantity: item.quantity,
            material_unit_cost: item.unit_price.material_cost,
            labor_unit_cost: item.unit_price.labor_cost,
            tool_unit_cost: item.unit_price.tool_cost,
            fixed_unit_cost: item.unit_price.fixed_cost,
            total_unit_cost: item.unit_price.total_unit_cost,
            budget: item.budget(),
            progress_percent: item.progress * 100.0,
            start: format_date(Some(item.start)),
            duration_days: format_option(item.duration_days),
            end: format_date(item.end()),
        }),
    )
}

#[derive(Serialize)]
struct ParetoCsvRow<'a> {
    rank: usize,
    item_id: &'a str,
    task_id: &'a str,
    task_name: &'a str,
    cost: f64,
    percent: f64,
    cumulative_percent: f64,
    class: &'static str,
}

pub fn export_pareto_csv<P: AsRef<Path>>(report: &ParetoReport, path: P) -> PersistenceResult<()> {
    write_rows(
        path,
        report.ranked_items.iter().map(|row| ParetoCsvRow {
            rank: row.rank,
            item_id: &row.item_id,
            task_id: &row.task_id,
            task_name: &row.task_name,
            cost: row.cost,
            percent: row.percent,
            cumulative_percent: row.cumulative_percent,
            class: row.class.as_str(),
        }),
    )
}

#[derive(Serialize)]
struct SCurveCsvRow {
    bucket: usize,
    date: String,
    planned: f64,
    earned: String,
    actual: String,
}

pub fn export_s_curve_csv<P: AsRef<Path>>(points: &[SCurvePoint], path: P) -> PersistenceResult<()> {
    write_rows(
        path,
        points.iter().map(|point| SCurveCsvRow {
            bucket: point.index,
            date: format_date(Some(point.date)),
            planned: point.planned,
            earned: format_option(point.earned),
            actual: format_option(point.actual),
        }),
    )
}

pub fn export_frontier_csv<P: AsRef<Path>>(
    analysis: &CrashingAnalysis,
    path: P,
) -> PersistenceResult<()> {
    write_rows(path, analysis.frontier.iter())
}

pub fn export_requirements_csv<P: AsRef<Path>>(
    lines: &[MaterialRequirement],
    path: P,
) -> PersistenceResult<()> {
    write_rows(path, lines.iter())
}

fn write_rows<P, I, R>(path: P, rows: I) -> PersistenceResult<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = R>,
    R: Serialize,
{
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn format_option<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_option<T>(input: &str, what: &str) -> PersistenceResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid {what} '{input}': {e}")))
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
