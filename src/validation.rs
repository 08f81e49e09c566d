use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::snapshot::EstimateSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Material,
    Tool,
    LaborCategory,
    Crew,
    Task,
    BudgetItem,
    Receipt,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Material => "material",
            RecordKind::Tool => "tool",
            RecordKind::LaborCategory => "labor category",
            RecordKind::Crew => "crew",
            RecordKind::Task => "task",
            RecordKind::BudgetItem => "budget item",
            RecordKind::Receipt => "receipt",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal catalog problem. The engine still runs; the affected
/// reference simply contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum CatalogIssue {
    DuplicateId {
        kind: RecordKind,
        id: String,
    },
    DanglingReference {
        owner: RecordKind,
        owner_id: String,
        target: RecordKind,
        target_id: String,
    },
    NegativeValue {
        kind: RecordKind,
        id: String,
        field: String,
        value: f64,
    },
    EmptyCrew {
        crew_id: String,
    },
    MissingYield {
        task_id: String,
    },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::DuplicateId { kind, id } => write!(f, "duplicate {kind} id {id}"),
            CatalogIssue::DanglingReference {
                owner,
                owner_id,
                target,
                target_id,
            } => write!(f, "{owner} {owner_id} references unknown {target} {target_id}"),
            CatalogIssue::NegativeValue {
                kind,
                id,
                field,
                value,
            } => write!(f, "{kind} {id} has invalid {field} {value}"),
            CatalogIssue::EmptyCrew { crew_id } => write!(f, "crew {crew_id} has no members"),
            CatalogIssue::MissingYield { task_id } => {
                write!(f, "task {task_id} has no daily yield and cannot be scheduled")
            }
        }
    }
}

/// Lists everything in `catalog` that will silently degrade a calculation.
pub fn audit_catalog(catalog: &Catalog) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();

    let materials = collect_ids(&catalog.materials, |m| &m.id, RecordKind::Material, &mut issues);
    let tools = collect_ids(&catalog.tools, |t| &t.id, RecordKind::Tool, &mut issues);
    let labor = collect_ids(
        &catalog.labor_categories,
        |l| &l.id,
        RecordKind::LaborCategory,
        &mut issues,
    );
    let crews = collect_ids(&catalog.crews, |c| &c.id, RecordKind::Crew, &mut issues);
    let tasks = collect_ids(&catalog.tasks, |t| &t.id, RecordKind::Task, &mut issues);

    for material in &catalog.materials {
        check_value(&mut issues, RecordKind::Material, &material.id, "unit_cost", material.unit_cost);
        if let Some(waste) = material.waste_percent {
            check_value(&mut issues, RecordKind::Material, &material.id, "waste_percent", waste);
        }
    }
    for tool in &catalog.tools {
        check_value(&mut issues, RecordKind::Tool, &tool.id, "cost_per_hour", tool.cost_per_hour);
    }
    for category in &catalog.labor_categories {
        let kind = RecordKind::LaborCategory;
        check_value(&mut issues, kind, &category.id, "basic_hourly_rate", category.basic_hourly_rate);
        check_value(
            &mut issues,
            kind,
            &category.id,
            "social_charges_percent",
            category.social_charges_percent,
        );
        check_value(&mut issues, kind, &category.id, "insurance_percent", category.insurance_percent);
    }
    for crew in &catalog.crews {
        if crew.composition.is_empty() {
            issues.push(CatalogIssue::EmptyCrew {
                crew_id: crew.id.clone(),
            });
        }
        for member in &crew.composition {
            if !labor.contains(member.labor_category_id.as_str()) {
                issues.push(dangling(
                    RecordKind::Crew,
                    &crew.id,
                    RecordKind::LaborCategory,
                    &member.labor_category_id,
                ));
            }
            check_value(&mut issues, RecordKind::Crew, &crew.id, "headcount", member.headcount);
        }
    }
    for task in &catalog.tasks {
        check_value(&mut issues, RecordKind::Task, &task.id, "labor_cost", task.labor_cost);
        if let Some(fixed) = task.fixed_cost {
            check_value(&mut issues, RecordKind::Task, &task.id, "fixed_cost", fixed);
        }
        if task.schedulable_yield().is_none() {
            issues.push(CatalogIssue::MissingYield {
                task_id: task.id.clone(),
            });
        }
    }

    for usage in &catalog.material_usage {
        if !tasks.contains(usage.task_id.as_str()) {
            issues.push(dangling(RecordKind::Material, &usage.material_id, RecordKind::Task, &usage.task_id));
        }
        if !materials.contains(usage.material_id.as_str()) {
            issues.push(dangling(RecordKind::Task, &usage.task_id, RecordKind::Material, &usage.material_id));
        }
    }
    for usage in &catalog.tool_usage {
        if !tasks.contains(usage.task_id.as_str()) {
            issues.push(dangling(RecordKind::Tool, &usage.tool_id, RecordKind::Task, &usage.task_id));
        }
        if !tools.contains(usage.tool_id.as_str()) {
            issues.push(dangling(RecordKind::Task, &usage.task_id, RecordKind::Tool, &usage.tool_id));
        }
    }
    for usage in &catalog.crew_usage {
        if !tasks.contains(usage.task_id.as_str()) {
            issues.push(dangling(RecordKind::Crew, &usage.crew_id, RecordKind::Task, &usage.task_id));
        }
        if !crews.contains(usage.crew_id.as_str()) {
            issues.push(dangling(RecordKind::Task, &usage.task_id, RecordKind::Crew, &usage.crew_id));
        }
    }

    issues
}

fn collect_ids<'a, T>(
    records: &'a [T],
    id: impl Fn(&T) -> &String,
    kind: RecordKind,
    issues: &mut Vec<CatalogIssue>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let record_id = id(record);
        if !seen.insert(record_id.as_str()) {
            issues.push(CatalogIssue::DuplicateId {
                kind,
                id: record_id.clone(),
            });
        }
    }
    seen
}

fn check_value(issues: &mut Vec<CatalogIssue>, kind: RecordKind, id: &str, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        issues.push(CatalogIssue::NegativeValue {
            kind,
            id: id.to_string(),
            field: field.to_string(),
            value,
        });
    }
}

fn dangling(owner: RecordKind, owner_id: &str, target: RecordKind, target_id: &str) -> CatalogIssue {
    CatalogIssue::DanglingReference {
        owner,
        owner_id: owner_id.to_string(),
        target,
        target_id: target_id.to_string(),
    }
}

/// A structural problem that makes a snapshot unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum SnapshotIssue {
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: RecordKind, id: String },
    #[error("budget item {item_id} belongs to project {found}, expected {expected}")]
    ForeignItem {
        item_id: String,
        found: String,
        expected: String,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("snapshot is invalid: {}", describe(.issues))]
pub struct SnapshotValidationError {
    pub issues: Vec<SnapshotIssue>,
}

fn describe(issues: &[SnapshotIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rejects duplicate ids and budget items that belong to another project.
pub fn validate_snapshot(snapshot: &EstimateSnapshot) -> Result<(), SnapshotValidationError> {
    let catalog = &snapshot.catalog;
    let mut issues = Vec::new();

    duplicate_ids(&catalog.materials, |m| &m.id, RecordKind::Material, &mut issues);
    duplicate_ids(&catalog.tools, |t| &t.id, RecordKind::Tool, &mut issues);
    duplicate_ids(&catalog.labor_categories, |l| &l.id, RecordKind::LaborCategory, &mut issues);
    duplicate_ids(&catalog.crews, |c| &c.id, RecordKind::Crew, &mut issues);
    duplicate_ids(&catalog.tasks, |t| &t.id, RecordKind::Task, &mut issues);
    duplicate_ids(&snapshot.items, |i| &i.id, RecordKind::BudgetItem, &mut issues);
    duplicate_ids(&snapshot.receipts, |r| &r.id, RecordKind::Receipt, &mut issues);

    for item in &snapshot.items {
        if item.project_id != snapshot.project.id {
            issues.push(SnapshotIssue::ForeignItem {
                item_id: item.id.clone(),
                found: item.project_id.clone(),
                expected: snapshot.project.id.clone(),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(SnapshotValidationError { issues })
    }
}

fn duplicate_ids<T>(
    records: &[T],
    id: impl Fn(&T) -> &String,
    kind: RecordKind,
    issues: &mut Vec<SnapshotIssue>,
) {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let record_id = id(record);
        if !seen.insert(record_id.as_str()) {
            issues.push(SnapshotIssue::DuplicateId {
                kind,
                id: record_id.clone(),
            });
        }
    }
}
