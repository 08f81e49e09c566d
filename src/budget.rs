use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::non_negative;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Default start for budget items without their own start date.
    pub start_date: NaiveDate,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: "project".to_string(),
            name: "New Project".to_string(),
            description: "No description".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            start_date,
        }
    }
}

/// A quantity of one task attached to a project budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: String,
    pub project_id: String,
    pub task_id: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_duration_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Physical progress, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crews_assigned: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_ref: Option<String>,
}

impl BudgetItem {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        task_id: impl Into<String>,
        quantity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            task_id: task_id.into(),
            quantity,
            manual_duration_days: None,
            start_date: None,
            progress_percent: None,
            crews_assigned: None,
            snapshot_ref: None,
        }
    }

    /// Quantity with negative and non-finite values clamped to zero.
    pub fn normalized_quantity(&self) -> f64 {
        non_negative(self.quantity)
    }

    /// Progress as a fraction in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        self.progress_percent
            .filter(|pct| pct.is_finite())
            .map(|pct| pct.clamp(0.0, 100.0) / 100.0)
            .unwrap_or(0.0)
    }

    /// Crews working the item; unset or zero means one crew.
    pub fn crew_count(&self) -> u32 {
        self.crews_assigned.unwrap_or(1).max(1)
    }

    pub fn start_or(&self, project_start: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(project_start)
    }
}

/// A real material delivery recorded on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialReceipt {
    pub id: String,
    pub material_id: String,
    pub date: NaiveDate,
    pub quantity_received: f64,
}

impl MaterialReceipt {
    pub fn new(
        id: impl Into<String>,
        material_id: impl Into<String>,
        date: NaiveDate,
        quantity_received: f64,
    ) -> Self {
        Self {
            id: id.into(),
            material_id: material_id.into(),
            date,
            quantity_received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> BudgetItem {
        BudgetItem::new("B1", "P1", "T1", 10.0)
    }

    #[test]
    fn progress_is_clamped_to_percent_range() {
        let mut b = item();
        b.progress_percent = Some(140.0);
        assert_eq!(b.progress_fraction(), 1.0);
        b.progress_percent = Some(-5.0);
        assert_eq!(b.progress_fraction(), 0.0);
        b.progress_percent = Some(f64::NAN);
        assert_eq!(b.progress_fraction(), 0.0);
        b.progress_percent = None;
        assert_eq!(b.progress_fraction(), 0.0);
    }

    #[test]
    fn negative_quantity_normalizes_to_zero() {
        let mut b = item();
        b.quantity = -3.0;
        assert_eq!(b.normalized_quantity(), 0.0);
    }

    #[test]
    fn zero_crews_means_one() {
        let mut b = item();
        b.crews_assigned = Some(0);
        assert_eq!(b.crew_count(), 1);
        b.crews_assigned = Some(3);
        assert_eq!(b.crew_count(), 3);
    }
}
