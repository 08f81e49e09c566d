use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::budget::{BudgetItem, MaterialReceipt, Project};
use crate::catalog::non_negative;
use crate::index::CatalogIndexes;

/// Bill-of-materials line for one material across a project budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub material_id: String,
    pub name: String,
    pub unit: String,
    /// Quantity needed by every item, waste included.
    pub required_quantity: f64,
    /// Quantity delivered on or before the cut-off date.
    pub received_quantity: f64,
    pub pending_quantity: f64,
    pub required_cost: f64,
    pub received_cost: f64,
}

#[derive(Default)]
struct Tally {
    required: f64,
    received: f64,
}

/// Aggregates material needs of the project's items against receipts up to `as_of`.
///
/// Lines are ordered by material id. Materials missing from the catalog are
/// left out, as are items of other projects and items with an unknown task.
pub fn material_requirements(
    project: &Project,
    items: &[BudgetItem],
    indexes: &CatalogIndexes,
    receipts: &[MaterialReceipt],
    as_of: NaiveDate,
) -> Vec<MaterialRequirement> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for item in items.iter().filter(|item| item.project_id == project.id) {
        if indexes.task(&item.task_id).is_none() {
            continue;
        }
        let quantity = item.normalized_quantity();
        for usage in indexes.material_usage(&item.task_id) {
            let Some(material) = indexes.material(&usage.material_id) else {
                continue;
            };
            tallies.entry(material.id.as_str()).or_default().required +=
                non_negative(usage.quantity) * quantity * material.waste_factor();
        }
    }

    for receipt in receipts.iter().filter(|receipt| receipt.date <= as_of) {
        let Some(material) = indexes.material(&receipt.material_id) else {
            continue;
        };
        tallies.entry(material.id.as_str()).or_default().received +=
            non_negative(receipt.quantity_received);
    }

    tallies
        .into_iter()
        .filter_map(|(material_id, tally)| {
            let material = indexes.material(material_id)?;
            let unit_cost = non_negative(material.unit_cost);
            Some(MaterialRequirement {
                material_id: material.id.clone(),
                name: material.name.clone(),
                unit: material.unit.clone(),
                required_quantity: tally.required,
                received_quantity: tally.received,
                pending_quantity: (tally.required - tally.received).max(0.0),
                required_cost: tally.required * unit_cost,
                received_cost: tally.received * unit_cost,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Material, MaterialUsage, Task};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn requirements_include_waste_and_late_receipts_are_ignored() {
        let mut catalog = Catalog::default();
        let mut cement = Material::new("M1", "Cement", 10.0);
        cement.waste_percent = Some(10.0);
        catalog.materials.push(cement);
        catalog.tasks.push(Task::new("T1", "Slab", 5.0));
        catalog.material_usage.push(MaterialUsage::new("T1", "M1", 2.0));
        let indexes = CatalogIndexes::build(&catalog);

        let project = Project::new("P1", "House", d(2025, 1, 1));
        let items = vec![BudgetItem::new("I1", "P1", "T1", 10.0)];
        let receipts = vec![
            MaterialReceipt::new("R1", "M1", d(2025, 1, 5), 15.0),
            MaterialReceipt::new("R2", "M1", d(2025, 3, 1), 50.0),
        ];

        let lines = material_requirements(&project, &items, &indexes, &receipts, d(2025, 2, 1));
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!((line.required_quantity - 22.0).abs() < 1e-9);
        assert_eq!(line.received_quantity, 15.0);
        assert!((line.pending_quantity - 7.0).abs() < 1e-9);
        assert!((line.required_cost - 220.0).abs() < 1e-9);
        assert_eq!(line.received_cost, 150.0);
    }
}
