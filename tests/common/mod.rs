#![allow(dead_code)]

use chrono::NaiveDate;
use estimate_tool::{
    BudgetItem, Catalog, Crew, CrewMember, EstimateSnapshot, LaborCategory, Material,
    MaterialUsage, Project, Task, Tool, ToolUsage,
};

pub fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn task(id: &str, name: &str, daily_yield: f64, labor_cost: f64) -> Task {
    let mut task = Task::new(id, name, daily_yield);
    task.labor_cost = labor_cost;
    task
}

/// Small house estimate used across the integration tests.
///
/// T1 costs 100 per unit (labor only), T2 costs 57 per unit
/// (22 material, 20 labor, 10 tool, 5 fixed), T3 has no daily yield.
pub fn sample_snapshot() -> EstimateSnapshot {
    let mut catalog = Catalog::default();

    let mut cement = Material::new("M1", "Cement", 10.0);
    cement.unit = "bag".into();
    cement.waste_percent = Some(10.0);
    catalog.materials.push(cement);
    catalog.tools.push(Tool::new("K1", "Mixer", 20.0));
    catalog
        .labor_categories
        .push(LaborCategory::new("L1", "Mason", 10.0));
    catalog.crews.push(Crew::new("C1", "Masonry crew").with_member(CrewMember::new("L1", 1.0)));

    let mut masonry = task("T1", "Masonry", 10.0, 100.0);
    masonry.category = "Structure".into();
    masonry.unit = "m2".into();
    catalog.tasks.push(masonry);

    let mut slab = task("T2", "Concrete slab", 4.0, 20.0);
    slab.category = "Structure".into();
    slab.unit = "m3".into();
    slab.fixed_cost = Some(5.0);
    catalog.tasks.push(slab);
    catalog.material_usage.push(MaterialUsage::new("T2", "M1", 2.0));
    catalog.tool_usage.push(ToolUsage::new("T2", "K1", 0.5));

    let mut plaster = task("T3", "Plaster", 0.0, 8.0);
    plaster.category = "Finishes".into();
    catalog.tasks.push(plaster);

    let mut snapshot = EstimateSnapshot::new(Project::new("P1", "Sample House", d(2025, 1, 6)));
    snapshot.catalog = catalog;
    snapshot.items.push(BudgetItem::new("I1", "P1", "T1", 50.0));
    snapshot.items.push(BudgetItem::new("I2", "P1", "T2", 5.0));
    snapshot
}
