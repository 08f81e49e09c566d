use estimate_tool::{Catalog, CatalogIndexes, CrewUsage, Material, MaterialUsage, Tool, ToolUsage};

mod common;
use common::task;

#[test]
fn usage_records_are_grouped_by_task_in_source_order() {
    let mut catalog = Catalog::default();
    catalog.tasks.push(task("T1", "Wall", 8.0, 0.0));
    catalog.tasks.push(task("T2", "Floor", 8.0, 0.0));
    catalog.material_usage.push(MaterialUsage::new("T1", "M1", 1.0));
    catalog.material_usage.push(MaterialUsage::new("T2", "M1", 3.0));
    catalog.material_usage.push(MaterialUsage::new("T1", "M2", 2.0));
    catalog.tool_usage.push(ToolUsage::new("T2", "K1", 0.25));
    catalog.crew_usage.push(CrewUsage::new("T1", "C1", 1.5));

    let indexes = CatalogIndexes::build(&catalog);

    let t1: Vec<&str> = indexes
        .material_usage("T1")
        .iter()
        .map(|u| u.material_id.as_str())
        .collect();
    assert_eq!(t1, vec!["M1", "M2"]);
    assert_eq!(indexes.material_usage("T2").len(), 1);
    assert!(indexes.tool_usage("T1").is_empty());
    assert_eq!(indexes.tool_usage("T2")[0].hours_per_unit, 0.25);
    assert_eq!(indexes.crew_usage("T1")[0].crew_id, "C1");
    assert!(indexes.task("T2").is_some());
}

#[test]
fn rebuilding_drops_removed_ids() {
    let mut catalog = Catalog::default();
    catalog.materials.push(Material::new("M1", "Cement", 10.0));
    catalog.tools.push(Tool::new("K1", "Mixer", 20.0));
    let before = CatalogIndexes::build(&catalog);
    assert!(before.material("M1").is_some());

    catalog.materials.clear();
    let after = CatalogIndexes::build(&catalog);
    assert!(after.material("M1").is_none());
    assert!(after.tool("K1").is_some());
}

#[test]
fn building_twice_gives_the_same_lookups() {
    let snapshot = common::sample_snapshot();
    let first = CatalogIndexes::build(&snapshot.catalog);
    let second = CatalogIndexes::build(&snapshot.catalog);
    assert_eq!(first.materials(), second.materials());
    assert_eq!(first.material_usage_index(), second.material_usage_index());
    assert_eq!(first.task("T2"), second.task("T2"));
}
