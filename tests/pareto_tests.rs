use estimate_tool::calculations::{CostClass, classify_pareto};
use estimate_tool::{BudgetItem, Catalog, CatalogIndexes, Project, ScheduleParameters};

mod common;
use common::{d, task};

fn priced_catalog(costs: &[(&str, f64)]) -> CatalogIndexes {
    let mut catalog = Catalog::default();
    for (id, cost) in costs {
        catalog.tasks.push(task(id, id, 1.0, *cost));
    }
    CatalogIndexes::build(&catalog)
}

#[test]
fn eighty_fifteen_five_split_classifies_a_b_c() {
    let indexes = priced_catalog(&[("small", 50.0), ("big", 800.0), ("mid", 150.0)]);
    let project = Project::new("P1", "House", d(2025, 1, 6));
    let items = vec![
        BudgetItem::new("I1", "P1", "small", 1.0),
        BudgetItem::new("I2", "P1", "big", 1.0),
        BudgetItem::new("I3", "P1", "mid", 1.0),
    ];

    let report = classify_pareto(&project, &items, &indexes, &ScheduleParameters::default());
    assert_eq!(report.total_cost, 1000.0);

    let ranked: Vec<(&str, f64, CostClass)> = report
        .ranked_items
        .iter()
        .map(|r| (r.item_id.as_str(), r.cumulative_percent, r.class))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("I2", 80.0, CostClass::A),
            ("I3", 95.0, CostClass::B),
            ("I1", 100.0, CostClass::C),
        ]
    );
    assert_eq!(report.ranked_items[0].rank, 1);
    assert_eq!(report.ranked_items[1].percent, 15.0);

    assert_eq!(report.class_stats.a.count, 1);
    assert_eq!(report.class_stats.a.cost, 800.0);
    assert_eq!(report.class_stats.b.cost_percent, 15.0);
    assert!((report.class_stats.c.count_percent - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn classification_is_monotonic_and_class_costs_sum_to_total() {
    let costs = [
        ("t1", 420.0),
        ("t2", 12.5),
        ("t3", 97.0),
        ("t4", 230.0),
        ("t5", 3.0),
        ("t6", 77.7),
        ("t7", 160.0),
    ];
    let indexes = priced_catalog(&costs);
    let project = Project::new("P1", "House", d(2025, 1, 6));
    let items: Vec<BudgetItem> = costs
        .iter()
        .enumerate()
        .map(|(i, (id, _))| BudgetItem::new(format!("I{i}"), "P1", *id, 2.0))
        .collect();

    let report = classify_pareto(&project, &items, &indexes, &ScheduleParameters::default());

    for pair in report.ranked_items.windows(2) {
        assert!(pair[0].cost >= pair[1].cost);
        assert!(pair[0].cumulative_percent <= pair[1].cumulative_percent);
    }
    for row in &report.ranked_items {
        match row.class {
            CostClass::A => assert!(row.cumulative_percent <= 80.0 + 1e-9),
            CostClass::B => assert!(row.cumulative_percent <= 95.0 + 1e-9),
            CostClass::C => assert!(row.cumulative_percent > 95.0),
        }
    }
    let stats = &report.class_stats;
    let class_total = stats.a.cost + stats.b.cost + stats.c.cost;
    assert!((class_total - report.total_cost).abs() < 1e-9);
    assert_eq!(stats.a.count + stats.b.count + stats.c.count, items.len());
}

#[test]
fn zero_cost_project_puts_everything_in_class_c() {
    let indexes = priced_catalog(&[("free", 0.0)]);
    let project = Project::new("P1", "House", d(2025, 1, 6));
    let items = vec![
        BudgetItem::new("I1", "P1", "free", 3.0),
        BudgetItem::new("I2", "P1", "free", 1.0),
    ];

    let report = classify_pareto(&project, &items, &indexes, &ScheduleParameters::default());
    assert_eq!(report.total_cost, 0.0);
    assert!(
        report
            .ranked_items
            .iter()
            .all(|r| r.class == CostClass::C && r.cumulative_percent == 100.0)
    );
    assert_eq!(report.class_stats.c.count, 2);
    assert_eq!(report.class_stats.c.cost_percent, 0.0);
}
