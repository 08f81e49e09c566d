use estimate_tool::calculations::{CrashingScenario, simulate_crashing};
use estimate_tool::{
    BudgetItem, Catalog, CatalogIndexes, CrashingParameters, Material, MaterialUsage, Tool,
    ToolUsage,
};

mod common;
use common::task;

/// Per unit: 10 material, 100 labor, 2 tool. Ten units a day.
fn crashing_catalog(daily_yield: f64) -> CatalogIndexes {
    let mut catalog = Catalog::default();
    catalog.materials.push(Material::new("M1", "Blocks", 5.0));
    catalog.tools.push(Tool::new("K1", "Scaffold", 20.0));
    catalog.tasks.push(task("T1", "Block wall", daily_yield, 100.0));
    catalog.material_usage.push(MaterialUsage::new("T1", "M1", 2.0));
    catalog.tool_usage.push(ToolUsage::new("T1", "K1", 0.1));
    CatalogIndexes::build(&catalog)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn extra_crew_halves_duration_at_supervision_premium() {
    let indexes = crashing_catalog(10.0);
    let item = BudgetItem::new("I1", "P1", "T1", 100.0);
    let analysis = simulate_crashing(
        &item,
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::new(1, 0.0),
        &CrashingParameters::default(),
    );

    assert!(analysis.computable);
    assert_eq!(analysis.normal_duration, 10);
    assert!(approx(analysis.normal_cost, 11_200.0));
    assert_eq!(analysis.sim_duration, 5);
    // labor 10000 * 1.05, tools stay at the 200 baseline
    assert!(approx(analysis.sim_cost, 11_700.0));
    assert_eq!(analysis.days_saved, 5);
    assert!(approx(analysis.cost_increase, 500.0));
    assert!(approx(analysis.cost_slope, 100.0));
}

#[test]
fn overtime_applies_fatigue_and_premium() {
    let indexes = crashing_catalog(10.0);
    let item = BudgetItem::new("I1", "P1", "T1", 100.0);
    let analysis = simulate_crashing(
        &item,
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::new(0, 50.0),
        &CrashingParameters::default(),
    );

    // 10 * 1.4 * 0.9 = 12.6 units a day
    assert_eq!(analysis.sim_duration, 8);
    // 1000 material + 17500 labor + 20/day * 1.5 * 8 days tools
    assert!(approx(analysis.sim_cost, 18_740.0));
    assert_eq!(analysis.days_saved, 2);
    assert!(approx(analysis.cost_slope, (18_740.0 - 11_200.0) / 2.0));
}

#[test]
fn frontier_covers_every_combination_and_never_undercuts_normal_cost() {
    let indexes = crashing_catalog(10.0);
    let item = BudgetItem::new("I1", "P1", "T1", 100.0);
    let params = CrashingParameters::default();
    let analysis = simulate_crashing(
        &item,
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::default(),
        &params,
    );

    assert_eq!(analysis.frontier.len(), 12);
    assert_eq!(analysis.sim_duration, analysis.normal_duration);
    assert!(approx(analysis.sim_cost, analysis.normal_cost));
    assert_eq!(analysis.cost_slope, 0.0);
    for point in &analysis.frontier {
        assert!(
            point.cost >= analysis.normal_cost - 1e-9,
            "{point:?} is cheaper than normal"
        );
        assert!(point.duration_days <= analysis.normal_duration);
    }

    let efficient = analysis.efficient_frontier();
    assert!(!efficient.is_empty());
    assert_eq!(efficient.last().map(|p| p.duration_days), Some(10));
    for pair in efficient.windows(2) {
        assert!(pair[0].duration_days < pair[1].duration_days);
        assert!(pair[0].cost > pair[1].cost);
    }
}

#[test]
fn assigned_crews_are_the_base_for_crashing() {
    let indexes = crashing_catalog(10.0);
    let mut item = BudgetItem::new("I1", "P1", "T1", 100.0);
    item.crews_assigned = Some(2);
    let before = item.clone();

    let analysis = simulate_crashing(
        &item,
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::new(2, 0.0),
        &CrashingParameters::default(),
    );
    assert_eq!(analysis.normal_duration, 5);
    assert_eq!(analysis.sim_duration, 3);
    assert_eq!(item, before);
}

#[test]
fn out_of_range_scenario_is_normalised() {
    let indexes = crashing_catalog(10.0);
    let item = BudgetItem::new("I1", "P1", "T1", 100.0);
    let analysis = simulate_crashing(
        &item,
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::new(7, 80.0),
        &CrashingParameters::default(),
    );
    assert_eq!(analysis.scenario, CrashingScenario::new(3, 100.0));
    let selected = analysis
        .frontier
        .iter()
        .find(|p| p.extra_crews == 3 && p.overtime_percent == 100.0)
        .unwrap();
    assert_eq!(analysis.sim_duration, selected.duration_days);
    assert_eq!(analysis.sim_cost, selected.cost);
}

#[test]
fn zero_yield_is_not_computable() {
    let indexes = crashing_catalog(0.0);
    let item = BudgetItem::new("I1", "P1", "T1", 100.0);
    let analysis = simulate_crashing(
        &item,
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::new(1, 50.0),
        &CrashingParameters::default(),
    );
    assert!(!analysis.computable);
    assert!(analysis.frontier.is_empty());
    assert_eq!(analysis.normal_duration, 0);
    assert_eq!(analysis.sim_duration, 0);
    assert_eq!(analysis.sim_cost, analysis.normal_cost);
    assert_eq!(analysis.cost_slope, 0.0);
    assert!(analysis.sim_cost.is_finite());
}
