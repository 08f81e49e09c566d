use chrono::NaiveDate;
use estimate_tool::calculations::{
    CrashingScenario, analyze_unit_price_with, classify_pareto, compare_with_standard,
    cost_items, material_requirements, roll_up_project, simulate_crashing_with,
};
use estimate_tool::persistence::{
    export_item_costs_csv, export_pareto_csv, export_requirements_csv, export_s_curve_csv,
    load_items_from_csv, save_items_to_csv,
};
use estimate_tool::report::{
    evm_summary_frame, frontier_frame, item_costs_frame, pareto_frame, requirements_frame,
    s_curve_frame,
};
use estimate_tool::{
    BudgetItem, EngineConfig, EstimateSnapshot, MaterialReceipt, PersistenceError, audit_catalog,
    load_snapshot_from_json, save_snapshot_to_json,
};
use polars::prelude::{AnyValue, DataFrame, PolarsResult};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn format_cell(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        cells.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| format_cell(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_table(df: PolarsResult<DataFrame>) {
    match df {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error building table: {}", PersistenceError::from(e)),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show priced budget items\n  project                            Show project details\n  config                             Show engine parameters\n  item <id> <task_id> <quantity>     Upsert a budget item\n  progress <item_id> <percent>       Set physical progress (0-100)\n  crews <item_id> <count>            Set crews assigned to an item\n  start <item_id> <YYYY-MM-DD>       Set item start date\n  delete <item_id>                   Delete a budget item\n  receipt <id> <material_id> <YYYY-MM-DD> <quantity>\n                                     Record a material delivery\n  apu <task_id>                      Unit price breakdown of a task\n  compare <task_id>                  Compare a task with its standard yields\n  evm [YYYY-MM-DD]                   Earned value metrics (default today)\n  scurve [YYYY-MM-DD]                Planned/earned/actual S-curve\n  pareto                             ABC classification of budget items\n  crash <item_id> <extra_crews> <overtime_pct>\n                                     Time-cost trade-off for an item\n  requirements [YYYY-MM-DD]          Material requirements and receipts\n  audit                              List catalog issues\n  export <items|pareto|scurve|requirements> <path> [YYYY-MM-DD]\n                                     Write a report table as CSV\n  save <json|csv> <path>             Persist snapshot (csv: budget items only)\n  load <json|csv> <path>             Load snapshot (csv: budget items only)\n  quit|exit                          Exit"
    );
}

fn print_project(snapshot: &EstimateSnapshot) {
    let project = &snapshot.project;
    println!("Project id         : {}", project.id);
    println!("Project name       : {}", project.name);
    println!("Project description: {}", project.description);
    println!("Project start date : {}", project.start_date);
    println!(
        "Catalog            : {} tasks, {} materials, {} crews",
        snapshot.catalog.tasks.len(),
        snapshot.catalog.materials.len(),
        snapshot.catalog.crews.len()
    );
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Optional date argument; today when absent.
fn as_of_arg(arg: Option<&str>) -> Option<NaiveDate> {
    match arg {
        Some(s) => parse_date(s),
        None => Some(chrono::Local::now().date_naive()),
    }
}

fn show_items(snapshot: &EstimateSnapshot, config: &EngineConfig) {
    let indexes = snapshot.indexes();
    let costed = cost_items(&snapshot.project, &snapshot.items, &indexes, &config.schedule);
    print_table(item_costs_frame(&costed.items));
    if !costed.skipped.is_empty() {
        println!("Skipped (unknown task): {}", costed.skipped.join(", "));
    }
}

fn with_item(
    snapshot: &mut EstimateSnapshot,
    item_id: &str,
    update: impl FnOnce(&mut BudgetItem),
) -> bool {
    match snapshot.items.iter_mut().find(|item| item.id == item_id) {
        Some(item) => {
            update(item);
            true
        }
        None => false,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default engine configuration");
            EngineConfig::default()
        }
    };
    let mut snapshot = EstimateSnapshot::default();

    println!("Estimate Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show_items(&snapshot, &config),
            "project" => print_project(&snapshot),
            "config" => match serde_json::to_string_pretty(&config) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("Error serializing config: {}", e),
            },
            "item" => {
                let id = parts.next();
                let task_id = parts.next();
                let qty = parts.next();
                match (id, task_id, qty) {
                    (Some(id), Some(task_id), Some(qty_s)) => {
                        let quantity: f64 = match qty_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid quantity");
                                continue;
                            }
                        };
                        let project_id = snapshot.project.id.clone();
                        let updated = with_item(&mut snapshot, id, |item| {
                            item.task_id = task_id.to_string();
                            item.quantity = quantity;
                        });
                        if !updated {
                            snapshot
                                .items
                                .push(BudgetItem::new(id, project_id, task_id, quantity));
                        }
                        println!("Item {id} upserted.");
                        show_items(&snapshot, &config);
                    }
                    _ => println!("Usage: item <id> <task_id> <quantity>"),
                }
            }
            "progress" | "crews" | "start" => {
                let id = parts.next();
                let value = parts.next();
                let (Some(id), Some(value)) = (id, value) else {
                    let arg = match cmd {
                        "progress" => "<percent>",
                        "crews" => "<count>",
                        _ => "<YYYY-MM-DD>",
                    };
                    println!("Usage: {} <item_id> {}", cmd, arg);
                    continue;
                };
                let found = match cmd {
                    "progress" => match value.parse::<f64>() {
                        Ok(pct) => with_item(&mut snapshot, id, |item| {
                            item.progress_percent = Some(pct.clamp(0.0, 100.0))
                        }),
                        Err(_) => {
                            println!("Invalid float");
                            continue;
                        }
                    },
                    "crews" => match value.parse::<u32>() {
                        Ok(count) => {
                            with_item(&mut snapshot, id, |item| item.crews_assigned = Some(count))
                        }
                        Err(_) => {
                            println!("Invalid crew count");
                            continue;
                        }
                    },
                    _ => match parse_date(value) {
                        Some(date) => {
                            with_item(&mut snapshot, id, |item| item.start_date = Some(date))
                        }
                        None => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    },
                };
                if found {
                    println!("{} set for item {}.", cmd, id);
                } else {
                    println!("Item {id} not found.");
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    let before = snapshot.items.len();
                    snapshot.items.retain(|item| item.id != id);
                    if snapshot.items.len() < before {
                        println!("Deleted item {id}.");
                    } else {
                        println!("Item {id} not found.");
                    }
                }
                None => println!("Usage: delete <item_id>"),
            },
            "receipt" => {
                let id = parts.next();
                let material_id = parts.next();
                let date = parts.next().and_then(parse_date);
                let qty = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (id, material_id, date, qty) {
                    (Some(id), Some(material_id), Some(date), Some(qty)) => {
                        snapshot
                            .receipts
                            .push(MaterialReceipt::new(id, material_id, date, qty));
                        println!("Receipt {id} recorded.");
                    }
                    _ => println!("Usage: receipt <id> <material_id> <YYYY-MM-DD> <quantity>"),
                }
            }
            "apu" => match parts.next() {
                Some(task_id) => {
                    let indexes = snapshot.indexes();
                    match indexes.task(task_id) {
                        Some(task) => {
                            let apu = analyze_unit_price_with(task, &indexes, &config.schedule);
                            println!("Unit price of {} ({}):", task.id, task.name);
                            println!("  material : {:.2}", apu.material_cost);
                            println!("  labor    : {:.2}", apu.labor_cost);
                            println!("  tool     : {:.2}", apu.tool_cost);
                            println!("  fixed    : {:.2}", apu.fixed_cost);
                            println!("  total    : {:.2}", apu.total_unit_cost);
                        }
                        None => println!("Task {task_id} not found."),
                    }
                }
                None => println!("Usage: apu <task_id>"),
            },
            "compare" => match parts.next() {
                Some(task_id) => {
                    let indexes = snapshot.indexes();
                    let comparison = indexes
                        .task(task_id)
                        .map(|task| compare_with_standard(task, &indexes, &config.schedule));
                    match comparison {
                        Some(Some(cmp)) => {
                            println!("{:<10}{:>12}{:>12}{:>12}", "", "actual", "standard", "delta");
                            let rows = [
                                ("material", cmp.actual.material_cost, cmp.standard.material_cost, cmp.delta.material_cost),
                                ("labor", cmp.actual.labor_cost, cmp.standard.labor_cost, cmp.delta.labor_cost),
                                ("tool", cmp.actual.tool_cost, cmp.standard.tool_cost, cmp.delta.tool_cost),
                                ("fixed", cmp.actual.fixed_cost, cmp.standard.fixed_cost, cmp.delta.fixed_cost),
                                ("total", cmp.actual.total_unit_cost, cmp.standard.total_unit_cost, cmp.delta.total_unit_cost),
                            ];
                            for (name, actual, standard, delta) in rows {
                                println!("{name:<10}{actual:>12.2}{standard:>12.2}{delta:>12.2}");
                            }
                            println!("Deviation: {:.1}%", cmp.total_deviation_percent());
                        }
                        Some(None) => println!("Task {task_id} has no standard yields."),
                        None => println!("Task {task_id} not found."),
                    }
                }
                None => println!("Usage: compare <task_id>"),
            },
            "evm" | "scurve" => {
                let Some(as_of) = as_of_arg(parts.next()) else {
                    println!("Invalid date (YYYY-MM-DD)");
                    continue;
                };
                let indexes = snapshot.indexes();
                let report = roll_up_project(
                    &snapshot.project,
                    &snapshot.items,
                    &indexes,
                    &snapshot.receipts,
                    as_of,
                    &config.schedule,
                );
                if cmd == "evm" {
                    println!("EVM as of {} ({})", as_of, report.to_cli_summary());
                    print_table(evm_summary_frame(&report));
                    if !report.unscheduled_items.is_empty() {
                        println!(
                            "Unscheduled (no daily yield): {}",
                            report.unscheduled_items.join(", ")
                        );
                    }
                } else {
                    print_table(s_curve_frame(&report.s_curve));
                }
            }
            "pareto" => {
                let indexes = snapshot.indexes();
                let report =
                    classify_pareto(&snapshot.project, &snapshot.items, &indexes, &config.schedule);
                print_table(pareto_frame(&report));
                for (label, stats) in [
                    ("A", &report.class_stats.a),
                    ("B", &report.class_stats.b),
                    ("C", &report.class_stats.c),
                ] {
                    println!(
                        "Class {}: {} items ({:.1}%), cost {:.2} ({:.1}%)",
                        label, stats.count, stats.count_percent, stats.cost, stats.cost_percent
                    );
                }
            }
            "crash" => {
                let id = parts.next();
                let extra = parts.next().and_then(|s| s.parse::<u32>().ok());
                let overtime = parts.next().and_then(|s| s.parse::<f64>().ok());
                let (Some(id), Some(extra), Some(overtime)) = (id, extra, overtime) else {
                    println!("Usage: crash <item_id> <extra_crews> <overtime_pct>");
                    continue;
                };
                let indexes = snapshot.indexes();
                let Some(item) = snapshot.item(id) else {
                    println!("Item {id} not found.");
                    continue;
                };
                let Some(task) = indexes.task(&item.task_id) else {
                    println!("Task {} not found.", item.task_id);
                    continue;
                };
                let analysis = simulate_crashing_with(
                    item,
                    task,
                    &indexes,
                    CrashingScenario::new(extra, overtime),
                    &config.crashing,
                    &config.schedule,
                );
                if !analysis.computable {
                    println!("Crashing not computable: task {} has no daily yield.", task.id);
                    continue;
                }
                println!(
                    "Scenario +{} crews, {}% overtime: {} -> {} days, cost {:.2} -> {:.2} (slope {:.2}/day)",
                    analysis.scenario.added_crews,
                    analysis.scenario.overtime_percent,
                    analysis.normal_duration,
                    analysis.sim_duration,
                    analysis.normal_cost,
                    analysis.sim_cost,
                    analysis.cost_slope
                );
                print_table(frontier_frame(&analysis));
            }
            "requirements" => {
                let Some(as_of) = as_of_arg(parts.next()) else {
                    println!("Invalid date (YYYY-MM-DD)");
                    continue;
                };
                let indexes = snapshot.indexes();
                let lines = material_requirements(
                    &snapshot.project,
                    &snapshot.items,
                    &indexes,
                    &snapshot.receipts,
                    as_of,
                );
                print_table(requirements_frame(&lines));
            }
            "audit" => {
                let issues = audit_catalog(&snapshot.catalog);
                if issues.is_empty() {
                    println!("Catalog has no issues.");
                } else {
                    for issue in issues {
                        println!("- {issue}");
                    }
                }
            }
            "export" => {
                let kind = parts.next();
                let path = parts.next();
                let Some(as_of) = as_of_arg(parts.next()) else {
                    println!("Invalid date (YYYY-MM-DD)");
                    continue;
                };
                let indexes = snapshot.indexes();
                let project = &snapshot.project;
                let result = match (kind, path) {
                    (Some("items"), Some(path)) => {
                        let costed = cost_items(project, &snapshot.items, &indexes, &config.schedule);
                        export_item_costs_csv(&costed.items, path)
                    }
                    (Some("pareto"), Some(path)) => export_pareto_csv(
                        &classify_pareto(project, &snapshot.items, &indexes, &config.schedule),
                        path,
                    ),
                    (Some("scurve"), Some(path)) => {
                        let report = roll_up_project(
                            project,
                            &snapshot.items,
                            &indexes,
                            &snapshot.receipts,
                            as_of,
                            &config.schedule,
                        );
                        export_s_curve_csv(&report.s_curve, path)
                    }
                    (Some("requirements"), Some(path)) => export_requirements_csv(
                        &material_requirements(
                            project,
                            &snapshot.items,
                            &indexes,
                            &snapshot.receipts,
                            as_of,
                        ),
                        path,
                    ),
                    _ => {
                        println!(
                            "Usage: export <items|pareto|scurve|requirements> <path> [YYYY-MM-DD]"
                        );
                        continue;
                    }
                };
                match result {
                    Ok(_) => println!("Report exported to {}.", path.unwrap_or_default()),
                    Err(e) => println!("Error exporting report: {}", e),
                }
            }
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_snapshot_to_json(&snapshot, path) {
                        Ok(_) => println!("Snapshot saved to {}.", path),
                        Err(e) => println!("Error saving snapshot: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_items_to_csv(&snapshot.items, path) {
                        Ok(_) => println!("Budget items saved to {}.", path),
                        Err(e) => println!("Error saving budget items: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_snapshot_from_json(path) {
                        Ok(loaded) => {
                            snapshot = loaded;
                            println!("Snapshot loaded from {}.", path);
                            print_project(&snapshot);
                        }
                        Err(e) => println!("Error loading snapshot: {}", e),
                    },
                    (Some("csv"), Some(path)) => match load_items_from_csv(path) {
                        Ok(items) => {
                            let mut candidate = snapshot.clone();
                            candidate.items = items;
                            match candidate.validate() {
                                Ok(()) => {
                                    snapshot = candidate;
                                    println!("Budget items loaded from {}.", path);
                                    show_items(&snapshot, &config);
                                }
                                Err(e) => println!("Error loading budget items: {}", e),
                            }
                        }
                        Err(e) => println!("Error loading budget items: {}", e),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
