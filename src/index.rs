use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::catalog::{
    Catalog, Crew, CrewUsage, LaborCategory, Material, MaterialUsage, Task, Tool, ToolUsage,
};

/// Id lookups derived from a [`Catalog`] snapshot.
///
/// Indexes are never edited in place: when any source list changes, build a new
/// value from the updated catalog. When an id appears twice the first entry wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndexes {
    materials: HashMap<String, Material>,
    tools: HashMap<String, Tool>,
    labor_categories: HashMap<String, LaborCategory>,
    crews: HashMap<String, Crew>,
    tasks: HashMap<String, Task>,
    material_usage: HashMap<String, Vec<MaterialUsage>>,
    tool_usage: HashMap<String, Vec<ToolUsage>>,
    crew_usage: HashMap<String, Vec<CrewUsage>>,
}

impl CatalogIndexes {
    pub fn build(catalog: &Catalog) -> Self {
        let indexes = Self {
            materials: by_id(&catalog.materials, |m| &m.id),
            tools: by_id(&catalog.tools, |t| &t.id),
            labor_categories: by_id(&catalog.labor_categories, |l| &l.id),
            crews: by_id(&catalog.crews, |c| &c.id),
            tasks: by_id(&catalog.tasks, |t| &t.id),
            material_usage: by_task(&catalog.material_usage, |u| &u.task_id),
            tool_usage: by_task(&catalog.tool_usage, |u| &u.task_id),
            crew_usage: by_task(&catalog.crew_usage, |u| &u.task_id),
        };
        tracing::debug!(
            materials = indexes.materials.len(),
            tools = indexes.tools.len(),
            crews = indexes.crews.len(),
            tasks = indexes.tasks.len(),
            "catalog indexes built"
        );
        indexes
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn tool(&self, id: &str) -> Option<&Tool> {
        self.tools.get(id)
    }

    pub fn labor_category(&self, id: &str) -> Option<&LaborCategory> {
        self.labor_categories.get(id)
    }

    pub fn crew(&self, id: &str) -> Option<&Crew> {
        self.crews.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn materials(&self) -> &HashMap<String, Material> {
        &self.materials
    }

    pub fn tools(&self) -> &HashMap<String, Tool> {
        &self.tools
    }

    pub fn labor_categories(&self) -> &HashMap<String, LaborCategory> {
        &self.labor_categories
    }

    pub fn crews(&self) -> &HashMap<String, Crew> {
        &self.crews
    }

    pub fn material_usage_index(&self) -> &HashMap<String, Vec<MaterialUsage>> {
        &self.material_usage
    }

    pub fn tool_usage_index(&self) -> &HashMap<String, Vec<ToolUsage>> {
        &self.tool_usage
    }

    pub fn crew_usage_index(&self) -> &HashMap<String, Vec<CrewUsage>> {
        &self.crew_usage
    }

    /// Material records for a task, in source order.
    pub fn material_usage(&self, task_id: &str) -> &[MaterialUsage] {
        records_for(&self.material_usage, task_id)
    }

    pub fn tool_usage(&self, task_id: &str) -> &[ToolUsage] {
        records_for(&self.tool_usage, task_id)
    }

    pub fn crew_usage(&self, task_id: &str) -> &[CrewUsage] {
        records_for(&self.crew_usage, task_id)
    }
}

fn by_id<T: Clone>(items: &[T], id: impl Fn(&T) -> &String) -> HashMap<String, T> {
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        match map.entry(id(item).clone()) {
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
            }
            Entry::Occupied(slot) => {
                tracing::debug!(id = %slot.key(), "duplicate catalog id ignored");
            }
        }
    }
    map
}

fn by_task<T: Clone>(records: &[T], task_id: impl Fn(&T) -> &String) -> HashMap<String, Vec<T>> {
    let mut map: HashMap<String, Vec<T>> = HashMap::new();
    for record in records {
        map.entry(task_id(record).clone())
            .or_default()
            .push(record.clone());
    }
    map
}

fn records_for<'a, T>(map: &'a HashMap<String, Vec<T>>, task_id: &str) -> &'a [T] {
    map.get(task_id).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_builds_empty_indexes() {
        let indexes = CatalogIndexes::build(&Catalog::default());
        assert!(indexes.materials().is_empty());
        assert!(indexes.material_usage("anything").is_empty());
        assert!(indexes.task("anything").is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let mut catalog = Catalog::default();
        catalog.materials.push(Material::new("M1", "Cement", 10.0));
        catalog.materials.push(Material::new("M1", "Cement (dup)", 99.0));
        let indexes = CatalogIndexes::build(&catalog);
        assert_eq!(indexes.material("M1").map(|m| m.unit_cost), Some(10.0));
    }
}
