use serde::{Deserialize, Serialize};

/// A purchasable input consumed by tasks (cement, rebar, paint...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    /// Unit of measure the `unit_cost` is quoted in (e.g. "bag", "m3").
    pub unit: String,
    pub unit_cost: f64,
    #[serde(default)]
    pub category: String,
    /// Extra quantity lost in handling, as a percentage of the net quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste_percent: Option<f64>,
}

impl Material {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_cost: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: String::new(),
            unit_cost,
            category: String::new(),
            waste_percent: None,
        }
    }

    /// Multiplier applied to net quantities to account for waste.
    pub fn waste_factor(&self) -> f64 {
        1.0 + non_negative(self.waste_percent.unwrap_or(0.0)) / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborCategory {
    pub id: String,
    pub role: String,
    pub basic_hourly_rate: f64,
    #[serde(default)]
    pub social_charges_percent: f64,
    #[serde(default)]
    pub insurance_percent: f64,
}

impl LaborCategory {
    pub fn new(id: impl Into<String>, role: impl Into<String>, basic_hourly_rate: f64) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            basic_hourly_rate,
            social_charges_percent: 0.0,
            insurance_percent: 0.0,
        }
    }

    /// Fully-loaded hourly cost: basic rate plus social charges and insurance.
    pub fn loaded_hourly_cost(&self) -> f64 {
        let surcharge = self.social_charges_percent + self.insurance_percent;
        non_negative(self.basic_hourly_rate * (1.0 + surcharge / 100.0))
    }
}

/// One line of a crew composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub labor_category_id: String,
    pub headcount: f64,
    #[serde(default = "default_participation")]
    pub participation_percent: f64,
}

fn default_participation() -> f64 {
    100.0
}

impl CrewMember {
    pub fn new(labor_category_id: impl Into<String>, headcount: f64) -> Self {
        Self {
            labor_category_id: labor_category_id.into(),
            headcount,
            participation_percent: default_participation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub composition: Vec<CrewMember>,
}

impl Crew {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            composition: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: CrewMember) -> Self {
        self.composition.push(member);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub cost_per_hour: f64,
}

impl Tool {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost_per_hour: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost_per_hour,
        }
    }
}

/// Default resource recipe for a task, used as a comparison baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardYields {
    #[serde(default)]
    pub materials: Vec<StandardMaterialLine>,
    #[serde(default)]
    pub tools: Vec<StandardToolLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<StandardCrewLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterialLine {
    pub material_id: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardToolLine {
    pub tool_id: String,
    pub hours_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardCrewLine {
    pub crew_id: String,
    pub quantity: f64,
}

/// A unit-rate work item ("m2 of plastering", "m3 of concrete").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Output unit the task is priced in.
    #[serde(default)]
    pub unit: String,
    /// Rubric or chapter used to group budget lines.
    #[serde(default)]
    pub category: String,
    /// Manually entered labor cost per unit, used when no crew data is available.
    #[serde(default)]
    pub labor_cost: f64,
    /// Units one reference crew produces per day.
    #[serde(default)]
    pub daily_yield: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_unit: Option<f64>,
    /// Flat per-unit price not derived from any consumption record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_yields: Option<StandardYields>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, daily_yield: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: String::new(),
            category: String::new(),
            labor_cost: 0.0,
            daily_yield,
            hours_per_unit: None,
            fixed_cost: None,
            standard_yields: None,
        }
    }

    /// Daily yield usable as a divisor, `None` when the task cannot be scheduled.
    pub fn schedulable_yield(&self) -> Option<f64> {
        (self.daily_yield.is_finite() && self.daily_yield > 0.0).then_some(self.daily_yield)
    }
}

/// Quantity of a material consumed per unit of task output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    pub task_id: String,
    pub material_id: String,
    pub quantity: f64,
}

impl MaterialUsage {
    pub fn new(task_id: impl Into<String>, material_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            task_id: task_id.into(),
            material_id: material_id.into(),
            quantity,
        }
    }
}

/// Hours of tool use per unit of task output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub task_id: String,
    pub tool_id: String,
    pub hours_per_unit: f64,
}

impl ToolUsage {
    pub fn new(task_id: impl Into<String>, tool_id: impl Into<String>, hours_per_unit: f64) -> Self {
        Self {
            task_id: task_id.into(),
            tool_id: tool_id.into(),
            hours_per_unit,
        }
    }
}

/// Crew assignment for a task. `quantity` is crew-hours per unit of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewUsage {
    pub task_id: String,
    pub crew_id: String,
    #[serde(default)]
    pub quantity: f64,
}

impl CrewUsage {
    pub fn new(task_id: impl Into<String>, crew_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            task_id: task_id.into(),
            crew_id: crew_id.into(),
            quantity,
        }
    }
}

/// Flat source lists as handed over by the catalog store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub labor_categories: Vec<LaborCategory>,
    #[serde(default)]
    pub crews: Vec<Crew>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub material_usage: Vec<MaterialUsage>,
    #[serde(default)]
    pub tool_usage: Vec<ToolUsage>,
    #[serde(default)]
    pub crew_usage: Vec<CrewUsage>,
}

/// Clamps negative and non-finite amounts to zero.
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
