use serde::{Deserialize, Serialize};

use crate::budget::{BudgetItem, MaterialReceipt, Project};
use crate::catalog::Catalog;
use crate::index::CatalogIndexes;
use crate::validation::{self, SnapshotValidationError};

/// Everything one estimate needs: the project, its catalog, its budget lines
/// and the material deliveries recorded so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    pub project: Project,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub items: Vec<BudgetItem>,
    #[serde(default)]
    pub receipts: Vec<MaterialReceipt>,
}

impl EstimateSnapshot {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            ..Self::default()
        }
    }

    /// Builds fresh indexes from the current catalog lists.
    pub fn indexes(&self) -> CatalogIndexes {
        CatalogIndexes::build(&self.catalog)
    }

    pub fn item(&self, id: &str) -> Option<&BudgetItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn validate(&self) -> Result<(), SnapshotValidationError> {
        validation::validate_snapshot(self)
    }
}
