//! Named scalar quantity definitions.

use serde::{Deserialize, Serialize};

/// A named scalar with its unit and display metadata.
///
/// Identity is the name within one phase. The definition is fixed at
/// construction; `value` is the initial value seeding the first history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub name: String,
    pub unit: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Quantity {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            value,
            formal_name: None,
            latex_name: None,
            info: None,
        }
    }

    pub fn formal(mut self, formal_name: impl Into<String>) -> Self {
        self.formal_name = Some(formal_name.into());
        self
    }

    pub fn latex(mut self, latex_name: impl Into<String>) -> Self {
        self.latex_name = Some(latex_name.into());
        self
    }

    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Label for plots and CSV headers, e.g. `temp [K]`.
    pub fn label(&self) -> String {
        if self.unit.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} [{}]", self.name, self.unit)
        }
    }
}
