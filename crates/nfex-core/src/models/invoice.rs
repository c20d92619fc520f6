//! Line-item data model for NF-e reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One product or service entry of an invoice, flattened with the
/// document-level header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Invoice number (`ide/nNF`).
    pub invoice_number: String,

    /// Emission timestamp as written in the document (`ide/dhEmi`).
    pub emission_date: String,

    /// Issuer name (`emit/xNome`).
    pub issuer_name: String,

    /// Product or service.
    pub kind: ItemKind,

    /// Item name (`prod/xProd`).
    pub description: String,

    /// Commercial quantity, kept verbatim (`prod/qCom`).
    pub quantity: String,

    /// Commercial unit (`prod/uCom`).
    pub unit: String,

    /// Unit value, kept verbatim (`prod/vUnCom`).
    pub unit_value: String,

    /// Total value, kept verbatim (`prod/vProd`).
    pub total_value: String,

    /// Consumable or asset, derived from the description.
    pub category: Category,
}

/// Whether an item is a product or a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Goods (no service-tax group on the item).
    Product,
    /// Service (item carries an `ISSQN` group).
    Service,
}

impl ItemKind {
    /// Label written to the report.
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Product => "Produto",
            ItemKind::Service => "Serviço",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accounting category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Used up in operation.
    Consumable,
    /// Durable good tracked as company property.
    Asset,
}

impl Category {
    /// Label written to the report.
    pub fn label(self) -> &'static str {
        match self {
            Category::Consumable => "Consumível",
            Category::Asset => "Patrimonial",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl LineItem {
    /// Fields in report column order, with kind and category as labels.
    pub fn to_row(&self) -> [&str; 10] {
        [
            &self.invoice_number,
            &self.issuer_name,
            &self.emission_date,
            self.kind.label(),
            &self.description,
            self.category.label(),
            &self.quantity,
            &self.unit,
            &self.unit_value,
            &self.total_value,
        ]
    }
}
