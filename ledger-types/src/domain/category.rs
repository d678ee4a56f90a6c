//! Closed classification enums: movement direction and category.
//!
//! Both serialise to the literal tokens stored in the `control` table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Whether a movement increases or decreases the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ingreso")]
    Inflow,
    #[serde(rename = "egreso")]
    Outflow,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Inflow, Direction::Outflow];

    /// Wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inflow => "ingreso",
            Direction::Outflow => "egreso",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Inflow => "Ingreso",
            Direction::Outflow => "Egreso",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ingreso" => Ok(Direction::Inflow),
            "egreso" => Ok(Direction::Outflow),
            _ => Err(DomainError::UnknownDirection(s.to_string())),
        }
    }
}

/// Category of a movement. The set is closed; there is no free-form variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "entretenimiento")]
    Entertainment,
    #[serde(rename = "servicios")]
    Utilities,
    #[serde(rename = "alimentos")]
    Food,
    #[serde(rename = "inmueble")]
    Housing,
    #[serde(rename = "viajes")]
    Travel,
    #[serde(rename = "salud")]
    Health,
    #[serde(rename = "rodados")]
    Vehicles,
    #[serde(rename = "educacion")]
    Education,
    #[serde(rename = "vestimenta")]
    Clothing,
    #[serde(rename = "tecnologia")]
    Technology,
    #[serde(rename = "trabajo")]
    Work,
    #[serde(rename = "otros")]
    Other,
}

impl Category {
    /// Every category, in the order the forms list them.
    pub const ALL: [Category; 12] = [
        Category::Entertainment,
        Category::Utilities,
        Category::Food,
        Category::Housing,
        Category::Travel,
        Category::Health,
        Category::Vehicles,
        Category::Education,
        Category::Clothing,
        Category::Technology,
        Category::Work,
        Category::Other,
    ];

    /// Wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entretenimiento",
            Category::Utilities => "servicios",
            Category::Food => "alimentos",
            Category::Housing => "inmueble",
            Category::Travel => "viajes",
            Category::Health => "salud",
            Category::Vehicles => "rodados",
            Category::Education => "educacion",
            Category::Clothing => "vestimenta",
            Category::Technology => "tecnologia",
            Category::Work => "trabajo",
            Category::Other => "otros",
        }
    }

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entretenimiento",
            Category::Utilities => "Servicios",
            Category::Food => "Alimentos",
            Category::Housing => "Inmueble",
            Category::Travel => "Viajes",
            Category::Health => "Salud",
            Category::Vehicles => "Rodados",
            Category::Education => "Educación",
            Category::Clothing => "Vestimenta",
            Category::Technology => "Tecnología",
            Category::Work => "Trabajo",
            Category::Other => "Otros",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == token)
            .ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}
