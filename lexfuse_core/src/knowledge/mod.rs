//! Knowledge item model.
//!
//! Every fact an extractor produces is a [`KnowledgeItem`]: common attribution
//! fields plus a [`KnowledgeDetails`] variant carrying the type-specific payload.
//! Item identity is derived from content so the same fact extracted from two
//! sources yields the same key.

mod item;
mod kinds;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

pub use item::{
    AuthorityFact, DateFact, DefinitionFact, EntityFact, ImpactFact, KnowledgeDetails,
    KnowledgeItem, RequirementFact,
};
pub use kinds::{
    AuthorityType, DateType, DefinitionScope, EntityType, ImpactType, Priority, RequirementType,
    Severity, Timeframe,
};

/// The six kinds of knowledge the engine extracts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum KnowledgeType {
    /// Deadlines, effective dates, signing dates.
    Date = 0,
    /// Obligations placed on agencies or officials.
    Requirement = 1,
    /// Described consequences of the order.
    Impact = 2,
    /// Agencies, departments, officials and newly created bodies.
    Entity = 3,
    /// Terms given a meaning by the order.
    Definition = 4,
    /// Legal basis cited by the order.
    Authority = 5,
}

impl KnowledgeType {
    /// Every knowledge type, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Date,
        Self::Requirement,
        Self::Impact,
        Self::Entity,
        Self::Definition,
        Self::Authority,
    ];

    /// Returns the string representation of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Requirement => "requirement",
            Self::Impact => "impact",
            Self::Entity => "entity",
            Self::Definition => "definition",
            Self::Authority => "authority",
        }
    }
}

impl std::fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnowledgeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" | "dates" => Ok(Self::Date),
            "requirement" | "requirements" => Ok(Self::Requirement),
            "impact" | "impacts" => Ok(Self::Impact),
            "entity" | "entities" => Ok(Self::Entity),
            "definition" | "definitions" => Ok(Self::Definition),
            "authority" | "authorities" => Ok(Self::Authority),
            _ => Err(Error::UnknownKnowledgeType(s.to_string())),
        }
    }
}
