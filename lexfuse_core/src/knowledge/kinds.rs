//! Closed vocabularies for the type-specific fields of knowledge items.

use serde::{Deserialize, Serialize};

/// What a date means for the document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    /// Something must happen by this date.
    Deadline,
    /// The order or a provision takes effect.
    Effective,
    /// The order was signed.
    Signing,
    /// A date referenced without a recognized role.
    Mentioned,
}

impl DateType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deadline => "deadline",
            Self::Effective => "effective",
            Self::Signing => "signing",
            Self::Mentioned => "mentioned",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    /// A named agency or official shall act.
    AgencyAction,
    /// An obligation without a recognized actor.
    General,
    /// A duty to report, assess or recommend.
    Reporting,
    /// Something that shall not be done.
    Prohibition,
    /// An obligation bound to a deadline.
    Deadline,
}

impl RequirementType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AgencyAction => "agency_action",
            Self::General => "general",
            Self::Reporting => "reporting",
            Self::Prohibition => "prohibition",
            Self::Deadline => "deadline",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    General,
    Financial,
    Compliance,
    Operational,
    Security,
}

impl ImpactType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Financial => "financial",
            Self::Compliance => "compliance",
            Self::Operational => "operational",
            Self::Security => "security",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Immediate,
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl Timeframe {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// One of the fifteen executive departments.
    Department,
    /// An agency, office, bureau, commission or similar body.
    Agency,
    /// A titled official such as the Secretary of Energy.
    Official,
    /// A body the order itself establishes.
    CreatedBody,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Agency => "agency",
            Self::Official => "official",
            Self::CreatedBody => "created_body",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionScope {
    /// Defined in the document's Definitions section.
    Global,
    /// Defined inline elsewhere in the text.
    Local,
}

impl DefinitionScope {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityType {
    /// Authority vested in the President by the Constitution and laws.
    Presidential,
    /// A generic "pursuant to" basis.
    General,
    /// A section of a named Act.
    Statute,
    /// A United States Code citation.
    UsCode,
    /// A Public Law number.
    PublicLaw,
    /// An article or amendment of the Constitution.
    Constitution,
}

impl AuthorityType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Presidential => "presidential",
            Self::General => "general",
            Self::Statute => "statute",
            Self::UsCode => "us_code",
            Self::PublicLaw => "public_law",
            Self::Constitution => "constitution",
        }
    }
}
