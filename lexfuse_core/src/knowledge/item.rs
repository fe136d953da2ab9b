use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::KnowledgeType;
use super::kinds::{
    AuthorityType, DateType, DefinitionScope, EntityType, ImpactType, Priority, RequirementType,
    Severity, Timeframe,
};
use crate::bundle::ExtractionContext;
use crate::util::{content_hash, normalize_name, normalize_text};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateFact {
    /// Calendar date, serialized as ISO 8601.
    pub date: NaiveDate,
    pub date_type: DateType,
    /// False when the date was calculated from a relative expression.
    pub is_explicit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequirementFact {
    pub requirement_type: RequirementType,
    pub description: String,
    #[serde(default)]
    pub target_entities: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    pub is_conditional: bool,
    /// Deadline phrase carried by the clause, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactFact {
    pub impact_type: ImpactType,
    pub description: String,
    #[serde(default)]
    pub affected_entities: Vec<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub related_requirement_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityFact {
    pub name: String,
    pub entity_type: EntityType,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionFact {
    pub term: String,
    pub definition: String,
    pub scope: DefinitionScope,
    #[serde(default)]
    pub related_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorityFact {
    pub authority_type: AuthorityType,
    pub citation: String,
    pub description: String,
}

/// Type-specific payload of a knowledge item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnowledgeDetails {
    Date(DateFact),
    Requirement(RequirementFact),
    Impact(ImpactFact),
    Entity(EntityFact),
    Definition(DefinitionFact),
    Authority(AuthorityFact),
}

impl KnowledgeDetails {
    #[must_use]
    pub const fn kind(&self) -> KnowledgeType {
        match self {
            Self::Date(_) => KnowledgeType::Date,
            Self::Requirement(_) => KnowledgeType::Requirement,
            Self::Impact(_) => KnowledgeType::Impact,
            Self::Entity(_) => KnowledgeType::Entity,
            Self::Definition(_) => KnowledgeType::Definition,
            Self::Authority(_) => KnowledgeType::Authority,
        }
    }

    /// Content-derived key used to recognize the same fact across sources.
    ///
    /// Built only from stable, meaningful fields: `(date_type, date)` for
    /// dates, a hash of the normalized description for requirements and
    /// impacts, and the normalized name, term or citation otherwise.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self {
            Self::Date(fact) => format!("{}|{}", fact.date_type.as_str(), fact.date),
            Self::Requirement(fact) => {
                content_hash("requirement", &normalize_text(&fact.description))
            }
            Self::Impact(fact) => content_hash("impact", &normalize_text(&fact.description)),
            Self::Entity(fact) => normalize_name(&fact.name),
            Self::Definition(fact) => normalize_text(&fact.term),
            Self::Authority(fact) => normalize_text(&fact.citation),
        }
    }
}

/// One typed, confidence-scored fact extracted from a source's text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeItem {
    /// `<type>-<hash prefix>` derived from the identity key.
    pub id: String,
    pub source_id: String,
    pub source_name: String,
    /// Confidence score (0.0-1.0).
    pub confidence: f32,
    /// Span of the source text the item was built from.
    pub text_evidence: String,
    pub details: KnowledgeDetails,
}

impl KnowledgeItem {
    /// Create an item attributed to the context's source.
    #[must_use]
    pub fn new(
        details: KnowledgeDetails,
        context: &ExtractionContext,
        text_evidence: impl Into<String>,
        confidence: f32,
    ) -> Self {
        let id = Self::derive_id(&details);
        Self {
            id,
            source_id: context.source_id.clone(),
            source_name: context.source_name.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            text_evidence: text_evidence.into(),
            details,
        }
    }

    fn derive_id(details: &KnowledgeDetails) -> String {
        let kind = details.kind();
        let hash = content_hash(kind.as_str(), &details.identity_key());
        format!("{}-{}", kind.as_str(), &hash[..16])
    }

    #[must_use]
    pub const fn kind(&self) -> KnowledgeType {
        self.details.kind()
    }

    #[must_use]
    pub fn identity_key(&self) -> String {
        self.details.identity_key()
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<&DateFact> {
        match &self.details {
            KnowledgeDetails::Date(fact) => Some(fact),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_requirement(&self) -> Option<&RequirementFact> {
        match &self.details {
            KnowledgeDetails::Requirement(fact) => Some(fact),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_impact(&self) -> Option<&ImpactFact> {
        match &self.details {
            KnowledgeDetails::Impact(fact) => Some(fact),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityFact> {
        match &self.details {
            KnowledgeDetails::Entity(fact) => Some(fact),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_definition(&self) -> Option<&DefinitionFact> {
        match &self.details {
            KnowledgeDetails::Definition(fact) => Some(fact),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_authority(&self) -> Option<&AuthorityFact> {
        match &self.details {
            KnowledgeDetails::Authority(fact) => Some(fact),
            _ => None,
        }
    }
}
