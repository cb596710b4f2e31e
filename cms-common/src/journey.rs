//! Journey curriculum tree
//!
//! A [`Journey`] owns ordered sections, a section owns ordered units, and a
//! unit owns ordered steps. Every editing operation addresses nodes by
//! [`NodeId`] and resolves the id to an array position only at the moment
//! of mutation. Operations validate their inputs before touching the tree,
//! so a failed call leaves the journey unchanged.
//!
//! Reordering follows drag-and-drop semantics (remove at the source index,
//! insert at the destination index). Units may move between sections;
//! steps only move within their own unit, and a cross-unit step move is
//! reported as [`ReorderOutcome::Ignored`].

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityKind, Reference};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId, Error, NodeId, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub card_color: String,
    #[serde(default)]
    pub status: JourneyStatus,
    #[serde(default)]
    pub sections: Vec<JourneySection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneySection {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub heart_points: u32,
    #[serde(default)]
    pub gems: u32,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: NodeId,
    pub title: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub payload: StepPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    Video,
    Article,
    Pair,
    MultiSelect,
    SingleSelect,
}

/// Content a step points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPayload {
    pub kind: PayloadKind,
    pub id: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Collection,
    Article,
    Source,
    Section,
    SubSection,
}

impl PayloadKind {
    /// Store holding the referenced entity; sources live outside the console
    fn entity_kind(self) -> Option<EntityKind> {
        match self {
            PayloadKind::Collection => Some(EntityKind::Collection),
            PayloadKind::Article => Some(EntityKind::Article),
            PayloadKind::Section => Some(EntityKind::Section),
            PayloadKind::SubSection => Some(EntityKind::SubSection),
            PayloadKind::Source => None,
        }
    }
}

// ========================================
// Form values
// ========================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionValues {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPatch {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitValues {
    pub title: String,
    #[serde(default)]
    pub heart_points: u32,
    #[serde(default)]
    pub gems: u32,
    #[serde(default)]
    pub published: bool,
}

/// Shallow merge onto a unit: only supplied fields change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitPatch {
    pub title: Option<String>,
    pub heart_points: Option<u32>,
    pub gems: Option<u32>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepValues {
    pub title: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub payload: StepPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepPatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub step_type: Option<StepType>,
    pub payload: Option<StepPayload>,
}

// ========================================
// Reorder positions
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitPosition {
    pub section_id: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepPosition {
    pub section_id: NodeId,
    pub unit_id: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderOutcome {
    Moved,
    /// Source and destination are the same slot
    Unchanged,
    /// Move across parents that this level does not support
    Ignored,
}

fn check_index(len: usize, index: usize, what: &str) -> Result<()> {
    if index >= len {
        return Err(Error::InvalidInput(format!(
            "{} index {} out of range ({} items)",
            what, index, len
        )));
    }
    Ok(())
}

fn require_title(title: &str, what: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} title is required", what)));
    }
    Ok(())
}

impl Journey {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntityId::NEW,
            title: title.into(),
            card_color: String::new(),
            status: JourneyStatus::Draft,
            sections: Vec::new(),
        }
    }

    // ---- lookup ----

    fn section_index(&self, section_id: &NodeId) -> Result<usize> {
        self.sections
            .iter()
            .position(|s| &s.id == section_id)
            .ok_or_else(|| Error::NotFound(format!("Section {}", section_id)))
    }

    pub fn section(&self, section_id: &NodeId) -> Result<&JourneySection> {
        let index = self.section_index(section_id)?;
        Ok(&self.sections[index])
    }

    fn section_mut(&mut self, section_id: &NodeId) -> Result<&mut JourneySection> {
        let index = self.section_index(section_id)?;
        Ok(&mut self.sections[index])
    }

    pub fn unit(&self, section_id: &NodeId, unit_id: &NodeId) -> Result<&Unit> {
        let section = self.section(section_id)?;
        let index = section.unit_index(unit_id)?;
        Ok(&section.units[index])
    }

    fn unit_mut(&mut self, section_id: &NodeId, unit_id: &NodeId) -> Result<&mut Unit> {
        let section = self.section_mut(section_id)?;
        let index = section.unit_index(unit_id)?;
        Ok(&mut section.units[index])
    }

    // ---- sections ----

    pub fn add_section(&mut self, values: SectionValues) -> Result<NodeId> {
        require_title(&values.title, "Section")?;
        let id = NodeId::generate();
        self.sections.push(JourneySection {
            id: id.clone(),
            title: values.title,
            units: Vec::new(),
        });
        Ok(id)
    }

    pub fn edit_section(&mut self, section_id: &NodeId, patch: SectionPatch) -> Result<()> {
        if let Some(title) = &patch.title {
            require_title(title, "Section")?;
        }
        let section = self.section_mut(section_id)?;
        if let Some(title) = patch.title {
            section.title = title;
        }
        Ok(())
    }

    pub fn delete_section(&mut self, section_id: &NodeId) -> Result<JourneySection> {
        let index = self.section_index(section_id)?;
        Ok(self.sections.remove(index))
    }

    pub fn reorder_sections(&mut self, source: usize, destination: usize) -> Result<ReorderOutcome> {
        check_index(self.sections.len(), source, "Section")?;
        check_index(self.sections.len(), destination, "Section")?;
        if source == destination {
            return Ok(ReorderOutcome::Unchanged);
        }
        let moved = self.sections.remove(source);
        self.sections.insert(destination, moved);
        Ok(ReorderOutcome::Moved)
    }

    // ---- units ----

    /// Append a unit with a fresh id and no steps
    pub fn add_unit(&mut self, section_id: &NodeId, values: UnitValues) -> Result<NodeId> {
        require_title(&values.title, "Unit")?;
        let section = self.section_mut(section_id)?;
        let id = NodeId::generate();
        section.units.push(Unit {
            id: id.clone(),
            title: values.title,
            heart_points: values.heart_points,
            gems: values.gems,
            published: values.published,
            steps: Vec::new(),
        });
        Ok(id)
    }

    pub fn edit_unit(&mut self, section_id: &NodeId, unit_id: &NodeId, patch: UnitPatch) -> Result<()> {
        if let Some(title) = &patch.title {
            require_title(title, "Unit")?;
        }
        let unit = self.unit_mut(section_id, unit_id)?;
        if let Some(title) = patch.title {
            unit.title = title;
        }
        if let Some(points) = patch.heart_points {
            unit.heart_points = points;
        }
        if let Some(gems) = patch.gems {
            unit.gems = gems;
        }
        if let Some(published) = patch.published {
            unit.published = published;
        }
        Ok(())
    }

    pub fn delete_unit(&mut self, section_id: &NodeId, unit_id: &NodeId) -> Result<Unit> {
        let section = self.section_mut(section_id)?;
        let index = section.unit_index(unit_id)?;
        Ok(section.units.remove(index))
    }

    /// Flip `published`; returns the new value
    pub fn toggle_unit_published(&mut self, section_id: &NodeId, unit_id: &NodeId) -> Result<bool> {
        let unit = self.unit_mut(section_id, unit_id)?;
        unit.published = !unit.published;
        Ok(unit.published)
    }

    /// Move a unit, possibly into another section
    pub fn move_unit(&mut self, source: &UnitPosition, destination: &UnitPosition) -> Result<ReorderOutcome> {
        let from = self.section_index(&source.section_id)?;
        let to = self.section_index(&destination.section_id)?;
        check_index(self.sections[from].units.len(), source.index, "Unit")?;

        if from == to {
            check_index(self.sections[to].units.len(), destination.index, "Unit")?;
            if source.index == destination.index {
                return Ok(ReorderOutcome::Unchanged);
            }
        } else if destination.index > self.sections[to].units.len() {
            // appending after the last unit is allowed across sections
            return Err(Error::InvalidInput(format!(
                "Unit index {} out of range ({} items)",
                destination.index,
                self.sections[to].units.len()
            )));
        }

        let unit = self.sections[from].units.remove(source.index);
        self.sections[to].units.insert(destination.index, unit);
        Ok(ReorderOutcome::Moved)
    }

    // ---- steps ----

    pub fn add_step(&mut self, section_id: &NodeId, unit_id: &NodeId, values: StepValues) -> Result<NodeId> {
        require_title(&values.title, "Step")?;
        let unit = self.unit_mut(section_id, unit_id)?;
        let id = NodeId::generate();
        unit.steps.push(Step {
            id: id.clone(),
            title: values.title,
            step_type: values.step_type,
            payload: values.payload,
        });
        Ok(id)
    }

    pub fn edit_step(
        &mut self,
        section_id: &NodeId,
        unit_id: &NodeId,
        step_id: &NodeId,
        patch: StepPatch,
    ) -> Result<()> {
        if let Some(title) = &patch.title {
            require_title(title, "Step")?;
        }
        let unit = self.unit_mut(section_id, unit_id)?;
        let index = unit.step_index(step_id)?;
        let step = &mut unit.steps[index];
        if let Some(title) = patch.title {
            step.title = title;
        }
        if let Some(step_type) = patch.step_type {
            step.step_type = step_type;
        }
        if let Some(payload) = patch.payload {
            step.payload = payload;
        }
        Ok(())
    }

    pub fn delete_step(&mut self, section_id: &NodeId, unit_id: &NodeId, step_id: &NodeId) -> Result<Step> {
        let unit = self.unit_mut(section_id, unit_id)?;
        let index = unit.step_index(step_id)?;
        Ok(unit.steps.remove(index))
    }

    /// Move a step within its unit; cross-unit moves are ignored
    pub fn move_step(&mut self, source: &StepPosition, destination: &StepPosition) -> Result<ReorderOutcome> {
        if source.section_id != destination.section_id || source.unit_id != destination.unit_id {
            tracing::debug!(
                from_unit = %source.unit_id,
                to_unit = %destination.unit_id,
                "Ignoring cross-unit step move"
            );
            return Ok(ReorderOutcome::Ignored);
        }
        let unit = self.unit_mut(&source.section_id, &source.unit_id)?;
        check_index(unit.steps.len(), source.index, "Step")?;
        check_index(unit.steps.len(), destination.index, "Step")?;
        if source.index == destination.index {
            return Ok(ReorderOutcome::Unchanged);
        }
        let step = unit.steps.remove(source.index);
        unit.steps.insert(destination.index, step);
        Ok(ReorderOutcome::Moved)
    }

    /// Every node id in traversal order: sections, then each section's
    /// units, then each unit's steps
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for section in &self.sections {
            ids.push(section.id.clone());
            for unit in &section.units {
                ids.push(unit.id.clone());
                ids.extend(unit.steps.iter().map(|s| s.id.clone()));
            }
        }
        ids
    }
}

impl JourneySection {
    fn unit_index(&self, unit_id: &NodeId) -> Result<usize> {
        self.units
            .iter()
            .position(|u| &u.id == unit_id)
            .ok_or_else(|| Error::NotFound(format!("Unit {}", unit_id)))
    }
}

impl Unit {
    fn step_index(&self, step_id: &NodeId) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| &s.id == step_id)
            .ok_or_else(|| Error::NotFound(format!("Step {}", step_id)))
    }
}

fn is_hex_color(value: &str) -> bool {
    let digits = match value.strip_prefix('#') {
        Some(d) => d,
        None => return false,
    };
    (digits.len() == 6 || digits.len() == 3) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

impl Entity for Journey {
    const KIND: EntityKind = EntityKind::Journey;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.title
    }

    /// Journeys use their own draft/published flag
    fn status(&self) -> Option<ContentStatus> {
        None
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        for (s, section) in self.sections.iter().enumerate() {
            for (u, unit) in section.units.iter().enumerate() {
                for (i, step) in unit.steps.iter().enumerate() {
                    if let Some(kind) = step.payload.kind.entity_kind() {
                        refs.push(Reference::new(
                            format!("sections.{}.units.{}.steps.{}.payload", s, u, i),
                            kind,
                            step.payload.id,
                        ));
                    }
                }
            }
        }
        refs
    }

    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("title", &self.title);
        if !self.card_color.is_empty() && !is_hex_color(&self.card_color) {
            errors.push("card_color", "Must be a hex colour like #1A2B3C");
        }
        for (s, section) in self.sections.iter().enumerate() {
            errors.require_text(format!("sections.{}.title", s), &section.title);
            for (u, unit) in section.units.iter().enumerate() {
                errors.require_text(format!("sections.{}.units.{}.title", s, u), &unit.title);
                for (i, step) in unit.steps.iter().enumerate() {
                    errors.require_text(
                        format!("sections.{}.units.{}.steps.{}.title", s, u, i),
                        &step.title,
                    );
                }
            }
        }
        errors.into_result()
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.journeys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_values(title: &str) -> UnitValues {
        UnitValues {
            title: title.to_string(),
            heart_points: 10,
            gems: 2,
            published: false,
        }
    }

    fn journey_with_units(n: usize) -> (Journey, NodeId, Vec<NodeId>) {
        let mut journey = Journey::new("Calm");
        let section = journey
            .add_section(SectionValues { title: "Week 1".into() })
            .unwrap();
        let units = (0..n)
            .map(|i| journey.add_unit(&section, unit_values(&format!("U{}", i))).unwrap())
            .collect();
        (journey, section, units)
    }

    #[test]
    fn test_add_unit_appends_with_empty_steps() {
        let (journey, section, units) = journey_with_units(2);
        let unit = journey.unit(&section, &units[1]).unwrap();
        assert_eq!(unit.title, "U1");
        assert!(unit.steps.is_empty());
        assert!(unit.id.is_local());
    }

    #[test]
    fn test_add_unit_unknown_section_leaves_tree_untouched() {
        let (mut journey, _, _) = journey_with_units(1);
        let before = journey.clone();
        let result = journey.add_unit(&NodeId::Server(999), unit_values("x"));
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(journey, before);
    }

    #[test]
    fn test_edit_unit_merges_only_supplied_fields() {
        let (mut journey, section, units) = journey_with_units(1);
        journey
            .edit_unit(
                &section,
                &units[0],
                UnitPatch {
                    gems: Some(9),
                    ..Default::default()
                },
            )
            .unwrap();
        let unit = journey.unit(&section, &units[0]).unwrap();
        assert_eq!(unit.gems, 9);
        assert_eq!(unit.heart_points, 10);
        assert_eq!(unit.title, "U0");
    }

    #[test]
    fn test_toggle_published() {
        let (mut journey, section, units) = journey_with_units(1);
        assert!(journey.toggle_unit_published(&section, &units[0]).unwrap());
        assert!(!journey.toggle_unit_published(&section, &units[0]).unwrap());
    }

    #[test]
    fn test_reorder_sections_same_slot_is_unchanged() {
        let (mut journey, _, _) = journey_with_units(0);
        assert_eq!(journey.reorder_sections(0, 0).unwrap(), ReorderOutcome::Unchanged);
        assert!(journey.reorder_sections(0, 3).is_err());
    }

    #[test]
    fn test_hex_color_validation() {
        let mut journey = Journey::new("x");
        journey.card_color = "#12ab".into();
        assert!(journey.validate().unwrap_err().has("card_color"));
        journey.card_color = "#12abEF".into();
        assert!(journey.validate().is_ok());
    }
}
