//! Journey tree editing through the public API
//!
//! Covers id-addressed mutation, reorder semantics and the guarantee that
//! rejected edits leave the tree unchanged.

use cms_common::entities::Entity;
use cms_common::journey::{
    Journey, PayloadKind, ReorderOutcome, SectionValues, StepPatch, StepPayload, StepPosition,
    StepType, StepValues, UnitPosition, UnitValues,
};
use cms_common::{EntityId, Error, NodeId};

fn unit(title: &str) -> UnitValues {
    UnitValues {
        title: title.to_string(),
        heart_points: 5,
        gems: 1,
        published: false,
    }
}

fn step(title: &str) -> StepValues {
    StepValues {
        title: title.to_string(),
        step_type: StepType::Article,
        payload: StepPayload {
            kind: PayloadKind::Article,
            id: EntityId(42),
        },
    }
}

/// Two sections; the first holds three units, the second one unit with
/// three steps
fn sample() -> (Journey, Vec<NodeId>, Vec<NodeId>, Vec<NodeId>) {
    let mut journey = Journey::new("Sleep better");
    let s0 = journey.add_section(SectionValues { title: "Start".into() }).unwrap();
    let s1 = journey.add_section(SectionValues { title: "Next".into() }).unwrap();
    let units: Vec<NodeId> = ["A", "B", "C"]
        .iter()
        .map(|t| journey.add_unit(&s0, unit(t)).unwrap())
        .collect();
    let u = journey.add_unit(&s1, unit("D")).unwrap();
    let steps: Vec<NodeId> = ["one", "two", "three"]
        .iter()
        .map(|t| journey.add_step(&s1, &u, step(t)).unwrap())
        .collect();
    let mut all_units = units;
    all_units.push(u);
    (journey, vec![s0, s1], all_units, steps)
}

fn sorted(mut ids: Vec<NodeId>) -> Vec<String> {
    let mut out: Vec<String> = ids.drain(..).map(|id| id.to_string()).collect();
    out.sort();
    out
}

#[test]
fn test_delete_middle_unit_keeps_neighbours_in_order() {
    let (mut journey, sections, units, _) = sample();

    journey.delete_unit(&sections[0], &units[1]).unwrap();

    let remaining: Vec<&NodeId> = journey.sections[0].units.iter().map(|u| &u.id).collect();
    assert_eq!(remaining, vec![&units[0], &units[2]]);
}

#[test]
fn test_reorders_preserve_id_multiset() {
    let (mut journey, sections, _, _) = sample();
    let before = sorted(journey.node_ids());

    assert_eq!(journey.reorder_sections(0, 1).unwrap(), ReorderOutcome::Moved);
    assert_eq!(sorted(journey.node_ids()), before);

    // sections swapped: "Start" is now index 1
    let moved = journey
        .move_unit(
            &UnitPosition { section_id: sections[0].clone(), index: 2 },
            &UnitPosition { section_id: sections[1].clone(), index: 0 },
        )
        .unwrap();
    assert_eq!(moved, ReorderOutcome::Moved);
    assert_eq!(sorted(journey.node_ids()), before);
    assert_eq!(journey.sections[0].units.len(), 2);
    assert_eq!(journey.sections[0].units[0].title, "C");
    assert_eq!(journey.sections[1].units.len(), 2);
}

#[test]
fn test_move_unit_within_section() {
    let (mut journey, sections, units, _) = sample();
    journey
        .move_unit(
            &UnitPosition { section_id: sections[0].clone(), index: 0 },
            &UnitPosition { section_id: sections[0].clone(), index: 2 },
        )
        .unwrap();
    let order: Vec<&NodeId> = journey.sections[0].units.iter().map(|u| &u.id).collect();
    assert_eq!(order, vec![&units[1], &units[2], &units[0]]);
}

#[test]
fn test_move_unit_out_of_range_is_rejected_without_change() {
    let (mut journey, sections, _, _) = sample();
    let before = journey.clone();
    let result = journey.move_unit(
        &UnitPosition { section_id: sections[0].clone(), index: 7 },
        &UnitPosition { section_id: sections[1].clone(), index: 0 },
    );
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(journey, before);
}

#[test]
fn test_move_step_within_unit() {
    let (mut journey, sections, units, steps) = sample();
    let at = |index| StepPosition {
        section_id: sections[1].clone(),
        unit_id: units[3].clone(),
        index,
    };

    assert_eq!(journey.move_step(&at(2), &at(0)).unwrap(), ReorderOutcome::Moved);
    let order: Vec<&NodeId> = journey.sections[1].units[0].steps.iter().map(|s| &s.id).collect();
    assert_eq!(order, vec![&steps[2], &steps[0], &steps[1]]);

    assert_eq!(journey.move_step(&at(1), &at(1)).unwrap(), ReorderOutcome::Unchanged);
}

#[test]
fn test_cross_unit_step_move_is_ignored() {
    let (mut journey, sections, units, _) = sample();
    let before = journey.clone();
    let outcome = journey
        .move_step(
            &StepPosition {
                section_id: sections[1].clone(),
                unit_id: units[3].clone(),
                index: 0,
            },
            &StepPosition {
                section_id: sections[0].clone(),
                unit_id: units[0].clone(),
                index: 0,
            },
        )
        .unwrap();
    assert_eq!(outcome, ReorderOutcome::Ignored);
    assert_eq!(journey, before);
}

#[test]
fn test_edit_step_partial() {
    let (mut journey, sections, units, steps) = sample();
    journey
        .edit_step(
            &sections[1],
            &units[3],
            &steps[1],
            StepPatch {
                step_type: Some(StepType::Pair),
                ..Default::default()
            },
        )
        .unwrap();
    let edited = &journey.sections[1].units[0].steps[1];
    assert_eq!(edited.step_type, StepType::Pair);
    assert_eq!(edited.title, "two");
}

#[test]
fn test_blank_title_rejected_before_mutation() {
    let (mut journey, sections, _, _) = sample();
    let before = journey.clone();
    assert!(journey.add_unit(&sections[0], unit("  ")).is_err());
    assert_eq!(journey, before);
}

#[test]
fn test_wire_ids_untagged() {
    let json = serde_json::json!({
        "id": 3,
        "title": "Move more",
        "sections": [{
            "id": 11,
            "title": "Week 1",
            "units": [{
                "id": 21,
                "title": "Walk",
                "steps": [{
                    "id": 31,
                    "title": "Why walk",
                    "type": "single-select",
                    "payload": {"kind": "sub_section", "id": 8}
                }]
            }]
        }]
    });
    let journey = Journey::from_wire(json).unwrap();
    assert_eq!(journey.sections[0].id, NodeId::Server(11));
    assert_eq!(journey.sections[0].units[0].steps[0].step_type, StepType::SingleSelect);
    assert!(journey.status().is_none());

    let refs = journey.references();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].field, "sections.0.units.0.steps.0.payload");

    let back = journey.to_wire().unwrap();
    assert_eq!(back["sections"][0]["units"][0]["id"], 21);
}
