//! Entity graphic state module - runs once per simulation tick, choosing
//! which (graphicType, direction) each entity should currently display.

use crate::types::{ClientGraphicState, Entity, EntityGraphicSet, EntityGraphicType, Input};

/// Project-supplied override for entity graphic type selection. The base
/// engine never returns a type other than `NotSet`; a game layer can
/// implement this to add states like "stunned" or "casting" that take
/// priority over the Input-driven Run/Idle choice.
pub trait GraphicTypeExtension {
    fn get_updated_graphic_type(&self, entity: &Entity) -> EntityGraphicType;
}

/// An extension that never overrides anything, used when a caller has no
/// project-specific states to add.
pub struct NoGraphicTypeExtension;

impl GraphicTypeExtension for NoGraphicTypeExtension {
    fn get_updated_graphic_type(&self, _entity: &Entity) -> EntityGraphicType {
        EntityGraphicType::NotSet
    }
}

/// Runs the per-tick graphic state update for a single entity, given the
/// entity graphic set it draws from. Mutates `entity.client_graphic_state`
/// in place.
pub fn update_entity_graphic_state(
    entity: &mut Entity,
    graphic_set: &EntityGraphicSet,
    extension: &impl GraphicTypeExtension,
) {
    let current = entity.client_graphic_state;

    let desired_family = match extension.get_updated_graphic_type(entity) {
        EntityGraphicType::NotSet => {
            if entity.input.is_empty() {
                EntityGraphicType::Idle
            } else {
                EntityGraphicType::Run
            }
        }
        extension_type => extension_type,
    };

    let (resolved_type, resolved_direction) =
        graphic_set.resolve_fallback(desired_family, entity.rotation, current.direction);

    let type_changed = resolved_type != current.graphic_type;
    entity.client_graphic_state = ClientGraphicState {
        graphic_type: resolved_type,
        direction: resolved_direction,
        animation_start_time: current.animation_start_time,
        set_start_time: current.set_start_time || type_changed,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, GraphicId, GraphicState, Vector3};
    use std::collections::HashMap;

    fn sample_entity() -> Entity {
        Entity {
            id: 1,
            position: Vector3::ZERO,
            previous_position: None,
            input: Input::empty(),
            rotation: Direction::South,
            graphic_state: GraphicState::default(),
            client_graphic_state: ClientGraphicState::default(),
            av_effects: Vec::new(),
        }
    }

    fn sample_graphic_set() -> EntityGraphicSet {
        let mut graphics = HashMap::new();
        let mut idle = [GraphicId::NULL; 8];
        idle[Direction::South.to_index()] = GraphicId::from_sprite_id(1);
        graphics.insert(EntityGraphicType::Idle, idle);
        let mut run = [GraphicId::NULL; 8];
        run[Direction::South.to_index()] = GraphicId::from_sprite_id(2);
        graphics.insert(EntityGraphicType::Run, run);
        EntityGraphicSet { graphics, ..Default::default() }
    }

    #[test]
    fn idle_is_chosen_when_input_is_empty() {
        let mut entity = sample_entity();
        let set = sample_graphic_set();
        update_entity_graphic_state(&mut entity, &set, &NoGraphicTypeExtension);
        assert_eq!(entity.client_graphic_state.graphic_type, EntityGraphicType::Idle);
    }

    #[test]
    fn run_is_chosen_when_input_is_set() {
        let mut entity = sample_entity();
        entity.input = Input::UP;
        let set = sample_graphic_set();
        update_entity_graphic_state(&mut entity, &set, &NoGraphicTypeExtension);
        assert_eq!(entity.client_graphic_state.graphic_type, EntityGraphicType::Run);
    }

    #[test]
    fn type_change_sets_start_time_flag_but_direction_only_change_does_not() {
        let mut entity = sample_entity();
        let set = sample_graphic_set();
        update_entity_graphic_state(&mut entity, &set, &NoGraphicTypeExtension);
        assert!(entity.client_graphic_state.set_start_time);

        entity.client_graphic_state.set_start_time = false;
        entity.input = Input::empty();
        update_entity_graphic_state(&mut entity, &set, &NoGraphicTypeExtension);
        assert!(!entity.client_graphic_state.set_start_time);
    }
}
