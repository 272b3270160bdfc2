//! A/V system module - per-tick visual effect expiration and the A/V entity
//! phase machine (movement/spells/impacts driven by authored phase chains).

use crate::graphic_data::GraphicData;
use crate::types::{
    AVEntity, AVEntityDefinition, AVEntityState, Behavior, ClientGraphicState, Direction,
    EntityGraphicType, EntityId, GraphicRef, LoopMode, VisualEffectDefinition, VisualEffectState,
    Vector3,
};

/// Moves `current` towards `target` by at most `max_distance`, clamping
/// exactly onto `target` rather than overshooting.
pub fn move_towards(current: Vector3, target: Vector3, max_distance: f32) -> Vector3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_distance || distance == 0.0 {
        return target;
    }
    current + delta.scaled(max_distance / distance)
}

/// Resolves a phase's target position given its behavior. Returns `None`
/// when the target entity has vanished, or when `CurrentPosition` is used
/// as a first phase (invalid - it has nothing to reference).
pub fn get_target_position(
    behavior: Behavior,
    target_entity: Option<EntityId>,
    target_position: Option<Vector3>,
    current_position: Vector3,
    is_first_phase: bool,
    lookup_entity_position: impl Fn(EntityId) -> Option<Vector3>,
) -> Option<Vector3> {
    match behavior {
        Behavior::MoveToEntity | Behavior::FollowEntityStartCaster | Behavior::FollowEntityStartTarget => {
            target_entity.and_then(&lookup_entity_position)
        }
        Behavior::MoveToPosition | Behavior::FollowDirection | Behavior::StaticPosition => target_position,
        Behavior::CurrentPosition => {
            if is_first_phase {
                None
            } else {
                Some(current_position)
            }
        }
    }
}

/// The position, graphic family, and direction an A/V entity's phase starts
/// with. Returns `None` for the invalid first-phase `CurrentPosition` case.
pub fn get_start_state(
    behavior: Behavior,
    caster_position: Vector3,
    target_position: Vector3,
    start_distance: f32,
) -> Option<(Vector3, EntityGraphicType, Direction)> {
    match behavior {
        Behavior::MoveToEntity | Behavior::FollowEntityStartCaster | Behavior::MoveToPosition | Behavior::FollowDirection => {
            let direction_vec = (target_position - caster_position).normalized();
            let start_position = caster_position + direction_vec.scaled(start_distance);
            Some((start_position, EntityGraphicType::Run, Direction::from_vector(direction_vec)))
        }
        Behavior::FollowEntityStartTarget | Behavior::StaticPosition => {
            Some((target_position, EntityGraphicType::Idle, Direction::South))
        }
        Behavior::CurrentPosition => None,
    }
}

/// The graphic family and direction a phase should display given its
/// current caster/target positions - used every tick, not just at phase
/// start, so a moving phase's facing direction keeps tracking its target.
pub fn get_graphic_state(behavior: Behavior, caster_position: Vector3, target_position: Vector3) -> (EntityGraphicType, Direction) {
    match behavior {
        Behavior::MoveToEntity | Behavior::FollowEntityStartCaster | Behavior::MoveToPosition | Behavior::FollowDirection => {
            let direction_vec = (target_position - caster_position).normalized();
            (EntityGraphicType::Run, Direction::from_vector(direction_vec))
        }
        Behavior::FollowEntityStartTarget | Behavior::StaticPosition | Behavior::CurrentPosition => {
            (EntityGraphicType::Idle, Direction::South)
        }
    }
}

/// Time-based completion predicate for Follow/Static/CurrentPosition phases.
pub fn time_elapsed(
    behavior: Behavior,
    start_time: f64,
    duration_s: f32,
    current_time: f64,
    current_graphic: GraphicRef<'_>,
    sim_tick_timestep_s: f64,
) -> bool {
    if !behavior.is_time_based() {
        return false;
    }
    if start_time == 0.0 {
        return false;
    }
    if duration_s != -1.0 {
        return current_time >= start_time + duration_s as f64;
    }
    match current_graphic {
        GraphicRef::Sprite(_) => true,
        GraphicRef::Animation(animation) => {
            let end_time = start_time + animation.length_s() - sim_tick_timestep_s;
            current_time >= end_time
        }
    }
}

/// Position-based completion predicate for MoveToEntity/MoveToPosition.
pub fn position_reached(behavior: Behavior, entity_pos: Vector3, target_pos: Vector3) -> bool {
    behavior.is_position_based() && entity_pos == target_pos
}

/// Removes any visual effect whose lifetime has elapsed. Skips effects that
/// haven't been rendered yet (`start_time == 0`), since the sorter hasn't
/// had a chance to start their clock.
pub fn expire_visual_effects(
    effects: &mut Vec<VisualEffectState>,
    definitions: &[VisualEffectDefinition],
    graphic_data: &GraphicData,
    current_time: f64,
) {
    effects.retain(|effect| {
        if effect.start_time == 0.0 {
            return true;
        }
        let Some(definition) = definitions.iter().find(|d| d.numeric_id == effect.definition_id) else {
            return false;
        };
        let end_time = match (definition.loop_mode, graphic_data.get_graphic(definition.graphic_id)) {
            (LoopMode::PlayOnce, Ok(GraphicRef::Animation(animation))) => effect.start_time + animation.length_s(),
            _ => effect.start_time + definition.loop_time,
        };
        current_time < end_time
    });
}

/// The outcome of stepping one A/V entity forward one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    Destroy,
}

/// Advances a single A/V entity by one simulation tick: phase completion,
/// destruction, motion, and graphic recomputation. `current_time` is the
/// simulation's running clock; `lookup_entity_position` resolves a
/// `targetEntity` reference to its current world position.
pub fn step_av_entity(
    av_entity: &mut AVEntity,
    definition: &AVEntityDefinition,
    current_time: f64,
    sim_tick_timestep_s: f64,
    graphic_data: &GraphicData,
    lookup_entity_position: impl Fn(EntityId) -> Option<Vector3>,
) -> StepOutcome {
    let state = &mut av_entity.av_state;

    if state.current_phase_index >= definition.phases.len() {
        return StepOutcome::Destroy;
    }

    let phase = definition.phases[state.current_phase_index];
    let is_first_phase = state.current_phase_index == 0;

    let Some(target_position) = get_target_position(
        phase.behavior,
        state.target_entity,
        state.target_position,
        av_entity.position,
        is_first_phase,
        &lookup_entity_position,
    ) else {
        return StepOutcome::Destroy;
    };

    let Ok(graphic_set) = graphic_data.get_entity_graphic_set(av_entity.graphic_state.graphic_set_id) else {
        return StepOutcome::Destroy;
    };
    let Some(graphic_id) = graphic_set.graphic(
        av_entity.client_graphic_state.graphic_type,
        av_entity.client_graphic_state.direction,
    ) else {
        return StepOutcome::Destroy;
    };
    let Ok(current_graphic) = graphic_data.get_graphic(graphic_id) else {
        return StepOutcome::Destroy;
    };

    let time_done = time_elapsed(
        phase.behavior,
        state.phase_start_time,
        phase.duration_s,
        current_time,
        current_graphic,
        sim_tick_timestep_s,
    );
    let position_done = position_reached(phase.behavior, av_entity.position, target_position);

    if time_done || position_done {
        let previous_graphic_set = phase.graphic_set_id;
        state.current_phase_index += 1;
        if state.current_phase_index >= definition.phases.len() {
            return StepOutcome::Destroy;
        }
        state.set_start_time = true;
        if definition.phases[state.current_phase_index].graphic_set_id != previous_graphic_set {
            av_entity.client_graphic_state.set_start_time = true;
        }
    }

    let phase = definition.phases[state.current_phase_index];
    let is_first_phase = state.current_phase_index == 0;
    let Some(target_position) = get_target_position(
        phase.behavior,
        state.target_entity,
        state.target_position,
        av_entity.position,
        is_first_phase,
        &lookup_entity_position,
    ) else {
        return StepOutcome::Destroy;
    };

    av_entity.previous_position = Some(av_entity.position);
    let max_distance = phase.movement_speed * sim_tick_timestep_s as f32;
    let mut new_position = move_towards(av_entity.position, target_position, max_distance);
    if !definition.can_move_vertically {
        new_position.z = av_entity.position.z;
    }
    av_entity.position = new_position;

    let (desired_family, direction) = get_graphic_state(phase.behavior, av_entity.position, target_position);
    let current = av_entity.client_graphic_state;
    let type_changed = desired_family != current.graphic_type;
    av_entity.client_graphic_state = ClientGraphicState {
        graphic_type: desired_family,
        direction,
        animation_start_time: current.animation_start_time,
        set_start_time: current.set_start_time || type_changed,
    };

    StepOutcome::Alive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_towards_clamps_to_target_when_within_range() {
        let result = move_towards(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0), 5.0);
        assert_eq!(result, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn move_towards_steps_partway_when_distance_exceeds_max() {
        let result = move_towards(Vector3::ZERO, Vector3::new(10.0, 0.0, 0.0), 4.0);
        assert_eq!(result, Vector3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn get_target_position_current_position_invalid_on_first_phase() {
        let result = get_target_position(Behavior::CurrentPosition, None, None, Vector3::ZERO, true, |_| None);
        assert!(result.is_none());
    }

    #[test]
    fn get_target_position_current_position_valid_on_later_phase() {
        let result = get_target_position(Behavior::CurrentPosition, None, None, Vector3::new(1.0, 2.0, 0.0), false, |_| None);
        assert_eq!(result, Some(Vector3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn get_target_position_move_to_entity_returns_none_when_gone() {
        let result = get_target_position(Behavior::MoveToEntity, Some(7), None, Vector3::ZERO, false, |_| None);
        assert!(result.is_none());
    }

    #[test]
    fn position_reached_ignores_time_based_behaviors() {
        assert!(!position_reached(Behavior::StaticPosition, Vector3::ZERO, Vector3::ZERO));
    }

    #[test]
    fn position_reached_true_on_exact_match_for_move_behaviors() {
        assert!(position_reached(Behavior::MoveToPosition, Vector3::ZERO, Vector3::ZERO));
    }
}
