//! Pitch-only flying model.
//!
//! Each frame the stick sets a target pitch velocity proportional to speed, the pitch
//! velocity approaches it with asymmetric acceleration, and speed is traded for height:
//! pitching up bleeds forward velocity, pitching down regains it. The nose also drifts
//! with speed and is pushed down by a constant tilt, so holding altitude requires
//! periodic swooping.
//!
//! # Units
//!
//! - Angles are 16-bit, 65536 units per turn. Pitch is clamped to ±0x2AAA (about 60°).
//! - Heights and speeds are in world units per frame.
//! - The control is the stick's vertical axis in `[-64, 64]`; positive pushes the nose down.
//!
//! # Determinism
//!
//! All integer updates use explicit wrapping/truncating casts and the sine is quantized,
//! so the same state and control always produce the same next state.

use crate::{CONTROL_LIMIT, ControlRangeError, Environment, FlightState};

pub use self::trig::{approach_i32, sins};

mod trig;

const MAX_PITCH: i16 = 0x2AAA;
const DOWN_TILT: i16 = 0x200;

/// The reference flight environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlightModel;

impl Environment for FlightModel {
    type State = FlightModelState;

    fn initial_state(&self, forward_velocity: f32, vertical_position: f32) -> Self::State {
        FlightModelState {
            forward_velocity,
            vertical_position,
            ..FlightModelState::default()
        }
    }

    fn step(&self, state: &mut Self::State) {
        state.advance();
    }
}

/// Snapshot of the flying agent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlightModelState {
    pitch: i16,
    pitch_velocity: i16,
    vertical_position: f32,
    forward_velocity: f32,
    stick_y: f32,
}

impl FlightModelState {
    /// Raw 16-bit pitch angle.
    #[must_use]
    pub fn pitch(&self) -> i16 {
        self.pitch
    }

    #[must_use]
    pub fn pitch_velocity(&self) -> i16 {
        self.pitch_velocity
    }

    /// Sets the stick, rejecting values outside `[-64, 64]`.
    pub fn try_set_control(&mut self, control: f32) -> Result<(), ControlRangeError> {
        if !(-CONTROL_LIMIT..=CONTROL_LIMIT).contains(&control) {
            return Err(ControlRangeError { value: control });
        }
        self.stick_y = control;
        Ok(())
    }

    #[expect(clippy::cast_possible_truncation)]
    fn update_pitch_velocity(&mut self) {
        let target = ((self.stick_y * (self.forward_velocity / 5.0)) as i16).wrapping_neg();
        let target = i32::from(target);
        let current = i32::from(self.pitch_velocity);

        let next = match target.cmp(&0) {
            std::cmp::Ordering::Greater if current < 0 => (current + 0x40).min(0x20),
            std::cmp::Ordering::Greater => approach_i32(current, target, 0x20, 0x40),
            std::cmp::Ordering::Less if current > 0 => (current - 0x40).max(-0x20),
            std::cmp::Ordering::Less => approach_i32(current, target, 0x40, 0x20),
            std::cmp::Ordering::Equal => approach_i32(current, 0, 0x40, 0x40),
        };
        self.pitch_velocity = next as i16;
    }

    #[expect(clippy::cast_possible_truncation)]
    fn advance(&mut self) {
        self.update_pitch_velocity();

        self.forward_velocity -= 2.0 * (f32::from(self.pitch) / 16384.0) + 0.1;
        if self.forward_velocity < 0.0 {
            self.forward_velocity = 0.0;
        }

        let pitch = f32::from(self.pitch);
        self.pitch = if self.forward_velocity > 16.0 {
            (pitch + (self.forward_velocity - 32.0) * 6.0) as i16
        } else if self.forward_velocity > 4.0 {
            (pitch + (self.forward_velocity - 32.0) * 10.0) as i16
        } else {
            self.pitch.wrapping_sub(0x400)
        };

        self.pitch = self
            .pitch
            .wrapping_add(self.pitch_velocity)
            .clamp(-MAX_PITCH, MAX_PITCH);

        self.vertical_position += self.forward_velocity * sins(self.pitch);

        self.pitch = self.pitch.wrapping_sub(DOWN_TILT).max(-MAX_PITCH);
    }
}

impl FlightState for FlightModelState {
    fn pitch_angle(&self) -> f32 {
        f32::from(self.pitch)
    }

    fn vertical_position(&self) -> f32 {
        self.vertical_position
    }

    fn forward_velocity(&self) -> f32 {
        self.forward_velocity
    }

    fn control(&self) -> f32 {
        self.stick_y
    }

    fn set_control(&mut self, control: f32) {
        debug_assert!(
            (-CONTROL_LIMIT..=CONTROL_LIMIT).contains(&control),
            "control {control} out of range"
        );
        self.stick_y = crate::clip_control(control);
    }
}

/// Replays a fixed control sequence and returns the highest position reached.
///
/// At most `cap` controls are applied. Replay stops at the first frame that ends below
/// `death_barrier`; that frame's height does not count. `state` is left at the last
/// simulated frame.
pub fn max_height_for_controls<E>(
    env: &E,
    state: &mut E::State,
    controls: &[f32],
    cap: usize,
    death_barrier: f32,
) -> f32
where
    E: Environment + ?Sized,
{
    let mut max_height = state.vertical_position();
    for &control in controls.iter().take(cap) {
        state.set_control(control);
        env.step(state);
        if crate::is_below_barrier(state, death_barrier) {
            break;
        }
        max_height = max_height.max(state.vertical_position());
    }
    max_height
}

#[cfg(test)]
mod tests {
    use crate::{DEFAULT_DEATH_BARRIER, LaunchParams};

    use super::*;

    fn launch() -> FlightModelState {
        LaunchParams::default().launch(&FlightModel)
    }

    #[test]
    fn test_initial_state_is_at_rest() {
        let state = FlightModel.initial_state(50.0, 2000.0);
        assert_eq!(state.pitch(), 0);
        assert_eq!(state.pitch_velocity(), 0);
        assert_eq!(state.forward_velocity(), 50.0);
        assert_eq!(state.vertical_position(), 2000.0);
        assert_eq!(state.control(), 0.0);
    }

    #[test]
    fn test_step_is_deterministic() {
        let mut a = launch();
        let mut b = launch();
        for i in 0..300 {
            #[expect(clippy::cast_precision_loss)]
            let control = ((i % 9) as f32 - 4.0) * 16.0;
            a.set_control(control);
            b.set_control(control);
            FlightModel.step(&mut a);
            FlightModel.step(&mut b);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = launch();
        let mut branch = original.clone();
        branch.set_control(64.0);
        FlightModel.step(&mut branch);
        assert_eq!(original, launch());
        assert_ne!(original, branch);
    }

    #[test]
    fn test_pitch_stays_clamped() {
        let mut state = launch();
        for control in [64.0, -64.0] {
            for _ in 0..200 {
                state.set_control(control);
                FlightModel.step(&mut state);
                assert!((-MAX_PITCH..=MAX_PITCH).contains(&state.pitch()));
                assert!(state.forward_velocity() >= 0.0);
            }
        }
    }

    #[test]
    fn test_first_frame_from_level_flight() {
        // Level at speed 113: speed drops to 112.9, the nose drifts up by
        // trunc((112.9 - 32) * 6) = 485, then tilts down.
        let mut state = launch();
        FlightModel.step(&mut state);
        assert_eq!(state.pitch_velocity(), 0);
        assert!((state.forward_velocity() - 112.9).abs() < 1e-4);
        assert_eq!(state.pitch(), 485 - 0x200);
        let expected = -2200.0 + state.forward_velocity() * sins(485);
        assert_eq!(state.vertical_position(), expected);
    }

    #[test]
    fn test_positive_stick_pitches_nose_down() {
        let mut state = launch();
        state.set_control(64.0);
        FlightModel.step(&mut state);
        assert!(state.pitch_velocity() < 0);
    }

    #[test]
    fn test_try_set_control_rejects_out_of_range() {
        let mut state = launch();
        assert!(state.try_set_control(64.0).is_ok());
        assert!(state.try_set_control(-64.0).is_ok());
        let err = state.try_set_control(65.0).unwrap_err();
        assert_eq!(err.value, 65.0);
        assert_eq!(state.control(), -64.0);
    }

    #[test]
    fn test_max_height_for_controls_respects_cap() {
        let controls = vec![0.0; 50];
        let mut capped = launch();
        let mut full = launch();
        let _ = max_height_for_controls(
            &FlightModel,
            &mut capped,
            &controls,
            10,
            DEFAULT_DEATH_BARRIER,
        );
        let _ = max_height_for_controls(
            &FlightModel,
            &mut full,
            &controls,
            50,
            DEFAULT_DEATH_BARRIER,
        );

        let mut manual = launch();
        for _ in 0..10 {
            FlightModel.step(&mut manual);
        }
        assert_eq!(capped, manual);
        assert_ne!(capped, full);
    }

    #[test]
    fn test_max_height_for_controls_includes_start() {
        let mut state = launch();
        let max_height =
            max_height_for_controls(&FlightModel, &mut state, &[], 100, DEFAULT_DEATH_BARRIER);
        assert_eq!(max_height, -2200.0);
    }
}
