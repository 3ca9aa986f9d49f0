/// A simulation snapshot.
///
/// `Clone` must produce an independent deep copy: stepping or re-controlling a clone
/// never affects the original. The control input is part of the snapshot, so every
/// branch carries its own.
pub trait FlightState: Clone {
    /// Pitch of the agent, in the environment's angle units.
    fn pitch_angle(&self) -> f32;

    /// Height of the agent. This is the quantity being maximized.
    fn vertical_position(&self) -> f32;

    /// Forward speed of the agent. Never negative.
    fn forward_velocity(&self) -> f32;

    /// Control input applied on the next step.
    fn control(&self) -> f32;

    /// Sets the control input for the next step.
    ///
    /// Callers keep `control` inside `[-64, 64]`.
    fn set_control(&mut self, control: f32);
}

/// A deterministic state-transition oracle.
pub trait Environment {
    type State: FlightState;

    /// Creates a state with the given speed and height and every other field at rest.
    fn initial_state(&self, forward_velocity: f32, vertical_position: f32) -> Self::State;

    /// Advances `state` by exactly one frame under its current control input.
    fn step(&self, state: &mut Self::State);
}

/// Returns `true` if `state` has fallen below the death barrier.
#[must_use]
pub fn is_below_barrier<S>(state: &S, death_barrier: f32) -> bool
where
    S: FlightState,
{
    state.vertical_position() < death_barrier
}
