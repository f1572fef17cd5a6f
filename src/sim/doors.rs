/// Door schedule: which doors close, in what order, and when.
///
/// ## Lifecycle
///
///   pending ──(timer > DOOR_CLOSE_TIME, door is `next`)──▶ closed
///
/// A door moves exactly once and at most one door closes per interval.
/// `next` is `None` whenever `pending` is empty, so there is never an index
/// into an empty collection.
///
/// The timer only resets when a door closes. With nothing pending it keeps
/// accumulating and nothing happens.

use rand::Rng;
use tracing::info;

use crate::domain::entity::Door;
use crate::domain::grid::TileGrid;

/// Seconds between door closures.
pub const DOOR_CLOSE_TIME: f32 = 10.0;

#[derive(Clone, Debug, Default)]
pub struct DoorSchedule {
    pending: Vec<Door>,
    closed: Vec<Door>,
    next: Option<usize>,
    timer: f32,
}

impl DoorSchedule {
    pub fn new() -> Self {
        DoorSchedule::default()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.closed.clear();
        self.next = None;
        self.timer = 0.0;
    }

    pub fn queue(&mut self, door: Door) {
        self.pending.push(door);
    }

    pub fn pending(&self) -> &[Door] {
        &self.pending
    }

    pub fn closed(&self) -> &[Door] {
        &self.closed
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// The door that will close next, if any remain.
    pub fn next_to_close(&self) -> Option<&Door> {
        self.next.and_then(|i| self.pending.get(i))
    }

    /// Draw the next door uniformly from the pending ones.
    pub fn pick_next<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.next = if self.pending.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.pending.len()))
        };
    }

    /// Advance the timer; close the selected door when it runs out.
    /// Returns the door that closed this tick.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, grid: &mut TileGrid, rng: &mut R) -> Option<Door> {
        self.timer += dt;

        if self.timer <= DOOR_CLOSE_TIME {
            return None;
        }
        let index = self.next?;
        self.timer = 0.0;

        let door = self.pending.remove(index);
        if let Some(closed) = grid.get_at(door.cell).closed() {
            grid.set_at(door.cell, closed);
        }
        self.closed.push(door);
        self.pick_next(rng);

        info!(
            door = ?door.cell, room = ?door.room, remaining = self.pending.len(),
            "door closed"
        );
        Some(door)
    }
}
