/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held (diagonals included)
///   - Edge-triggered one-shot actions (give up, continue, quit)
///   - Sprint, which terminals can't report as a bare Shift press
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// ## Sprint
///
/// Sprint is held while movement keys keep arriving with the Shift modifier,
/// or while `f` is held. Shift expires on the same timeout as any other key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use officeheist::domain::input::{Action, InputSource};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Keys bound to each action. Letters are stored lowercase.
fn bindings(action: Action) -> &'static [KeyCode] {
    match action {
        Action::MoveLeft => &[KeyCode::Left, KeyCode::Char('a')],
        Action::MoveRight => &[KeyCode::Right, KeyCode::Char('d')],
        Action::MoveUp => &[KeyCode::Up, KeyCode::Char('w')],
        Action::MoveDown => &[KeyCode::Down, KeyCode::Char('s')],
        Action::Sprint => &[KeyCode::Char('f')],
        Action::GiveUp => &[KeyCode::Char('r')],
        Action::Continue => &[KeyCode::Char(' ')],
        Action::Quit => &[KeyCode::Esc],
    }
}

fn is_movement(code: KeyCode) -> bool {
    [Action::MoveLeft, Action::MoveRight, Action::MoveUp, Action::MoveDown]
        .iter()
        .any(|&a| bindings(a).contains(&code))
}

/// Shift+letter arrives as the uppercase letter; fold it back.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Last time a movement key arrived with Shift down.
    last_shift: Option<Instant>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            last_shift: None,
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    /// Apply one key event at time `now`.
    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        let code = normalize(key.code);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held_at(code, now);
                self.last_active.insert(code, now);
                if !was_held {
                    self.fresh_presses.push(code);
                }
                if is_movement(code) && key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.last_shift = Some(now);
                }
            }
        }
    }

    /// Expire keys that have timed out (fallback for terminals without Release)
    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        if self.last_shift.is_some_and(|t| now.duration_since(t) >= HOLD_TIMEOUT) {
            self.last_shift = None;
        }
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    fn key_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }
}

impl InputSource for InputState {
    fn is_held(&self, action: Action) -> bool {
        let bound = bindings(action).iter().any(|&c| self.key_held(c));
        match action {
            Action::Sprint => bound || self.last_shift.is_some(),
            _ => bound,
        }
    }

    fn was_pressed(&self, action: Action) -> bool {
        bindings(action).iter().any(|c| self.fresh_presses.contains(c))
    }
}
