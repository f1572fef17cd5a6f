/// Logical input actions and the input collaborator boundary.
///
/// The core only ever asks "is this action held" / "was it just pressed";
/// key codes and devices belong to the front-end.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Sprint,
    GiveUp,    // end the round voluntarily
    Continue,  // leave the end screen
    Quit,
}

pub trait InputSource {
    /// Held this frame (continuous actions: movement, sprint).
    fn is_held(&self, action: Action) -> bool;
    /// Went from released to held this frame (one-shot actions).
    fn was_pressed(&self, action: Action) -> bool;
}

/// Fixed set of held/pressed actions. Lets tests and replays drive the
/// simulation without a device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub held: Vec<Action>,
    pub pressed: Vec<Action>,
}

impl FrameInput {
    pub fn none() -> Self {
        FrameInput::default()
    }

    pub fn holding(actions: &[Action]) -> Self {
        FrameInput { held: actions.to_vec(), pressed: vec![] }
    }
}

impl InputSource for FrameInput {
    fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }
}
