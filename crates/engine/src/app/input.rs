#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    NextFloor,
    PreviousFloor,
    Reload,
    Quit,
}

const ACTION_COUNT: usize = 4;

/// Edge-triggered action latches: a press is reported for exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionEdges {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionEdges {
    pub(crate) fn set_down(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn mark_pressed(&mut self, action: InputAction) {
        self.pressed[action.index()] = true;
    }

    pub(crate) fn clear_pressed(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::NextFloor => 0,
            InputAction::PreviousFloor => 1,
            InputAction::Reload => 2,
            InputAction::Quit => 3,
        }
    }
}
