use glam::Vec2;
use labyrinth::InputButtons;

/// Input gathered for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub buttons: InputButtons,
    /// Accumulated look delta in radians: x is yaw, y is pitch.
    pub look: Vec2,
}

/// Held movement keys and look motion, fed by whatever captures input.
#[derive(Debug, Default)]
pub struct Input {
    held: InputButtons,
    look_delta: Vec2,
}

impl Input {
    pub fn set_button(&mut self, button: InputButtons, pressed: bool) {
        self.held.set(button, pressed);
    }

    pub fn set_held(&mut self, buttons: InputButtons) {
        self.held = buttons;
    }

    pub fn held(&self) -> InputButtons {
        self.held
    }

    pub fn is_forward_held(&self) -> bool {
        self.held.contains(InputButtons::FORWARD)
    }

    pub fn is_backward_held(&self) -> bool {
        self.held.contains(InputButtons::BACK)
    }

    pub fn is_left_held(&self) -> bool {
        self.held.contains(InputButtons::LEFT)
    }

    pub fn is_right_held(&self) -> bool {
        self.held.contains(InputButtons::RIGHT)
    }

    pub fn accumulate_look(&mut self, yaw: f32, pitch: f32) {
        self.look_delta += Vec2::new(yaw, pitch);
    }

    /// Takes the frame's input: held buttons stay, look motion is consumed.
    pub fn sample(&mut self) -> FrameInput {
        FrameInput {
            buttons: self.held,
            look: std::mem::take(&mut self.look_delta),
        }
    }
}
