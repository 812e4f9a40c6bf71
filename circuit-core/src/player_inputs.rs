#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DirectionKey {
    Up,
    Down,
    Left,
    Right,
}

// InputState is whatever the local input provider says is held right now;
// the simulation reads it once per tick
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, key: DirectionKey, pressed: bool) {
        match key {
            DirectionKey::Up => self.up = pressed,
            DirectionKey::Down => self.down = pressed,
            DirectionKey::Left => self.left = pressed,
            DirectionKey::Right => self.right = pressed,
        }
    }

    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}
