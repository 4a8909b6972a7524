//! Action id contract shared by manual control, the policy table and replay
//! labels.

/// Discrete actions understood by the sandbox environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    Pickup = 4,
    Dropoff = 5,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Pickup,
        Action::Dropoff,
    ];

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Single character used in the policy table.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Down => '↓',
            Action::Left => '←',
            Action::Right => '→',
            Action::Pickup => 'P',
            Action::Dropoff => 'D',
        }
    }

    /// Replay label. Only the directional actions have one.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Action::Up => Some("↑ Up"),
            Action::Down => Some("↓ Down"),
            Action::Left => Some("← Left"),
            Action::Right => Some("→ Right"),
            Action::Pickup | Action::Dropoff => None,
        }
    }

    /// Keyboard and command aliases for the directional actions.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "up" | "arrowup" | "w" | "k" => Some(Action::Up),
            "down" | "arrowdown" | "s" | "j" => Some(Action::Down),
            "left" | "arrowleft" | "a" | "h" => Some(Action::Left),
            "right" | "arrowright" | "d" | "l" => Some(Action::Right),
            _ => None,
        }
    }
}

/// Glyph for a policy entry; ids outside the contract show as `?`.
#[must_use]
pub fn policy_glyph(id: u8) -> char {
    Action::from_id(id).map_or('?', Action::glyph)
}

/// Label shown while replaying a trajectory, falling back to the bare id.
#[must_use]
pub fn action_label(id: u8) -> String {
    Action::from_id(id)
        .and_then(Action::label)
        .map_or_else(|| id.to_string(), str::to_owned)
}
