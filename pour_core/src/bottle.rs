//! Bottle descriptor: which servo positions mean "upright" and "pouring".

use crate::error::BuildError;

/// Default lower servo bound (pulse width in microseconds).
pub const SERVO_MIN: i32 = 1000;
/// Default upper servo bound (pulse width in microseconds).
pub const SERVO_MAX: i32 = 2000;

/// Inclusive legal range for servo targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoRange {
    pub min: i32,
    pub max: i32,
}

impl Default for ServoRange {
    fn default() -> Self {
        Self {
            min: SERVO_MIN,
            max: SERVO_MAX,
        }
    }
}

impl ServoRange {
    #[inline]
    pub fn contains(&self, pos: i32) -> bool {
        (self.min..=self.max).contains(&pos)
    }

    #[inline]
    pub fn clamp(&self, pos: i32) -> i32 {
        pos.clamp(self.min, self.max)
    }
}

/// One bottle on one servo. Positions are validated once at construction;
/// derived positions are computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bottle {
    number: u8,
    pos_down: i32,
    pos_up: i32,
    range: ServoRange,
    name: Option<String>,
}

impl Bottle {
    pub fn new(
        number: u8,
        pos_down: i32,
        pos_up: i32,
        range: ServoRange,
    ) -> Result<Self, BuildError> {
        if range.min >= range.max {
            return Err(BuildError::InvalidConfig("servo range is empty"));
        }
        if !range.contains(pos_down) {
            return Err(BuildError::InvalidConfig("pos_down outside servo range"));
        }
        if !range.contains(pos_up) {
            return Err(BuildError::InvalidConfig("pos_up outside servo range"));
        }
        if pos_down == pos_up {
            return Err(BuildError::InvalidConfig("pos_down must differ from pos_up"));
        }
        Ok(Self {
            number,
            pos_down,
            pos_up,
            range,
            name: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Pouring position.
    pub fn pos_down(&self) -> i32 {
        self.pos_down
    }

    /// Rest position, bottle upright.
    pub fn pos_up(&self) -> i32 {
        self.pos_up
    }

    pub fn range(&self) -> ServoRange {
        self.range
    }

    /// Midway between pouring and rest; where a finished pour parks so the
    /// next bottle can start while this one settles.
    pub fn pause_pos(&self) -> i32 {
        (self.pos_down + self.pos_up) / 2
    }

    /// Midway between pouring and pause; the baseline is weighed while
    /// turning here.
    pub fn below_pause_pos(&self) -> i32 {
        (self.pos_down + self.pause_pos()) / 2
    }

    /// `offset` units past rest, away from the pour position, clamped to the
    /// legal range. Used to park an empty bottle.
    pub fn past_rest_pos(&self, offset: i32) -> i32 {
        self.range.clamp(self.past_rest_unclamped(offset))
    }

    /// Whether `past_rest_pos(offset)` had to be pulled back into range.
    pub fn past_rest_is_clamped(&self, offset: i32) -> bool {
        !self.range.contains(self.past_rest_unclamped(offset))
    }

    fn past_rest_unclamped(&self, offset: i32) -> i32 {
        let away = if self.pos_up >= self.pos_down { 1 } else { -1 };
        self.pos_up.saturating_add(away * offset.max(0))
    }
}
