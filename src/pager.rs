use serde::{Deserialize, Serialize};

/// Minimum travel for a fling to count, in pixels
const SWIPE_THRESHOLD: f32 = 100.0;
/// Minimum fling velocity, in pixels per second
const SWIPE_VELOCITY_THRESHOLD: f32 = 100.0;
/// Vertical drift tolerated for a page swipe away from a scroll boundary
const OVERSHOOT_THRESHOLD: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// What a touch on the widget means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    PageChange(Direction),
    Scroll(Direction),
    OpenNote,
    ToggleCompact,
    ShowOverlay,
}

impl Gesture {
    /// Page offset for a swipe: left moves to the next note, right to the
    /// previous one
    pub fn page_delta(self) -> isize {
        match self {
            Gesture::PageChange(Direction::Left) => 1,
            Gesture::PageChange(Direction::Right) => -1,
            _ => 0,
        }
    }
}

/// Discrete touches recognised by the host's gesture detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    Tap,
    DoubleTap,
    LongPress,
}

impl From<Touch> for Gesture {
    fn from(touch: Touch) -> Self {
        match touch {
            Touch::Tap => Gesture::OpenNote,
            Touch::DoubleTap => Gesture::ToggleCompact,
            Touch::LongPress => Gesture::ShowOverlay,
        }
    }
}

/// Travel and velocity of a completed fling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fling {
    pub dx: f32,
    pub dy: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

/// Classify a fling. Vertical movement wins over horizontal; horizontal
/// swipes only change pages at a scroll boundary or when nearly level.
pub fn classify_fling(fling: Fling, at_scroll_boundary: bool) -> Option<Gesture> {
    let abs_dx = fling.dx.abs();
    let abs_dy = fling.dy.abs();

    if abs_dy > abs_dx {
        if abs_dy > SWIPE_THRESHOLD && fling.velocity_y.abs() > SWIPE_VELOCITY_THRESHOLD {
            let direction = if fling.dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            };
            return Some(Gesture::Scroll(direction));
        }
    } else if abs_dx > SWIPE_THRESHOLD
        && fling.velocity_x.abs() > SWIPE_VELOCITY_THRESHOLD
        && (at_scroll_boundary || abs_dy < OVERSHOOT_THRESHOLD)
    {
        let direction = if fling.dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        };
        return Some(Gesture::PageChange(direction));
    }
    None
}

/// Per-widget navigation state: which note is showing and whether the
/// widget is in compact mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    current: usize,
    compact: bool,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current page, clamped to a deck of `count` notes
    pub fn page(&self, count: usize) -> Option<usize> {
        if count == 0 {
            None
        } else {
            Some(self.current.min(count - 1))
        }
    }

    /// Move by `delta` pages, wrapping around at both ends
    pub fn navigate(&mut self, delta: isize, count: usize) -> Option<usize> {
        let current = self.page(count)?;
        let step = delta.rem_euclid(count as isize) as usize;
        self.current = (current + step) % count;
        Some(self.current)
    }

    pub fn next(&mut self, count: usize) -> Option<usize> {
        self.navigate(1, count)
    }

    pub fn prev(&mut self, count: usize) -> Option<usize> {
        self.navigate(-1, count)
    }

    /// Keep the page in range after notes were removed
    pub fn clamp(&mut self, count: usize) {
        if let Some(page) = self.page(count) {
            self.current = page;
        }
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn set_compact(&mut self, compact: bool) {
        self.compact = compact;
    }

    /// Apply a gesture. Returns true if the widget needs redrawing; opening
    /// notes, scrolling and overlays are left to the host.
    pub fn handle(&mut self, gesture: Gesture, count: usize) -> bool {
        match gesture {
            Gesture::PageChange(_) => self.navigate(gesture.page_delta(), count).is_some(),
            Gesture::ToggleCompact => {
                self.compact = !self.compact;
                true
            }
            Gesture::Scroll(_) | Gesture::OpenNote | Gesture::ShowOverlay => false,
        }
    }

    /// Page dots such as `○  ●  ○`
    pub fn indicator(&self, count: usize) -> String {
        let current = self.page(count);
        (0..count)
            .map(|i| if Some(i) == current { "●" } else { "○" })
            .collect::<Vec<_>>()
            .join("  ")
    }
}
