use glam::Vec2;
use rkyv::{Archive, Deserialize, Serialize};

/// An undirected wall line on the ground plane, exactly as the server sends it.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct RawSegment {
    pub x0: f32,
    pub z0: f32,
    pub x1: f32,
    pub z1: f32,
}

impl RawSegment {
    pub fn new(x0: f32, z0: f32, x1: f32, z1: f32) -> Self {
        Self { x0, z0, x1, z1 }
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.z0.is_finite() && self.x1.is_finite() && self.z1.is_finite()
    }
}

impl From<(f32, f32, f32, f32)> for RawSegment {
    fn from((x0, z0, x1, z1): (f32, f32, f32, f32)) -> Self {
        Self::new(x0, z0, x1, z1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    /// Runs along X at a constant Z.
    Horizontal,
    /// Runs along Z at a constant X.
    Vertical,
}

/// A segment with a dominant axis and its endpoints ordered low to high
/// along that axis. `start` and `end` are ground-plane points (x, z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub orientation: Orientation,
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    /// Normalizes a raw segment. Returns `None` for non-finite or
    /// near-zero-length input.
    pub fn normalize(raw: &RawSegment, tolerance: f32) -> Option<Self> {
        if !raw.is_finite() {
            return None;
        }

        let a = Vec2::new(raw.x0, raw.z0);
        let b = Vec2::new(raw.x1, raw.z1);
        let delta = b - a;

        if delta.length() <= tolerance {
            return None;
        }

        let orientation = if delta.x.abs() >= delta.y.abs() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };

        let (start, end) = match orientation {
            Orientation::Horizontal if a.x <= b.x => (a, b),
            Orientation::Vertical if a.y <= b.y => (a, b),
            _ => (b, a),
        };

        Some(Self {
            orientation,
            start,
            end,
        })
    }

    /// Builds an axis-aligned run from its cross coordinate and running span.
    pub fn axis_aligned(orientation: Orientation, cross: f32, from: f32, to: f32) -> Self {
        let (start, end) = match orientation {
            Orientation::Horizontal => (Vec2::new(from, cross), Vec2::new(to, cross)),
            Orientation::Vertical => (Vec2::new(cross, from), Vec2::new(cross, to)),
        };
        Self {
            orientation,
            start,
            end,
        }
    }

    /// Coordinate along the dominant axis at `start` and `end`.
    pub fn running(&self) -> (f32, f32) {
        match self.orientation {
            Orientation::Horizontal => (self.start.x, self.end.x),
            Orientation::Vertical => (self.start.y, self.end.y),
        }
    }

    /// Coordinate on the other axis, taken at the midpoint.
    pub fn cross(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => (self.start.y + self.end.y) * 0.5,
            Orientation::Vertical => (self.start.x + self.end.x) * 0.5,
        }
    }

    /// True when both endpoints share the cross coordinate within `tolerance`.
    pub fn is_axis_aligned(&self, tolerance: f32) -> bool {
        match self.orientation {
            Orientation::Horizontal => (self.end.y - self.start.y).abs() <= tolerance,
            Orientation::Vertical => (self.end.x - self.start.x).abs() <= tolerance,
        }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit vector from `start` to `end`.
    pub fn direction(&self) -> Vec2 {
        (self.end - self.start).normalize_or_zero()
    }

    pub fn to_raw(&self) -> RawSegment {
        RawSegment::new(self.start.x, self.start.y, self.end.x, self.end.y)
    }
}
