use std::collections::HashMap;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::config::GeometryConfig;
use super::segment::Segment;

/// A renderable wall box. The box's length runs along its local X axis,
/// thickness along local Z, and `yaw` rotates it about +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallPrimitive {
    pub center: Vec3,
    pub length: f32,
    pub height: f32,
    pub thickness: f32,
    pub yaw: f32,
}

impl WallPrimitive {
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.length * 0.5, self.height * 0.5, self.thickness * 0.5)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Ground-plane direction of the wall's length.
    pub fn direction(&self) -> Vec2 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec2::new(cos, -sin)
    }

    /// Trimmed endpoints on the ground plane.
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        let center = Vec2::new(self.center.x, self.center.z);
        let half = self.direction() * (self.length * 0.5);
        (center - half, center + half)
    }
}

/// Axis-aligned extents of a set of ground-plane points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min: Vec2,
    pub max: Vec2,
}

impl Extents {
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: acc.min.min(p),
                max: acc.max.max(p),
            },
        ))
    }

    pub fn of_runs(runs: &[Segment]) -> Option<Self> {
        Self::from_points(runs.iter().flat_map(|r| [r.start, r.end]))
    }

    /// True when `point` lies within `tolerance` of any edge line.
    pub fn on_border(&self, point: Vec2, tolerance: f32) -> bool {
        (point.x - self.min.x).abs() <= tolerance
            || (point.x - self.max.x).abs() <= tolerance
            || (point.y - self.min.y).abs() <= tolerance
            || (point.y - self.max.y).abs() <= tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JunctionKey(pub i64, pub i64);

/// Groups segment endpoints that coincide within tolerance.
///
/// Points are quantized to a grid of `tolerance`-sized cells. Two points
/// closer than the tolerance on both axes land in the same or adjacent
/// cells, so a lookup searches the neighbourhood and reuses the first key
/// already present.
#[derive(Debug)]
pub struct JunctionMap {
    cell: f32,
    directions: HashMap<JunctionKey, Vec<Vec2>>,
}

impl JunctionMap {
    pub fn new(tolerance: f32) -> Self {
        Self {
            cell: tolerance.max(f32::EPSILON),
            directions: HashMap::new(),
        }
    }

    fn quantize(&self, point: Vec2) -> JunctionKey {
        JunctionKey(
            (point.x / self.cell).round() as i64,
            (point.y / self.cell).round() as i64,
        )
    }

    pub fn key(&self, point: Vec2) -> JunctionKey {
        let own = self.quantize(point);
        if self.directions.contains_key(&own) {
            return own;
        }
        for dx in -1..=1 {
            for dz in -1..=1 {
                let neighbour = JunctionKey(own.0 + dx, own.1 + dz);
                if self.directions.contains_key(&neighbour) {
                    return neighbour;
                }
            }
        }
        own
    }

    /// Records a segment touching `point`, with `direction` pointing away
    /// from it along the segment.
    pub fn insert(&mut self, point: Vec2, direction: Vec2) {
        let key = self.key(point);
        self.directions.entry(key).or_default().push(direction);
    }

    pub fn directions(&self, point: Vec2) -> &[Vec2] {
        self.directions
            .get(&self.key(point))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of segments sharing `point`.
    pub fn degree(&self, point: Vec2) -> usize {
        self.directions(point).len()
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

/// Everything needed to decide how much to shorten a run end.
pub struct JunctionTrimmer<'a> {
    config: &'a GeometryConfig,
    extents: Extents,
    junctions: JunctionMap,
}

impl<'a> JunctionTrimmer<'a> {
    pub fn new(runs: &[Segment], config: &'a GeometryConfig) -> Option<Self> {
        let extents = Extents::of_runs(runs)?;
        let mut junctions = JunctionMap::new(config.tolerance);

        for run in runs {
            let direction = run.direction();
            junctions.insert(run.start, direction);
            junctions.insert(run.end, -direction);
        }

        Some(Self {
            config,
            extents,
            junctions,
        })
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    pub fn is_border(&self, point: Vec2) -> bool {
        self.extents.on_border(point, self.config.tolerance)
    }

    pub fn is_interior_junction(&self, point: Vec2) -> bool {
        self.junctions.degree(point) >= 2 && !self.is_border(point)
    }

    /// Shortening applied at one run end.
    pub fn end_trim(&self, point: Vec2) -> f32 {
        if self.is_interior_junction(point) {
            self.config.junction_trim()
        } else {
            0.0
        }
    }

    /// Distances along a run of `run_length` where the wall starts and ends.
    /// A span shorter than the floor is widened to the floor and slid back
    /// inside the run, so a one-sided trim never pushes the wall past the
    /// untrimmed end.
    fn trimmed_span(&self, run_length: f32, trim_start: f32, trim_end: f32) -> (f32, f32) {
        let floor = self.config.min_wall_length;
        let (from, to) = (trim_start, run_length - trim_end);
        if to - from >= floor {
            return (from, to);
        }

        let half = floor * 0.5;
        let center = run_length * 0.5;
        let mid = ((from + to) * 0.5).clamp(half.min(center), (run_length - half).max(center));
        (mid - half, mid + half)
    }

    pub fn primitive(&self, run: &Segment) -> WallPrimitive {
        let trim_start = self.end_trim(run.start);
        let trim_end = self.end_trim(run.end);
        let direction = run.direction();

        let (from, to) = self.trimmed_span(run.length(), trim_start, trim_end);
        let midpoint = run.start + direction * ((from + to) * 0.5);
        let length = (to - from).max(self.config.min_wall_length);

        WallPrimitive {
            center: Vec3::new(
                midpoint.x,
                self.config.ground_height + self.config.wall_height * 0.5,
                midpoint.y,
            ),
            length,
            height: self.config.wall_height,
            thickness: self.config.wall_thickness,
            yaw: (-direction.y).atan2(direction.x),
        }
    }
}

/// Turns merged runs into wall boxes, shortening ends that meet interior
/// junctions so perpendicular walls don't interpenetrate. Ends on the outer
/// border are left alone to keep the perimeter sealed.
pub fn trim(runs: &[Segment], config: &GeometryConfig) -> Vec<WallPrimitive> {
    let Some(trimmer) = JunctionTrimmer::new(runs, config) else {
        return Vec::new();
    };
    runs.iter().map(|run| trimmer.primitive(run)).collect()
}
