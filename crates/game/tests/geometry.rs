use labyrinth::geometry::{JunctionTrimmer, build, merge, trim};
use labyrinth::{GeometryConfig, Orientation, RawSegment, Segment, WorldDescription};

const TOLERANCE: f32 = 1e-3;

/// Small xorshift so the maze layouts are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> i32 {
        (self.next() % n) as i32
    }
}

/// Lattice walls with duplicates, reversed copies, overlaps and a few
/// zero-length entries mixed in.
fn messy_maze(seed: u64) -> Vec<RawSegment> {
    let mut rng = XorShift(seed);
    let mut segments = Vec::new();

    for _ in 0..60 {
        let x = rng.below(10) as f32 * 2.0;
        let z = rng.below(10) as f32 * 2.0;
        let len = (rng.below(3) + 1) as f32 * 2.0;
        let segment = if rng.below(2) == 0 {
            RawSegment::new(x, z, x + len, z)
        } else {
            RawSegment::new(x, z, x, z + len)
        };

        match rng.below(6) {
            0 => segments.push(RawSegment::new(segment.x1, segment.z1, segment.x0, segment.z0)),
            1 => {
                segments.push(segment);
                segments.push(segment);
            }
            2 => segments.push(RawSegment::new(x, z, x, z)),
            _ => segments.push(segment),
        }
    }

    segments
}

fn sorted_spans(runs: &[Segment]) -> Vec<(Orientation, f32, f32, f32)> {
    let mut spans: Vec<_> = runs
        .iter()
        .map(|run| {
            let (from, to) = run.running();
            (run.orientation, run.cross(), from, to)
        })
        .collect();
    spans.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
    });
    spans
}

fn covers(segment: &Segment, x: f32, z: f32) -> bool {
    let (from, to) = segment.running();
    let (along, across) = match segment.orientation {
        Orientation::Horizontal => (x, z),
        Orientation::Vertical => (z, x),
    };
    (across - segment.cross()).abs() <= TOLERANCE
        && along >= from - TOLERANCE
        && along <= to + TOLERANCE
}

fn sample_points(segment: &Segment) -> impl Iterator<Item = (f32, f32)> + '_ {
    (0..=10).map(move |i| {
        let point = segment.start.lerp(segment.end, i as f32 / 10.0);
        (point.x, point.y)
    })
}

#[test]
fn merge_is_idempotent() {
    for seed in 1..=20 {
        let once = merge(&messy_maze(seed), TOLERANCE);
        let raw: Vec<RawSegment> = once.iter().map(Segment::to_raw).collect();
        let twice = merge(&raw, TOLERANCE);

        assert_eq!(sorted_spans(&once), sorted_spans(&twice), "seed {}", seed);
    }
}

#[test]
fn merge_preserves_coverage() {
    for seed in 1..=20 {
        let raw = messy_maze(seed);
        let inputs: Vec<Segment> = raw
            .iter()
            .filter_map(|s| Segment::normalize(s, TOLERANCE))
            .collect();
        let runs = merge(&raw, TOLERANCE);

        for input in &inputs {
            for (x, z) in sample_points(input) {
                assert!(
                    runs.iter().any(|run| covers(run, x, z)),
                    "seed {}: ({}, {}) lost",
                    seed,
                    x,
                    z
                );
            }
        }

        for run in &runs {
            for (x, z) in sample_points(run) {
                assert!(
                    inputs.iter().any(|input| covers(input, x, z)),
                    "seed {}: ({}, {}) invented",
                    seed,
                    x,
                    z
                );
            }
        }
    }
}

#[test]
fn merged_runs_never_touch() {
    for seed in 1..=20 {
        let spans = sorted_spans(&merge(&messy_maze(seed), TOLERANCE));
        for pair in spans.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.0 == b.0 && (a.1 - b.1).abs() <= TOLERANCE {
                assert!(b.2 - a.3 > TOLERANCE, "seed {}: {:?} touches {:?}", seed, a, b);
            }
        }
    }
}

#[test]
fn border_ends_are_never_trimmed() {
    let config = GeometryConfig::default();

    for seed in 1..=20 {
        let runs = merge(&messy_maze(seed), TOLERANCE);
        let Some(trimmer) = JunctionTrimmer::new(&runs, &config) else {
            continue;
        };

        for run in &runs {
            for end in [run.start, run.end] {
                if trimmer.is_border(end) {
                    assert_eq!(trimmer.end_trim(end), 0.0, "seed {}", seed);
                }
            }
        }
    }
}

#[test]
fn trimmed_lengths_respect_the_floor() {
    let config = GeometryConfig {
        wall_thickness: 3.0,
        ..GeometryConfig::default()
    };

    for seed in 1..=20 {
        let runs = merge(&messy_maze(seed), TOLERANCE);
        for wall in trim(&runs, &config) {
            assert!(wall.length >= config.min_wall_length, "seed {}", seed);
        }
    }
}

#[test]
fn corner_scenario_builds_two_sealed_walls() {
    let description = WorldDescription {
        walls: Some(vec![
            RawSegment::new(0.0, 0.0, 5.0, 0.0),
            RawSegment::new(5.0, 0.0, 5.0, 5.0),
            RawSegment::new(3.0, 0.0, 5.0, 0.0),
        ]),
        pickups: None,
    };
    let config = GeometryConfig::default();

    let (walls, bounds) = build(&description, &config).expect("walls expected");

    assert_eq!(walls.len(), 2);
    // The shared corner sits on the outer extent, so both walls keep full length.
    assert!(walls.iter().all(|w| (w.length - 5.0).abs() < 1e-5));
    assert_eq!(bounds.min_x, -0.5);
    assert_eq!(bounds.max_x, 5.5);
    assert_eq!(bounds.max_z, 5.5);
}

#[test]
fn malformed_descriptions_build_nothing() {
    let config = GeometryConfig::default();

    assert!(build(&WorldDescription::default(), &config).is_none());

    let degenerate = WorldDescription {
        walls: Some(vec![
            RawSegment::new(1.0, 1.0, 1.0, 1.0),
            RawSegment::new(f32::NAN, 0.0, 1.0, 0.0),
        ]),
        pickups: None,
    };
    assert!(build(&degenerate, &config).is_none());
}
