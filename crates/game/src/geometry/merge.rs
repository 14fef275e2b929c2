use super::segment::{Orientation, RawSegment, Segment};

/// Fuses collinear touching or overlapping segments into maximal runs.
///
/// Segments are grouped by orientation and cross coordinate (within
/// `tolerance` of the first segment of the group), then swept along the
/// running axis. Degenerate input is dropped. Oblique segments are passed
/// through once each, never fused. Output is ordered by orientation, cross
/// coordinate and start, and merging it again returns the same runs.
pub fn merge(segments: &[RawSegment], tolerance: f32) -> Vec<Segment> {
    let mut aligned = Vec::with_capacity(segments.len());
    let mut oblique = Vec::new();
    let mut dropped = 0usize;

    for raw in segments {
        match Segment::normalize(raw, tolerance) {
            Some(segment) if segment.is_axis_aligned(tolerance) => aligned.push(segment),
            Some(segment) => oblique.push(segment),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} degenerate wall segments", dropped);
    }

    aligned.sort_by(|a, b| {
        a.orientation
            .cmp(&b.orientation)
            .then(a.cross().total_cmp(&b.cross()))
    });

    let mut runs = Vec::with_capacity(aligned.len() + oblique.len());
    let mut group_start = 0;

    while group_start < aligned.len() {
        let anchor = aligned[group_start];
        let anchor_cross = anchor.cross();
        let group_end = aligned[group_start..]
            .iter()
            .position(|s| {
                s.orientation != anchor.orientation || s.cross() - anchor_cross > tolerance
            })
            .map_or(aligned.len(), |offset| group_start + offset);

        let spans = aligned[group_start..group_end].iter().map(Segment::running);
        sweep(anchor.orientation, anchor_cross, spans, tolerance, &mut runs);

        group_start = group_end;
    }

    runs.extend(dedup_oblique(oblique, tolerance));
    runs
}

fn sweep(
    orientation: Orientation,
    cross: f32,
    spans: impl Iterator<Item = (f32, f32)>,
    tolerance: f32,
    runs: &mut Vec<Segment>,
) {
    let mut spans: Vec<(f32, f32)> = spans.collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut current: Option<(f32, f32)> = None;
    for (from, to) in spans {
        current = match current {
            Some((run_from, run_to)) if from <= run_to + tolerance => {
                Some((run_from, run_to.max(to)))
            }
            Some((run_from, run_to)) => {
                runs.push(Segment::axis_aligned(orientation, cross, run_from, run_to));
                Some((from, to))
            }
            None => Some((from, to)),
        };
    }

    if let Some((run_from, run_to)) = current {
        runs.push(Segment::axis_aligned(orientation, cross, run_from, run_to));
    }
}

fn dedup_oblique(segments: Vec<Segment>, tolerance: f32) -> Vec<Segment> {
    let mut unique: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        let duplicate = unique.iter().any(|u| {
            u.start.distance(segment.start) <= tolerance && u.end.distance(segment.end) <= tolerance
        });
        if !duplicate {
            unique.push(segment);
        }
    }
    unique
}
