use std::collections::HashMap;

use crate::services::scheduler::types::{DecodedImage, DecodedProject, Snapshot, Unit};

/// Component D: given the current canvas snapshot and every project, produce the set of
/// open work units — pixels whose target color still disagrees with the canvas.
///
/// Projects are processed in ascending priority order (tie-break: lexicographic by
/// name), so that when two projects cover the same pixel with different targets, the
/// higher-priority project's unit wins (§4.D / §9 — "priority wins", the Open Question
/// resolved that way rather than keeping both as independent candidates: letting two
/// users paint the same pixel two different colors in the same window is wasted work).
/// Overlap with the *same* target color is a no-op dedup either way, since identity is
/// `(x, y, rgb)`.
pub fn compute_units(projects: &[DecodedProject], canvas: &Snapshot) -> HashMap<(i32, i32), Unit> {
    let mut ordered: Vec<&DecodedProject> = projects.iter().collect();
    ordered.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));

    let mut units: HashMap<(i32, i32), Unit> = HashMap::new();

    for project in ordered {
        for j in 0..project.image.height {
            for i in 0..project.image.width {
                let Some(target) = project.image.get(i, j) else {
                    continue;
                };
                let x = project.x + i as i32;
                let y = project.y + j as i32;

                let Some(current) = canvas.get(x, y) else {
                    continue;
                };
                if current == target {
                    continue;
                }

                units.insert((x, y), Unit::new(x, y, target, project.name.clone()));
            }
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scheduler::types::Rgb;

    fn solid_project(name: &str, x: i32, y: i32, priority: i32, rgb: Rgb) -> DecodedProject {
        DecodedProject {
            name: name.to_string(),
            x,
            y,
            priority,
            image: DecodedImage {
                width: 1,
                height: 1,
                pixels: vec![rgb],
            },
        }
    }

    fn blank_canvas(width: u32, height: u32) -> Snapshot {
        Snapshot {
            width,
            height,
            pixels: vec![Rgb(0, 0, 0); (width * height) as usize],
            fetched_at: std::time::Instant::now(),
        }
    }

    #[test]
    fn pixel_already_matching_target_is_skipped() {
        let target = Rgb(255, 0, 0);
        let mut canvas = blank_canvas(4, 4);
        canvas.pixels[0] = target;
        let projects = vec![solid_project("p", 0, 0, 0, target)];

        let units = compute_units(&projects, &canvas);
        assert!(units.is_empty());
    }

    #[test]
    fn pixel_outside_canvas_bounds_is_skipped() {
        let projects = vec![solid_project("p", 100, 100, 0, Rgb(255, 0, 0))];
        let units = compute_units(&projects, &blank_canvas(4, 4));
        assert!(units.is_empty());
    }

    #[test]
    fn overlapping_projects_with_different_targets_resolve_to_higher_priority() {
        let canvas = blank_canvas(4, 4);
        let projects = vec![
            solid_project("low", 1, 1, 0, Rgb(255, 0, 0)),
            solid_project("high", 1, 1, 10, Rgb(0, 255, 0)),
        ];

        let units = compute_units(&projects, &canvas);
        assert_eq!(units.len(), 1);
        let unit = units.get(&(1, 1)).unwrap();
        assert_eq!(unit.rgb, Rgb(0, 255, 0));
        assert_eq!(unit.project_name, "high");
    }

    #[test]
    fn overlapping_projects_with_same_target_deduplicate() {
        let canvas = blank_canvas(4, 4);
        let shared = Rgb(10, 20, 30);
        let projects = vec![
            solid_project("a", 1, 1, 0, shared),
            solid_project("b", 1, 1, 1, shared),
        ];

        let units = compute_units(&projects, &canvas);
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn priority_tie_breaks_lexicographically_by_name() {
        let canvas = blank_canvas(4, 4);
        let projects = vec![
            solid_project("zebra", 1, 1, 5, Rgb(1, 1, 1)),
            solid_project("alpha", 1, 1, 5, Rgb(2, 2, 2)),
        ];

        // Same priority, so "zebra" sorts after "alpha" and wins the overlap.
        let units = compute_units(&projects, &canvas);
        assert_eq!(units.get(&(1, 1)).unwrap().rgb, Rgb(1, 1, 1));
    }
}
