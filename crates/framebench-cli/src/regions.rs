//! Merge-region layout for the blend operation.

use framebench_core::Rect;

/// The output merge window plus one merge area per input.
///
/// The harness blends whole frames: the window spans the full output
/// and each area spans the full input it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRegions {
    pub window: Rect,
    pub areas: Vec<Rect>,
}

impl MergeRegions {
    pub fn new(out_width: u32, out_height: u32, input_sizes: &[(u32, u32)]) -> Self {
        Self {
            window: Rect::full(out_width, out_height),
            areas: input_sizes
                .iter()
                .map(|&(w, h)| Rect::full(w, h))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_full_output() {
        let regions = MergeRegions::new(1280, 800, &[(1280, 800), (1280, 800)]);
        assert_eq!(regions.window, Rect::new(0, 0, 1280, 800));
    }

    #[test]
    fn one_area_per_input_at_its_own_size() {
        let regions = MergeRegions::new(1920, 1080, &[(1280, 800), (640, 480)]);
        assert_eq!(regions.areas.len(), 2);
        assert_eq!(regions.areas[0], Rect::new(0, 0, 1280, 800));
        assert_eq!(regions.areas[1], Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn areas_sit_inside_their_inputs() {
        let sizes = [(1280, 800), (640, 480)];
        let regions = MergeRegions::new(1280, 800, &sizes);
        for (area, (w, h)) in regions.areas.iter().zip(sizes) {
            assert!(area.fits_in(w, h));
        }
    }
}
