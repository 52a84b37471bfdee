use crate::geometry::Contour;
use crate::math::Point2;

/// Which of several extracted loops to keep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoopSelection {
    /// Keep every loop.
    #[default]
    All,
    /// Keep only the loop with the largest enclosed area.
    Largest,
    /// Keep the loop whose centroid is nearest to a reference point; equal
    /// distances go to the larger loop.
    NearestCentroid(Point2),
}

impl LoopSelection {
    /// Applies the policy. Order among kept loops is preserved.
    #[must_use]
    pub fn select(&self, loops: Vec<Contour>) -> Vec<Contour> {
        let best = match self {
            Self::All => return loops,
            Self::Largest => loops
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.area().total_cmp(&b.area()).then(ib.cmp(ia)))
                .map(|(i, _)| i),
            Self::NearestCentroid(target) => loops
                .iter()
                .enumerate()
                .filter_map(|(i, c)| Some((i, (c.centroid()? - target).norm(), c.area())))
                .min_by(|a, b| a.1.total_cmp(&b.1).then(b.2.total_cmp(&a.2)).then(a.0.cmp(&b.0)))
                .map(|(i, _, _)| i),
        };
        best.and_then(|i| loops.into_iter().nth(i))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Contour {
        Contour::new(
            vec![
                Point2::new(x, y),
                Point2::new(x + size, y),
                Point2::new(x + size, y + size),
                Point2::new(x, y + size),
            ],
            0.0,
        )
    }

    fn loops() -> Vec<Contour> {
        vec![square(0.0, 0.0, 2.0), square(10.0, 0.0, 4.0), square(20.0, 0.0, 1.0)]
    }

    #[test]
    fn all_keeps_everything() {
        assert_eq!(LoopSelection::All.select(loops()).len(), 3);
    }

    #[test]
    fn largest_by_area() {
        let kept = LoopSelection::Largest.select(loops());
        assert_eq!(kept.len(), 1);
        assert!((kept[0].area() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn nearest_centroid() {
        let kept = LoopSelection::NearestCentroid(Point2::new(19.0, 0.0)).select(loops());
        assert_eq!(kept.len(), 1);
        assert!((kept[0].area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_ties_prefer_larger_area() {
        // Both centroids are 5 mm from the target.
        let loops = vec![square(-6.0, -1.0, 2.0), square(3.0, -2.0, 4.0)];
        let kept = LoopSelection::NearestCentroid(Point2::origin()).select(loops);
        assert!((kept[0].area() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input() {
        assert!(LoopSelection::Largest.select(Vec::new()).is_empty());
    }
}
