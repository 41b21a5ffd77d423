//! Keypoint geometry used by the test analyzers
//!
//! - Joint angles from three keypoints (arctangent difference)
//! - Point displacement between frames
//! - Fixed-capacity trailing history of tracked positions

/// A 2D point in frame pixel coordinates
pub type Point = (f32, f32);

/// Calculate the angle at `vertex` between the rays to `first` and `last`
///
/// Uses the difference of the two ray headings, so the result is folded into
/// [0°, 180°] (reflex angles become `360 - angle`).
///
/// # Arguments
/// * `first` - First point (e.g., shoulder)
/// * `vertex` - Joint point (e.g., hip)
/// * `last` - Third point (e.g., knee)
pub fn calculate_joint_angle(first: Point, vertex: Point, last: Point) -> f32 {
    let heading_last = (last.1 - vertex.1).atan2(last.0 - vertex.0);
    let heading_first = (first.1 - vertex.1).atan2(first.0 - vertex.0);

    let angle = (heading_last - heading_first).to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Euclidean distance between two points
pub fn displacement(from: Point, to: Point) -> f32 {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    (dx * dx + dy * dy).sqrt()
}

/// Ring buffer holding the last `N` tracked positions
#[derive(Debug, Clone, PartialEq)]
pub struct PositionHistory<const N: usize> {
    slots: [Point; N],
    /// Index the next push writes to
    head: usize,
    len: usize,
}

impl<const N: usize> PositionHistory<N> {
    pub fn new() -> Self {
        Self {
            slots: [(0.0, 0.0); N],
            head: 0,
            len: 0,
        }
    }

    /// Append a position, overwriting the oldest once full
    pub fn push(&mut self, point: Point) {
        self.slots[self.head] = point;
        self.head = (self.head + 1) % N;
        self.len = (self.len + 1).min(N);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Position pushed `age` pushes ago (0 = most recent)
    pub fn get(&self, age: usize) -> Option<Point> {
        if age >= self.len {
            return None;
        }
        let idx = (self.head + N - 1 - age) % N;
        Some(self.slots[idx])
    }

    /// The two most recent positions as (older, newer)
    pub fn last_pair(&self) -> Option<(Point, Point)> {
        Some((self.get(1)?, self.get(0)?))
    }
}

impl<const N: usize> Default for PositionHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_at_angle(vertex: Point, degrees: f32, radius: f32) -> Point {
        let rad = degrees.to_radians();
        (vertex.0 + radius * rad.cos(), vertex.1 - radius * rad.sin())
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_joint_angle((0.0, 0.0), (0.0, 1.0), (1.0, 1.0));
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_straight_line_is_180() {
        let angle = calculate_joint_angle((0.0, 0.0), (5.0, 0.0), (10.0, 0.0));
        assert!((angle - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_reflex_angle_is_folded() {
        let hip: Point = (100.0, 100.0);
        let heading = |degrees: f32| {
            let rad = degrees.to_radians();
            (hip.0 + 50.0 * rad.cos(), hip.1 + 50.0 * rad.sin())
        };
        // Headings of +170 and -170 differ by 340 raw degrees
        let angle = calculate_joint_angle(heading(-170.0), hip, heading(170.0));
        assert!((angle - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_angle_range() {
        let hip = (320.0, 400.0);
        let knee = (420.0, 400.0);
        for degrees in (0..=360).step_by(15) {
            let shoulder = point_at_angle(hip, degrees as f32, 80.0);
            let angle = calculate_joint_angle(shoulder, hip, knee);
            assert!((0.0..=180.0).contains(&angle), "{} -> {}", degrees, angle);
        }
    }

    #[test]
    fn test_displacement() {
        assert!((displacement((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 0.001);
        assert_eq!(displacement((7.0, 7.0), (7.0, 7.0)), 0.0);
    }

    #[test]
    fn test_history_keeps_last_two() {
        let mut history = PositionHistory::<2>::new();
        assert!(history.is_empty());
        assert!(history.last_pair().is_none());

        history.push((1.0, 1.0));
        assert_eq!(history.len(), 1);
        assert!(history.last_pair().is_none());

        history.push((2.0, 2.0));
        history.push((3.0, 3.0));
        assert!(history.is_full());
        assert_eq!(history.len(), 2);
        assert_eq!(history.last_pair(), Some(((2.0, 2.0), (3.0, 3.0))));
        assert_eq!(history.get(2), None);
    }
}
