/// A closed range `[min, max]` of ray parameters or coordinates.
///
/// Used for the per-axis slabs of an [`Aabb`](crate::Aabb) and for the
/// `t` window of a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// A universe interval (contains everything).
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    /// The forward half-line of a ray, `[0, +inf]`.
    pub const FORWARD: Interval = Interval {
        min: 0.0,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns `max - min` (negative for empty intervals).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive membership test.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive membership test.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Grows the interval by `delta / 2` on each side.
    pub fn expand(&self, delta: f32) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Smallest interval containing both `a` and `b`.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Splits the interval at `at`, returning the lower and upper halves.
    ///
    /// `at` is clamped into the interval so both halves stay well formed.
    pub fn split(&self, at: f32) -> (Interval, Interval) {
        let at = at.clamp(self.min, self.max);
        (Interval::new(self.min, at), Interval::new(at, self.max))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains_is_inclusive() {
        let interval = Interval::new(0.0, 10.0);

        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(10.1));

        assert!(!interval.surrounds(0.0));
        assert!(interval.surrounds(5.0));
    }

    #[test]
    fn test_interval_expand() {
        let expanded = Interval::new(0.0, 10.0).expand(4.0);

        assert_eq!(expanded.min, -2.0);
        assert_eq!(expanded.max, 12.0);
    }

    #[test]
    fn test_interval_surrounding_absorbs_empty() {
        let a = Interval::new(1.0, 5.0);
        let joined = Interval::surrounding(&Interval::EMPTY, &a);

        assert_eq!(joined, a);
    }

    #[test]
    fn test_interval_split() {
        let (lo, hi) = Interval::new(-1.0, 3.0).split(1.0);
        assert_eq!(lo, Interval::new(-1.0, 1.0));
        assert_eq!(hi, Interval::new(1.0, 3.0));

        // Split points outside the interval are clamped
        let (lo, hi) = Interval::new(0.0, 1.0).split(4.0);
        assert_eq!(lo.size(), 1.0);
        assert_eq!(hi.size(), 0.0);
    }

    #[test]
    fn test_interval_empty_and_universe() {
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::UNIVERSE.contains(1e10));
        assert!(Interval::FORWARD.contains(0.0));
        assert!(!Interval::FORWARD.contains(-1e-3));
    }
}
