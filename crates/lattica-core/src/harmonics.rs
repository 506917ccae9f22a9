//! Plane-wave harmonic indexing.
//!
//! Harmonics are labelled by integer pairs $(p, q)$ with $p \in [-N, N]$ along
//! x and $q \in [-M, M]$ along y. Every operator in the crate uses the same
//! flat ordering, x fastest:
//!
//! $$\text{index}(p, q) = (p + N) + (2N + 1)(q + M)$$

use serde::{Deserialize, Serialize};

/// Truncation orders `(N, M)` and the flat harmonic ordering they induce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harmonics {
    pub order_x: usize,
    pub order_y: usize,
}

impl Harmonics {
    pub fn new(order_x: usize, order_y: usize) -> Self {
        Self { order_x, order_y }
    }

    /// Number of harmonics along x, $2N + 1$.
    pub fn count_x(&self) -> usize {
        2 * self.order_x + 1
    }

    /// Number of harmonics along y, $2M + 1$.
    pub fn count_y(&self) -> usize {
        2 * self.order_y + 1
    }

    /// Total harmonic count $(2N + 1)(2M + 1)$.
    pub fn len(&self) -> usize {
        self.count_x() * self.count_y()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flat index of harmonic `(p, q)`.
    pub fn index(&self, p: isize, q: isize) -> usize {
        let n = self.order_x as isize;
        let m = self.order_y as isize;
        assert!(p.abs() <= n && q.abs() <= m, "harmonic ({p}, {q}) outside orders ({n}, {m})");
        ((p + n) + self.count_x() as isize * (q + m)) as usize
    }

    /// Flat index of the specular `(0, 0)` harmonic.
    pub fn centre(&self) -> usize {
        self.index(0, 0)
    }

    /// All `(p, q)` pairs in flat-index order.
    pub fn iter(&self) -> impl Iterator<Item = (isize, isize)> {
        let n = self.order_x as isize;
        let m = self.order_y as isize;
        (-m..=m).flat_map(move |q| (-n..=n).map(move |p| (p, q)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_centre() {
        let h = Harmonics::new(4, 4);
        assert_eq!(h.len(), 81);
        assert_eq!(h.centre(), 40);
        let h = Harmonics::new(2, 1);
        assert_eq!(h.len(), 15);
        assert_eq!(h.centre(), 7);
    }

    #[test]
    fn test_iter_matches_index() {
        let h = Harmonics::new(2, 3);
        for (flat, (p, q)) in h.iter().enumerate() {
            assert_eq!(h.index(p, q), flat);
        }
        assert_eq!(h.iter().count(), h.len());
    }

    #[test]
    fn test_x_is_fastest() {
        let h = Harmonics::new(1, 1);
        assert_eq!(h.index(-1, -1), 0);
        assert_eq!(h.index(0, -1), 1);
        assert_eq!(h.index(-1, 0), 3);
    }

    #[test]
    #[should_panic(expected = "outside orders")]
    fn test_out_of_range_panics() {
        Harmonics::new(1, 1).index(2, 0);
    }
}
