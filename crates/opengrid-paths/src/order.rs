use std::cmp::Ordering;

/// Tolerance under which two costs are treated as equal.
///
/// Close to single-precision machine epsilon; it only absorbs rounding noise
/// from `g + h` sums and is far below any meaningful step cost.
pub const COST_EPSILON: f32 = 5.96e-8;

/// Three-way compare of two costs with the [`COST_EPSILON`] tie rule.
///
/// Costs within epsilon of each other are `Equal`; otherwise the smaller one
/// is `Less`. NaN sorts after every number and equal to another NaN, so a
/// poisoned cost sinks to the bottom of the heap instead of blocking the root.
///
/// The epsilon rule is not transitive (`a ≈ b` and `b ≈ c` do not imply
/// `a ≈ c`), which is why this is not an [`Ord`] impl. A binary heap only
/// ever compares parent/child pairs and tolerates it.
#[inline]
pub fn compare_costs(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    // `==` catches equal infinities, whose difference is NaN.
    if a == b || (a - b).abs() <= COST_EPSILON {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// The ordering a [`PriorityQueue`](crate::PriorityQueue) sorts by.
///
/// This is the only comparison the heap performs: `Less` rises toward the
/// root. Every [`Ord`] type gets it for free; search nodes implement it with
/// [`compare_costs`] instead of relational operators.
pub trait HeapOrd {
    fn heap_cmp(&self, other: &Self) -> Ordering;
}

impl<T: Ord> HeapOrd for T {
    #[inline]
    fn heap_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}
