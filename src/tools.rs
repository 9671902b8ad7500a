use crate::types::VId;

/// Intersects sorted, duplicate-free slices.
///
/// The shortest slice drives the scan and the others are searched with a
/// galloping cursor, so the cost is bounded by the shortest slice times the
/// logarithm of the longest.
pub fn intersect(slices: &mut [&[VId]]) -> Vec<VId> {
    slices.sort_by_key(|s| s.len());
    let (head, rest) = match slices.split_first_mut() {
        Some((head, rest)) => (*head, rest),
        None => return Vec::new(),
    };
    let mut result = Vec::with_capacity(head.len());
    'outer: for &x in head {
        for s in rest.iter_mut() {
            let current: &[VId] = *s;
            *s = &current[gallop(current, x)..];
            match s.first() {
                Some(&y) if y == x => (),
                Some(_) => continue 'outer,
                None => break 'outer,
            }
        }
        result.push(x);
    }
    result
}

/// Restricts a sorted slice to the values strictly between `lower` and `upper`.
pub fn bounded(slice: &[VId], lower: Option<VId>, upper: Option<VId>) -> &[VId] {
    let start = lower.map_or(0, |l| slice.partition_point(|&v| v <= l));
    let end = upper.map_or(slice.len(), |u| slice.partition_point(|&v| v < u));
    if start < end {
        &slice[start..end]
    } else {
        &[]
    }
}

/// The number of leading elements of `slice` that are smaller than `x`.
fn gallop(slice: &[VId], x: VId) -> usize {
    let mut step = 1;
    let mut hi = 0;
    while hi < slice.len() && slice[hi] < x {
        hi += step;
        step <<= 1;
    }
    let lo = hi - (step >> 1);
    let hi = std::cmp::min(hi + 1, slice.len());
    lo + slice[lo..hi].partition_point(|&v| v < x)
}
