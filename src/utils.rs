/// Smallest positive integer for which `condition` holds.
///
/// The bound doubles (1, 2, 4, ...) until `condition` is true, then the gap
/// between the last failing and the first passing bound is bisected. `condition`
/// must stay true for every integer above the first one where it holds; the
/// result is only a boundary of that predicate, nothing lower is re-checked.
pub fn find_first_match<F>(mut condition: F) -> u64
where
    F: FnMut(u64) -> bool,
{
    let mut ub: u64 = 1;
    while !condition(ub) {
        ub = ub.saturating_mul(2);
        if ub == u64::MAX {
            break;
        }
    }

    let mut lb = ub / 2;
    while lb + 1 < ub {
        let mid = lb + (ub - lb) / 2;
        if condition(mid) {
            ub = mid;
        } else {
            lb = mid;
        }
    }
    ub
}
