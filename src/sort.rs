//! Insertion sorts used by the pitch search and NLSF stabilization.
//! Fast on the nearly sorted vectors these callers produce.

/// Sorts `a` increasingly and reports original positions in `index`.
/// Only the first `k` output positions are guaranteed correct; the rest of
/// `a` is scanned but not fully ordered.
pub fn insertion_sort_increasing(a: &mut [i32], index: &mut [usize], k: usize) {
    debug_assert!(k > 0 && a.len() >= k && index.len() >= k);

    for (i, ix) in index.iter_mut().enumerate().take(k) {
        *ix = i;
    }

    for i in 1..k {
        let value = a[i];
        let mut j = i;
        while j > 0 && value < a[j - 1] {
            a[j] = a[j - 1];
            index[j] = index[j - 1];
            j -= 1;
        }
        a[j] = value;
        index[j] = i;
    }

    for i in k..a.len() {
        let value = a[i];
        if value < a[k - 1] {
            let mut j = k - 1;
            while j > 0 && value < a[j - 1] {
                a[j] = a[j - 1];
                index[j] = index[j - 1];
                j -= 1;
            }
            a[j] = value;
            index[j] = i;
        }
    }
}

/// Decreasing variant over 16-bit values, same partial-sort contract.
pub fn insertion_sort_decreasing_i16(a: &mut [i16], index: &mut [usize], k: usize) {
    debug_assert!(k > 0 && a.len() >= k && index.len() >= k);

    for (i, ix) in index.iter_mut().enumerate().take(k) {
        *ix = i;
    }

    for i in 1..k {
        let value = a[i];
        let mut j = i;
        while j > 0 && value > a[j - 1] {
            a[j] = a[j - 1];
            index[j] = index[j - 1];
            j -= 1;
        }
        a[j] = value;
        index[j] = i;
    }

    for i in k..a.len() {
        let value = a[i];
        if value > a[k - 1] {
            let mut j = k - 1;
            while j > 0 && value > a[j - 1] {
                a[j] = a[j - 1];
                index[j] = index[j - 1];
                j -= 1;
            }
            a[j] = value;
            index[j] = i;
        }
    }
}

/// Full increasing sort, values only.
pub fn insertion_sort_increasing_all_values(a: &mut [i32]) {
    for i in 1..a.len() {
        let value = a[i];
        let mut j = i;
        while j > 0 && value < a[j - 1] {
            a[j] = a[j - 1];
            j -= 1;
        }
        a[j] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sort_orders_the_first_k() {
        let mut a = [9i32, 2, 7, 1, 8, 3, 0, 5];
        let mut index = [0usize; 4];
        insertion_sort_increasing(&mut a, &mut index, 4);
        assert_eq!(&a[..4], &[0, 1, 2, 3]);
        assert_eq!(&index[..4], &[6, 3, 1, 5]);
    }

    #[test]
    fn decreasing_i16_tracks_indices() {
        let mut a = [3i16, 9, -2, 7];
        let mut index = [0usize; 4];
        insertion_sort_decreasing_i16(&mut a, &mut index, 4);
        assert_eq!(a, [9, 7, 3, -2]);
        assert_eq!(index, [1, 3, 0, 2]);
    }

    #[test]
    fn all_values_sorts_completely() {
        let mut a = [5i32, -1, 4, 4, 0];
        insertion_sort_increasing_all_values(&mut a);
        assert_eq!(a, [-1, 0, 4, 4, 5]);
    }
}
