//! Enforces minimum spacing on an NLSF vector so the derived LPC filter
//! keeps its stability margin.

use crate::sort::insertion_sort_increasing_all_values;

const MAX_LOOPS: usize = 20;

/// Stabilizes `nlsf_q15` in place. `delta_min_q15` has one entry more than
/// the vector: guards against 0, between each pair, and against 2^15.
///
/// Moves the most offending pair toward a feasible center a bounded number
/// of times; if the vector is too scrambled for that to converge, falls
/// back to sorting and clamping in both directions.
pub fn nlsf_stabilize(nlsf_q15: &mut [i32], delta_min_q15: &[i16]) {
    let l = nlsf_q15.len();
    if l == 0 {
        return;
    }
    debug_assert!(delta_min_q15.len() == l + 1);
    debug_assert!(delta_min_q15[l] >= 1);

    for _ in 0..MAX_LOOPS {
        // most negative spacing violation
        let mut min_diff_q15 = nlsf_q15[0] - i32::from(delta_min_q15[0]);
        let mut index = 0usize;
        for i in 1..l {
            let diff_q15 = nlsf_q15[i] - (nlsf_q15[i - 1] + i32::from(delta_min_q15[i]));
            if diff_q15 < min_diff_q15 {
                min_diff_q15 = diff_q15;
                index = i;
            }
        }
        let last_diff_q15 = (1 << 15) - (nlsf_q15[l - 1] + i32::from(delta_min_q15[l]));
        if last_diff_q15 < min_diff_q15 {
            min_diff_q15 = last_diff_q15;
            index = l;
        }

        if min_diff_q15 >= 0 {
            return;
        }

        if index == 0 {
            nlsf_q15[0] = i32::from(delta_min_q15[0]);
        } else if index == l {
            nlsf_q15[l - 1] = (1 << 15) - i32::from(delta_min_q15[l]);
        } else {
            // move the pair's center into the feasible band, then respace
            let mut min_center_q15 = 0i32;
            for &d in &delta_min_q15[..index] {
                min_center_q15 += i32::from(d);
            }
            min_center_q15 += i32::from(delta_min_q15[index]) >> 1;

            let mut max_center_q15 = 1 << 15;
            for &d in &delta_min_q15[index + 1..=l] {
                max_center_q15 -= i32::from(d);
            }
            max_center_q15 -= i32::from(delta_min_q15[index]) >> 1;

            let center_freq_q15 = ((nlsf_q15[index - 1] + nlsf_q15[index] + 1) >> 1)
                .clamp(min_center_q15, max_center_q15);

            nlsf_q15[index - 1] = center_freq_q15 - (i32::from(delta_min_q15[index]) >> 1);
            nlsf_q15[index] = nlsf_q15[index - 1] + i32::from(delta_min_q15[index]);
        }
    }

    // fallback: sort, then clamp forward and backward
    insertion_sort_increasing_all_values(nlsf_q15);

    nlsf_q15[0] = nlsf_q15[0].max(i32::from(delta_min_q15[0]));
    for i in 1..l {
        let floor = nlsf_q15[i - 1] + i32::from(delta_min_q15[i]);
        nlsf_q15[i] = nlsf_q15[i].max(floor);
    }
    nlsf_q15[l - 1] = nlsf_q15[l - 1].min((1 << 15) - i32::from(delta_min_q15[l]));
    for i in (0..l - 1).rev() {
        let ceil = nlsf_q15[i + 1] - i32::from(delta_min_q15[i + 1]);
        nlsf_q15[i] = nlsf_q15[i].min(ceil);
    }
}

#[cfg(test)]
mod tests {
    use super::nlsf_stabilize;

    fn assert_feasible(nlsf: &[i32], deltas: &[i16]) {
        assert!(nlsf[0] >= i32::from(deltas[0]));
        for i in 1..nlsf.len() {
            assert!(nlsf[i] - nlsf[i - 1] >= i32::from(deltas[i]), "pair {i}");
        }
        assert!(nlsf[nlsf.len() - 1] <= (1 << 15) - i32::from(deltas[nlsf.len()]));
    }

    #[test]
    fn spreads_clustered_values() {
        let mut nlsf = [200, 205, 210, 215];
        let deltas = [10i16, 20, 20, 20, 10];
        nlsf_stabilize(&mut nlsf, &deltas);
        assert_feasible(&nlsf, &deltas);
    }

    #[test]
    fn fallback_handles_unsorted_input() {
        let mut nlsf = [30000, -2000, 15000, 16000, 17000];
        let deltas = [5i16, 50, 50, 50, 50, 5];
        nlsf_stabilize(&mut nlsf, &deltas);
        assert_feasible(&nlsf, &deltas);
        for i in 1..nlsf.len() {
            assert!(nlsf[i] > nlsf[i - 1]);
        }
    }

    #[test]
    fn feasible_input_is_untouched() {
        let mut nlsf = [3000, 9000, 15000, 24000];
        let original = nlsf;
        let deltas = [100i16, 100, 100, 100, 100];
        nlsf_stabilize(&mut nlsf, &deltas);
        assert_eq!(nlsf, original);
    }
}
