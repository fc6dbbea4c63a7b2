// Chord inversion modeled as circular rotation of an interval set.
//
// Rotating `[0, 4, 7]` left by one gives `[4, 7, 0]`; the element that
// wrapped around is then lifted an octave to `12`, which is the first
// inversion of the triad. Rotating right drops the wrapped elements instead
// (`[7, 0, 4]` → `[-5, 0, 4]`). Rotations of `|n| >= len` additionally shift
// every element by one `shift_per_wrap` per full lap, so the voicing keeps
// climbing (or falling) coherently however far it is rotated.
//
// The operator is exactly invertible: rotating by `(n, k)` and then by
// `(-n, -k)` restores the input.

use crate::error::VibeError;

/// Rotate `intervals` by `n` positions, octave-correcting wrapped elements.
///
/// - `output[i] = intervals[(i + n) mod len]` (Euclidean modulo)
/// - with `p = |n| mod len`: for `n > 0` the last `p` outputs get
///   `+shift_per_wrap`; for `n < 0` the first `p` outputs do
/// - every output gets `+shift_per_wrap * (|n| / len)` for full laps
pub fn rotate(intervals: &[i32], n: i32, shift_per_wrap: i32) -> Result<Vec<i32>, VibeError> {
    if intervals.is_empty() {
        return Err(VibeError::InvalidRotation {
            reason: "empty interval sequence",
        });
    }
    let len = intervals.len() as i64;
    let n = n as i64;
    let shift = shift_per_wrap as i64;
    let partial = (n.unsigned_abs() % len as u64) as usize;
    let lap_shift = shift * (n.unsigned_abs() / len as u64) as i64;

    let out_len = intervals.len();
    (0..out_len)
        .map(|i| {
            let src = (i as i64 + n).rem_euclid(len) as usize;
            let wrapped = if n > 0 {
                i >= out_len - partial
            } else {
                i < partial
            };
            let wrap_shift = if wrapped { shift } else { 0 };
            i32::try_from(intervals[src] as i64 + wrap_shift + lap_shift).map_err(|_| {
                VibeError::InvalidRotation {
                    reason: "shifted interval overflows",
                }
            })
        })
        .collect()
}

/// Octave shift to pair with an inversion index: up for positive indices,
/// down for negative ones, none for root position.
pub fn octave_shift_for(index: i32) -> i32 {
    index.signum() * 12
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIAD: [i32; 3] = [0, 4, 7];
    const SEVENTH: [i32; 4] = [0, 3, 7, 10];

    #[test]
    fn zero_is_identity() {
        for k in [-12, 0, 7, 12] {
            assert_eq!(rotate(&TRIAD, 0, k).unwrap(), TRIAD);
            assert_eq!(rotate(&SEVENTH, 0, k).unwrap(), SEVENTH);
        }
    }

    #[test]
    fn first_inversion_up() {
        assert_eq!(rotate(&TRIAD, 1, 12).unwrap(), vec![4, 7, 12]);
        assert_eq!(rotate(&TRIAD, 2, 12).unwrap(), vec![7, 12, 16]);
    }

    #[test]
    fn negative_rotation_drops_wrapped_notes() {
        assert_eq!(rotate(&TRIAD, -1, -12).unwrap(), vec![-5, 0, 4]);
        assert_eq!(rotate(&TRIAD, -2, -12).unwrap(), vec![-8, -5, 0]);
        assert_eq!(rotate(&SEVENTH, -1, -12).unwrap(), vec![-2, 0, 3, 7]);
    }

    #[test]
    fn full_wrap_adds_one_shift() {
        for k in [-12, 5, 12] {
            let out = rotate(&SEVENTH, SEVENTH.len() as i32, k).unwrap();
            for (i, &v) in out.iter().enumerate() {
                assert_eq!(v, SEVENTH[i] + k);
            }
            let out = rotate(&TRIAD, -(TRIAD.len() as i32), k).unwrap();
            for (i, &v) in out.iter().enumerate() {
                assert_eq!(v, TRIAD[i] + k);
            }
        }
    }

    #[test]
    fn beyond_full_wrap() {
        // One lap plus one step: [4, 7, 12] shifted up another octave.
        assert_eq!(rotate(&TRIAD, 4, 12).unwrap(), vec![16, 19, 24]);
        assert_eq!(rotate(&TRIAD, -4, -12).unwrap(), vec![-17, -12, -8]);
    }

    #[test]
    fn rotation_is_invertible() {
        for n in -9..=9 {
            for k in [-12, 0, 12, 7] {
                let there = rotate(&SEVENTH, n, k).unwrap();
                let back = rotate(&there, -n, -k).unwrap();
                assert_eq!(back, SEVENTH, "n = {n}, k = {k}");
            }
        }
    }

    #[test]
    fn preserves_length() {
        for n in -5..=5 {
            assert_eq!(rotate(&[0], n, 12).unwrap().len(), 1);
            assert_eq!(rotate(&SEVENTH, n, 12).unwrap().len(), 4);
        }
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            rotate(&[], 1, 12),
            Err(VibeError::InvalidRotation { .. })
        ));
    }

    #[test]
    fn huge_rotation_fails_instead_of_overflowing() {
        assert!(matches!(
            rotate(&TRIAD, i32::MAX, 12),
            Err(VibeError::InvalidRotation { .. })
        ));
        assert!(matches!(
            rotate(&[0], i32::MIN, -12),
            Err(VibeError::InvalidRotation { .. })
        ));
        // Large but representable: 1000 laps of one octave.
        assert_eq!(rotate(&[0], 1000, 12).unwrap(), vec![12_000]);
    }

    #[test]
    fn shift_follows_sign() {
        assert_eq!(octave_shift_for(0), 0);
        assert_eq!(octave_shift_for(2), 12);
        assert_eq!(octave_shift_for(-1), -12);
    }
}
