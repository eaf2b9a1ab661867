//! Per-domain question quotas.

/// Split `total` questions across domains by weight.
///
/// Every domain but the last gets `round(weight * total)`; the last takes
/// the remainder so the quotas always sum to `total`. If rounding already
/// overshoots, earlier quotas are trimmed from the back.
pub fn allocate_quotas(weights: &[f64], total: usize) -> Vec<usize> {
    let Some((_, leading)) = weights.split_last() else {
        return Vec::new();
    };

    let mut quotas: Vec<usize> = leading
        .iter()
        .map(|w| (w.max(0.0) * total as f64).round() as usize)
        .collect();

    let mut assigned: usize = quotas.iter().sum();
    for quota in quotas.iter_mut().rev() {
        if assigned <= total {
            break;
        }
        let cut = (*quota).min(assigned - total);
        *quota -= cut;
        assigned -= cut;
    }

    quotas.push(total - assigned);
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_weights() {
        let quotas = allocate_quotas(&[0.275, 0.275, 0.275, 0.175], 60);
        assert_eq!(quotas, vec![17, 17, 17, 9]);
        assert_eq!(quotas.iter().sum::<usize>(), 60);
    }

    #[test]
    fn test_last_domain_absorbs_rounding() {
        let quotas = allocate_quotas(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0], 10);
        assert_eq!(quotas, vec![3, 3, 4]);
    }

    #[test]
    fn test_overshoot_is_trimmed() {
        // 1.5 rounds up twice: 2 + 2 > 3.
        let quotas = allocate_quotas(&[0.5, 0.5, 0.0], 3);
        assert_eq!(quotas, vec![2, 1, 0]);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(allocate_quotas(&[0.4], 60), vec![60]);
        assert!(allocate_quotas(&[], 60).is_empty());
    }

    #[test]
    fn test_sum_is_exact_for_many_weightings() {
        let weightings: [&[f64]; 4] = [
            &[0.2, 0.2, 0.2, 0.2, 0.2],
            &[0.15, 0.35, 0.5],
            &[0.05, 0.05, 0.9],
            &[0.6, 0.6],
        ];
        for weights in weightings {
            for total in [1, 7, 60, 65] {
                let quotas = allocate_quotas(weights, total);
                assert_eq!(quotas.len(), weights.len());
                assert_eq!(quotas.iter().sum::<usize>(), total, "{weights:?} / {total}");
            }
        }
    }
}
