pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Integer-floor mean of point values, matching the on-screen score labels.
pub fn floor_mean(data: &[u32]) -> u32 {
    if data.is_empty() {
        return 0;
    }
    data.iter().map(|v| *v as u64).sum::<u64>() as u32 / data.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[15., 7., 55., 12., 4.]), Some(18.6));
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_mixed_values() {
        assert_eq!(mean(&[-10.0, 0.0, 10.0]), Some(0.0));
    }

    #[test]
    fn test_floor_mean_floors() {
        assert_eq!(floor_mean(&[10, 11]), 10);
        assert_eq!(floor_mean(&[296, 150, 99]), 181);
    }

    #[test]
    fn test_floor_mean_empty() {
        assert_eq!(floor_mean(&[]), 0);
    }
}
