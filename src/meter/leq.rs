//! Equivalent continuous sound level.

/// Energy-domain average of decibel readings: `10·log10(mean(10^(L/10)))`.
///
/// This is distinct from the arithmetic mean of dB values reported as `avg`.
/// An empty set yields 0.
pub fn compute_leq<I>(readings: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (energy, count) = readings
        .into_iter()
        .fold((0.0f64, 0usize), |(energy, count), db| {
            (energy + 10f64.powf(db / 10.0), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    10.0 * (energy / count as f64).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_readings_return_the_constant() {
        let leq = compute_leq(std::iter::repeat(70.0).take(10));
        assert!((leq - 70.0).abs() < 1e-9, "leq={leq}");
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(compute_leq(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn energy_average_is_dominated_by_loud_readings() {
        let readings = [40.0, 40.0, 40.0, 90.0];
        let leq = compute_leq(readings);
        let arithmetic = readings.iter().sum::<f64>() / readings.len() as f64;
        assert!(leq > arithmetic);
        // 90 dB carries almost all the energy: 90 - 10·log10(4) ≈ 83.98.
        assert!((leq - 83.98).abs() < 0.01, "leq={leq}");
    }

    #[test]
    fn two_equal_halves_three_db_apart() {
        let leq = compute_leq([60.0, 63.0]);
        assert!((leq - 61.76).abs() < 0.01, "leq={leq}");
    }
}
