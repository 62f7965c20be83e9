use std::collections::HashMap;
use std::ops::{Add, Mul};

pub fn lerp<T>(a: T, b: T, t: f64) -> T
where
    T: Mul<f64, Output = T> + Add<T, Output = T> + Copy,
{
    a * (1.0 - t) + b * t
}

/// Таблица биномиальных коэффициентов с мемоизацией.
///
/// Рекурсия по треугольнику Паскаля C(n,k) = C(n-1,k-1) + C(n-1,k) без кэша
/// имеет экспоненциальную стоимость, поэтому вычисленные значения
/// запоминаются в разреженной таблице по ключу (n, k).
#[derive(Default)]
pub struct BinomialTable {
    cache: HashMap<(usize, usize), f64>,
}

impl BinomialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Биномиальный коэффициент C(n, k).
    ///
    /// `None` при k > n — признак некорректного запроса, а не числовой ноль.
    pub fn binomial(&mut self, n: usize, k: usize) -> Option<f64> {
        if k > n {
            return None;
        }
        if k == 0 || k == n {
            return Some(1.0);
        }
        if let Some(&value) = self.cache.get(&(n, k)) {
            return Some(value);
        }
        let value = self.binomial(n - 1, k - 1)? + self.binomial(n - 1, k)?;
        self.cache.insert((n, k), value);
        Some(value)
    }

    /// Базисный полином Бернштейна B_i,n(t) = C(n,i) * t^i * (1-t)^(n-i).
    ///
    /// Параметр t ожидается в [0, 1], но не ограничивается: вне отрезка
    /// полином экстраполируется.
    pub fn bernstein(&mut self, i: usize, n: usize, t: f64) -> Option<f64> {
        let coeff = self.binomial(n, i)?;
        Some(coeff * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binomial_table_values() {
        let mut table = BinomialTable::new();
        assert_eq!(table.binomial(4, 2), Some(6.0));
        assert_eq!(table.binomial(5, 0), Some(1.0));
        assert_eq!(table.binomial(5, 5), Some(1.0));
        assert_eq!(table.binomial(3, 5), None);
    }

    #[test]
    fn binomial_is_memoized() {
        let mut table = BinomialTable::new();
        table.binomial(10, 5);
        let cached = table.cache.len();
        assert!(cached > 0);
        table.binomial(10, 5);
        assert_eq!(table.cache.len(), cached);
    }

    #[test]
    fn bernstein_partition_of_unity() {
        let mut table = BinomialTable::new();
        for n in 1..=6 {
            for t in [0.0, 0.2, 0.5, 0.77, 1.0] {
                let sum: f64 = (0..=n).map(|i| table.bernstein(i, n, t).unwrap()).sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn bernstein_one_hot_at_endpoints() {
        let mut table = BinomialTable::new();
        let n = 4;
        for i in 0..=n {
            let at_zero = table.bernstein(i, n, 0.0).unwrap();
            let at_one = table.bernstein(i, n, 1.0).unwrap();
            assert_relative_eq!(at_zero, if i == 0 { 1.0 } else { 0.0 });
            assert_relative_eq!(at_one, if i == n { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn bernstein_extrapolates_outside_unit_interval() {
        let mut table = BinomialTable::new();
        // B_0,1(t) = 1 - t без ограничения аргумента
        assert_relative_eq!(table.bernstein(0, 1, 2.0).unwrap(), -1.0);
        assert_relative_eq!(table.bernstein(1, 1, -1.0).unwrap(), -1.0);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_relative_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_relative_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_relative_eq!(lerp(2.0, 6.0, 0.5), 4.0);
    }
}
