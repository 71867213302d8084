use std::collections::VecDeque;

use statrs::statistics::Statistics;

/// Number of trailing returns used to estimate realized volatility.
pub const VOLATILITY_WINDOW: usize = 20;

/// Fixed-capacity FIFO of the most recent realized returns (historical
/// seed values first, then simulated ones). Pushing onto a full window
/// evicts the oldest value; the capacity never changes.
#[derive(Debug, Clone)]
pub struct VolatilityWindow {
    returns: VecDeque<f64>,
    capacity: usize,
}

impl VolatilityWindow {
    /// Seed a window from the trailing historical returns. Takes at most
    /// `capacity` values from the end of the slice; a history shorter
    /// than the capacity seeds a partially filled window.
    pub fn from_trailing(capacity: usize, history: &[f64]) -> Self {
        let start = history.len().saturating_sub(capacity);
        let returns: VecDeque<f64> = history[start..].iter().copied().collect();
        Self { returns, capacity }
    }

    /// Append a return, evicting the oldest one if the window is full.
    pub fn push(&mut self, value: f64) {
        if self.returns.len() == self.capacity {
            self.returns.pop_front();
        }
        self.returns.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Population standard deviation (divide by N, not N-1) of the
    /// current contents. Returns 0.0 for an empty window.
    pub fn std_dev(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().population_std_dev()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.returns.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_trailing_takes_last_values() {
        let history: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let window = VolatilityWindow::from_trailing(20, &history);
        assert_eq!(window.len(), 20);
        let values: Vec<f64> = window.values().collect();
        assert_eq!(values[0], 10.0);
        assert_eq!(values[19], 29.0);
    }

    #[test]
    fn test_from_trailing_short_history() {
        let window = VolatilityWindow::from_trailing(20, &[0.01, -0.02]);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_push_evicts_oldest_once_full() {
        let mut window = VolatilityWindow::from_trailing(3, &[1.0, 2.0, 3.0]);
        window.push(4.0);
        assert_eq!(window.len(), 3);
        let values: Vec<f64> = window.values().collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_push_fills_before_evicting() {
        let mut window = VolatilityWindow::from_trailing(3, &[1.0]);
        window.push(2.0);
        assert_eq!(window.len(), 2);
        window.push(3.0);
        assert_eq!(window.len(), 3);
        window.push(4.0);
        let values: Vec<f64> = window.values().collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_population_std_dev() {
        // Known population standard deviation: σ([2,4,4,4,5,5,7,9]) = 2.
        let window =
            VolatilityWindow::from_trailing(8, &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((window.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_divides_by_n() {
        // Sample std dev of [1, 3] is sqrt(2); population is 1.
        let window = VolatilityWindow::from_trailing(2, &[1.0, 3.0]);
        assert!((window.std_dev() - 1.0).abs() < 1e-12);
    }
}
