use std::collections::VecDeque;

use crate::printer::TemperatureSample;

/// Ten minutes of samples at one per second.
pub const HISTORY_CAPACITY: usize = 600;

/// Bounded temperature log. Inserting past capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct TemperatureHistory {
    samples: VecDeque<TemperatureSample>,
    capacity: usize,
}

impl TemperatureHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample and returns the evicted one, if any.
    pub fn push(&mut self, sample: TemperatureSample) -> Option<TemperatureSample> {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TemperatureSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemperatureSample> {
        self.samples.iter()
    }

    /// Owned copy, oldest first.
    pub fn to_vec(&self) -> Vec<TemperatureSample> {
        self.samples.iter().copied().collect()
    }
}

impl Default for TemperatureHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn sample(ms: i64) -> TemperatureSample {
        TemperatureSample {
            timestamp: DateTime::<Utc>::from_timestamp_millis(ms).unwrap(),
            extruder_temp: 20.0,
            bed_temp: 20.0,
        }
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut history = TemperatureHistory::with_capacity(3);
        assert!(history.push(sample(1)).is_none());
        assert!(history.push(sample(2)).is_none());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut history = TemperatureHistory::with_capacity(3);
        for ms in 1..=3 {
            history.push(sample(ms));
        }
        let evicted = history.push(sample(4)).unwrap();
        assert_eq!(evicted.timestamp.timestamp_millis(), 1);
        let kept: Vec<i64> = history.iter().map(|s| s.timestamp.timestamp_millis()).collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn test_default_capacity() {
        let mut history = TemperatureHistory::new();
        for ms in 0..(HISTORY_CAPACITY as i64 + 25) {
            history.push(sample(ms));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.iter().next().unwrap().timestamp.timestamp_millis(), 25);
        assert_eq!(
            history.latest().unwrap().timestamp.timestamp_millis(),
            HISTORY_CAPACITY as i64 + 24
        );
    }

    #[test]
    fn test_copy_is_detached() {
        let mut history = TemperatureHistory::with_capacity(2);
        history.push(sample(1));
        let mut copy = history.to_vec();
        copy.clear();
        assert_eq!(history.len(), 1);
    }
}
