use crate::metrics::{EffectVector, MetricKey, MetricVector};

pub const METRIC_FLOOR: f64 = 0.0;
pub const METRIC_CEILING: f64 = 100.0;

pub fn normalize_percent(value: f64) -> f64 {
    value.clamp(METRIC_FLOOR, METRIC_CEILING)
}

pub fn normalize_metrics(metrics: &mut MetricVector) {
    for key in MetricKey::ALL {
        metrics.set(key, normalize_percent(metrics.get(key)));
    }
}

/// Adds the effect to the current metrics and clamps every field to [0, 100].
pub fn apply_effect(current: &MetricVector, effect: &EffectVector) -> MetricVector {
    let mut next = current.plus(effect);
    normalize_metrics(&mut next);
    next
}

#[cfg(test)]
mod tests {
    use crate::metrics::normalize::apply_effect;
    use crate::metrics::MetricVector;

    #[test]
    fn clamps_large_negative_effect_to_zero() {
        let current = MetricVector::new(10.0, 50.0, 50.0, 50.0, 50.0);
        let effect = MetricVector::new(-1000.0, 0.0, 0.0, 0.0, 0.0);
        let next = apply_effect(&current, &effect);
        assert_eq!(next.revenue, 0.0);
        assert_eq!(next.customer_satisfaction, 50.0);
    }

    #[test]
    fn clamps_overflow_to_hundred() {
        let current = MetricVector::uniform(95.0);
        let effect = MetricVector::new(10.0, 3.0, -5.0, 0.0, 20.0);
        let next = apply_effect(&current, &effect);
        assert_eq!(next.revenue, 100.0);
        assert_eq!(next.customer_satisfaction, 98.0);
        assert_eq!(next.staff_satisfaction, 90.0);
        assert_eq!(next.sustainability, 100.0);
    }
}
