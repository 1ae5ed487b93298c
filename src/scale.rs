// 📐 Scale & Layout - Coordinate mappings and tick generation
//
// Date axes pick one of three regimes before computing a domain:
// a single point, a cluster on one calendar day, or a multi-day series.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Synthetic window around a single point / same-day cluster
const SYNTHETIC_MONTHS: u32 = 2;
/// Padding on each side of a multi-day domain
const GENERAL_PADDING: f64 = 0.05;
const GENERAL_TICKS: usize = 6;
/// Headroom above the largest value
const VALUE_HEADROOM: f64 = 1.1;
const VALUE_TICKS: usize = 5;
/// Horizontal spread of a same-day cluster around the chart center
const CLUSTER_SPREAD: f64 = 20.0;

// ============================================================================
// LINEAR SCALE
// ============================================================================

/// Map `value` from `[domain_min, domain_max]` onto `[0, range_max]`.
/// A degenerate domain maps everything to the middle of the range.
pub fn linear_scale(value: f64, domain_min: f64, domain_max: f64, range_max: f64) -> f64 {
    let span = domain_max - domain_min;
    if span == 0.0 || !span.is_finite() {
        return range_max / 2.0;
    }
    (value - domain_min) / span * range_max
}

/// `[min - pad, max + pad]` when the domain has zero width, unchanged otherwise
pub fn padded_domain(min: f64, max: f64, pad: f64) -> (f64, f64) {
    if max == min {
        (min - pad, max + pad)
    } else {
        (min, max)
    }
}

// ============================================================================
// DATE AXIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutRegime {
    SinglePoint,
    SameDay,
    General,
}

impl LayoutRegime {
    /// Regime for a series; `None` when empty
    pub fn classify(dates: &[DateTime<Utc>]) -> Option<LayoutRegime> {
        let first = dates.first()?;
        if dates.len() == 1 {
            return Some(LayoutRegime::SinglePoint);
        }
        let day = first.date_naive();
        if dates.iter().all(|d| d.date_naive() == day) {
            Some(LayoutRegime::SameDay)
        } else {
            Some(LayoutRegime::General)
        }
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self, LayoutRegime::General)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateAxis {
    pub regime: LayoutRegime,
    pub domain_min: DateTime<Utc>,
    pub domain_max: DateTime<Utc>,
    /// Earliest point of the series (center of synthetic domains)
    pub anchor: DateTime<Utc>,
    pub ticks: Vec<DateTime<Utc>>,
    pub width: f64,
}

impl DateAxis {
    /// Proportional x-position of a date
    pub fn x(&self, date: &DateTime<Utc>) -> f64 {
        linear_scale(
            date.timestamp_millis() as f64,
            self.domain_min.timestamp_millis() as f64,
            self.domain_max.timestamp_millis() as f64,
            self.width,
        )
    }

    /// x-position of the `index`-th of `count` points. Same-day clusters are
    /// spread over `count` equal steps starting half the spread left of the
    /// center, instead of by timestamp.
    pub fn point_x(&self, index: usize, count: usize, date: &DateTime<Utc>) -> f64 {
        match self.regime {
            LayoutRegime::SameDay => {
                // Last point stops one step short of center + spread/2, so the cluster sits left of center
                let count = count.max(1) as f64;
                self.width / 2.0 - CLUSTER_SPREAD / 2.0 + index as f64 * CLUSTER_SPREAD / count
            }
            _ => self.x(date),
        }
    }
}

fn midpoint(a: &DateTime<Utc>, b: &DateTime<Utc>) -> DateTime<Utc> {
    *a + (*b - *a) / 2
}

/// Domain and ticks for a date series laid out across `width` pixels.
pub fn date_axis_layout(dates: &[DateTime<Utc>], width: f64) -> Option<DateAxis> {
    let regime = LayoutRegime::classify(dates)?;
    let min = *dates.iter().min()?;
    let max = *dates.iter().max()?;

    let axis = if regime.is_synthetic() {
        let months = Months::new(SYNTHETIC_MONTHS);
        let domain_min = min.checked_sub_months(months).unwrap_or(min);
        let domain_max = min.checked_add_months(months).unwrap_or(min);
        let ticks = vec![
            domain_min,
            midpoint(&domain_min, &min),
            min,
            midpoint(&min, &domain_max),
            domain_max,
        ];
        DateAxis { regime, domain_min, domain_max, anchor: min, ticks, width }
    } else {
        let range_ms = (max - min).num_milliseconds() as f64;
        let pad = Duration::milliseconds((range_ms * GENERAL_PADDING).round() as i64);
        let domain_min = min - pad;
        let domain_max = max + pad;
        let padded_ms = (domain_max - domain_min).num_milliseconds() as f64;
        let step = padded_ms / (GENERAL_TICKS - 1) as f64;
        let ticks = (0..GENERAL_TICKS)
            .map(|i| domain_min + Duration::milliseconds((step * i as f64).round() as i64))
            .collect();
        DateAxis { regime, domain_min, domain_max, anchor: min, ticks, width }
    };

    Some(axis)
}

// ============================================================================
// VALUE AXIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTick {
    pub value: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    /// Largest value times the headroom factor
    pub domain_max: f64,
    pub height: f64,
    /// Bottom (0) to top (domain_max)
    pub ticks: Vec<ValueTick>,
}

impl ValueAxis {
    /// SVG y grows downward, so 0 sits at `height`
    pub fn y(&self, value: f64) -> f64 {
        self.height - linear_scale(value, 0.0, self.domain_max, self.height)
    }
}

/// y-domain `[0, max * 1.1]` with 5 evenly spaced ticks.
pub fn value_axis_layout(values: &[f64], height: f64) -> Option<ValueAxis> {
    let max = values.iter().copied().filter(|v| v.is_finite()).reduce(f64::max)?;
    // An all-zero series still gets a usable [0, 1] domain
    let (_, domain_max) = padded_domain(0.0, (max * VALUE_HEADROOM).max(0.0), 1.0);

    let mut axis = ValueAxis { domain_max, height, ticks: Vec::with_capacity(VALUE_TICKS) };
    let step = domain_max / (VALUE_TICKS - 1) as f64;
    let ticks: Vec<ValueTick> = (0..VALUE_TICKS)
        .map(|i| {
            let value = step * i as f64;
            ValueTick { value, y: axis.y(value) }
        })
        .collect();
    axis.ticks = ticks;

    Some(axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_linear_scale() {
        assert_eq!(linear_scale(5.0, 0.0, 10.0, 200.0), 100.0);
        assert_eq!(linear_scale(0.0, 0.0, 10.0, 200.0), 0.0);
        // Degenerate domain never divides by zero
        assert_eq!(linear_scale(3.0, 3.0, 3.0, 200.0), 100.0);
        assert_eq!(padded_domain(4.0, 4.0, 1.0), (3.0, 5.0));
        assert_eq!(padded_domain(1.0, 4.0, 1.0), (1.0, 4.0));
    }

    #[test]
    fn test_regime_classification() {
        assert_eq!(LayoutRegime::classify(&[]), None);
        assert_eq!(LayoutRegime::classify(&[day(1, 1)]), Some(LayoutRegime::SinglePoint));
        assert_eq!(LayoutRegime::classify(&[day(1, 1), day(1, 20)]), Some(LayoutRegime::SameDay));
        assert_eq!(LayoutRegime::classify(&[day(1, 1), day(2, 1)]), Some(LayoutRegime::General));
    }

    #[test]
    fn test_single_point_synthetic_domain() {
        let point = day(15, 12);
        let axis = date_axis_layout(&[point], 400.0).unwrap();

        assert_eq!(axis.regime, LayoutRegime::SinglePoint);
        assert_eq!(axis.domain_min, Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap());
        assert_eq!(axis.domain_max, Utc.with_ymd_and_hms(2024, 8, 15, 12, 0, 0).unwrap());
        assert_eq!(axis.ticks.len(), 5);
        assert_eq!(axis.ticks[2], point);
        assert!(axis.ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_same_day_points_spread_around_center() {
        let dates = vec![day(3, 8), day(3, 12), day(3, 18), day(3, 22)];
        let axis = date_axis_layout(&dates, 400.0).unwrap();

        assert_eq!(axis.regime, LayoutRegime::SameDay);
        assert_eq!(axis.ticks.len(), 5);
        let xs: Vec<f64> = dates.iter().enumerate().map(|(i, d)| axis.point_x(i, 4, d)).collect();
        assert_eq!(xs, vec![190.0, 195.0, 200.0, 205.0]);
    }

    #[test]
    fn test_same_day_cluster_leans_left_of_center() {
        let dates = vec![day(3, 9), day(3, 17)];
        let axis = date_axis_layout(&dates, 300.0).unwrap();

        let xs: Vec<f64> = dates.iter().enumerate().map(|(i, d)| axis.point_x(i, 2, d)).collect();
        assert_eq!(xs, vec![140.0, 150.0]);
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        assert!(mean < 150.0);
    }

    #[test]
    fn test_general_domain_padding_and_ticks() {
        let dates = vec![day(1, 0), day(11, 0)];
        let axis = date_axis_layout(&dates, 1100.0).unwrap();

        assert_eq!(axis.regime, LayoutRegime::General);
        assert_eq!(axis.domain_min, day(1, 0) - Duration::hours(12));
        assert_eq!(axis.domain_max, day(11, 0) + Duration::hours(12));
        assert_eq!(axis.ticks.len(), 6);
        assert_eq!(axis.ticks[0], axis.domain_min);
        assert_eq!(axis.ticks[5], axis.domain_max);
        // 5% padding on each side of an 11-unit padded range
        assert!((axis.point_x(0, 2, &dates[0]) - 50.0).abs() < 1e-6);
        assert!((axis.point_x(1, 2, &dates[1]) - 1050.0).abs() < 1e-6);
    }

    #[test]
    fn test_value_axis() {
        let axis = value_axis_layout(&[10.0, 40.0, 20.0], 220.0).unwrap();

        assert!((axis.domain_max - 44.0).abs() < 1e-9);
        assert_eq!(axis.ticks.len(), 5);
        assert_eq!(axis.ticks[0].y, 220.0);
        assert_eq!(axis.ticks[4].y, 0.0);
        assert_eq!(axis.y(0.0), 220.0);
    }

    #[test]
    fn test_value_axis_degenerate() {
        assert!(value_axis_layout(&[], 100.0).is_none());
        let axis = value_axis_layout(&[0.0, 0.0], 100.0).unwrap();
        assert_eq!(axis.domain_max, 1.0);
        assert_eq!(axis.y(0.0), 100.0);
    }
}
