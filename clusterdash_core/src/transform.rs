//! Pure conversions from raw sample series to display-ready series.
//!
//! `BytesAuto` picks its unit per call from the series' largest magnitude.
//! Two calls over neighbouring windows can therefore land on different
//! units (MB one refresh, GB the next) when the data sits near a boundary.

const K: f64 = 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    BytesAuto,
    RatioToPercent,
    NsToSeconds,
    MsToSeconds,
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Count,
    Bytes,
    KB,
    MB,
    GB,
    TB,
    Percent,
    Seconds,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Count => "",
            Unit::Bytes => "B",
            Unit::KB => "KB",
            Unit::MB => "MB",
            Unit::GB => "GB",
            Unit::TB => "TB",
            Unit::Percent => "%",
            Unit::Seconds => "s",
        }
    }

    fn divisor(self) -> f64 {
        match self {
            Unit::KB => K,
            Unit::MB => K * K,
            Unit::GB => K * K * K,
            Unit::TB => K * K * K * K,
            _ => 1.0,
        }
    }
}

/// A series ready for plotting. `None` marks a hole: the chart shows a gap
/// there, never a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySeries {
    pub values: Vec<Option<f64>>,
    pub unit: Unit,
}

impl DisplaySeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }
}

/// Byte unit for a magnitude, using 1024-based breakpoints.
pub fn bytes_unit(magnitude: f64) -> Unit {
    let m = magnitude.abs();
    if m >= K * K * K * K {
        Unit::TB
    } else if m >= K * K * K {
        Unit::GB
    } else if m >= K * K {
        Unit::MB
    } else if m >= K {
        Unit::KB
    } else {
        Unit::Bytes
    }
}

/// Convert `raw` for display. A missing series is an empty one.
pub fn to_display(raw: Option<&[f64]>, kind: UnitKind) -> DisplaySeries {
    let raw = raw.unwrap_or(&[]);
    let (unit, scale) = match kind {
        UnitKind::Identity => (Unit::Count, Scale::Mul(1.0)),
        UnitKind::RatioToPercent => (Unit::Percent, Scale::Mul(100.0)),
        UnitKind::NsToSeconds => (Unit::Seconds, Scale::Div(1e9)),
        UnitKind::MsToSeconds => (Unit::Seconds, Scale::Div(1000.0)),
        UnitKind::BytesAuto => {
            let peak = raw
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(0.0_f64, |acc, v| acc.max(v.abs()));
            let unit = bytes_unit(peak);
            (unit, Scale::Div(unit.divisor()))
        }
    };
    DisplaySeries {
        values: raw
            .iter()
            .map(|&v| v.is_finite().then(|| scale.apply(v)))
            .collect(),
        unit,
    }
}

#[derive(Clone, Copy)]
enum Scale {
    Mul(f64),
    Div(f64),
}

impl Scale {
    fn apply(self, v: f64) -> f64 {
        match self {
            Scale::Mul(m) => v * m,
            Scale::Div(d) => v / d,
        }
    }
}

/// Like [`to_display`], but index-aligned to a timestamp series of `len`
/// points. A short series is padded with holes; extra points are dropped.
pub fn to_display_aligned(raw: Option<&[f64]>, kind: UnitKind, len: usize) -> DisplaySeries {
    let mut out = to_display(raw, kind);
    out.values.resize(len, None);
    out
}

/// Round to `places` decimals, for labels.
pub fn round_to(v: f64, places: i32) -> f64 {
    let p = 10f64.powi(places);
    (v * p).round() / p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_gib_is_one_gb() {
        let out = to_display(Some(&[1_073_741_824.0]), UnitKind::BytesAuto);
        assert_eq!(out.unit, Unit::GB);
        assert_eq!(out.values, vec![Some(1.0)]);
        assert_eq!(round_to(out.values[0].unwrap(), 2), 1.00);
    }

    #[test]
    fn empty_and_missing_series_do_not_panic() {
        assert!(to_display(Some(&[]), UnitKind::NsToSeconds).is_empty());
        assert!(to_display(None, UnitKind::RatioToPercent).is_empty());
        assert!(to_display(None, UnitKind::BytesAuto).is_empty());
    }

    #[test]
    fn bytes_unit_breakpoints() {
        assert_eq!(bytes_unit(1023.0), Unit::Bytes);
        assert_eq!(bytes_unit(1024.0), Unit::KB);
        assert_eq!(bytes_unit(1024.0 * 1024.0), Unit::MB);
        assert_eq!(bytes_unit(5.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0), Unit::TB);
    }

    #[test]
    fn unit_is_chosen_per_call() {
        let near = 1024.0 * 1024.0 * 1024.0;
        let a = to_display(Some(&[near - 1.0]), UnitKind::BytesAuto);
        let b = to_display(Some(&[near]), UnitKind::BytesAuto);
        assert_eq!(a.unit, Unit::MB);
        assert_eq!(b.unit, Unit::GB);
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(
            to_display(Some(&[0.5]), UnitKind::RatioToPercent).values,
            vec![Some(50.0)]
        );
        assert_eq!(
            to_display(Some(&[2_500_000_000.0]), UnitKind::NsToSeconds).values,
            vec![Some(2.5)]
        );
        assert_eq!(
            to_display(Some(&[1500.0]), UnitKind::MsToSeconds).values,
            vec![Some(1.5)]
        );
        assert_eq!(
            to_display(Some(&[7.0]), UnitKind::Identity).unit,
            Unit::Count
        );
    }

    #[test]
    fn short_series_is_padded_with_holes_not_zeros() {
        let out = to_display_aligned(Some(&[1.0, 2.0]), UnitKind::Identity, 4);
        assert_eq!(out.values, vec![Some(1.0), Some(2.0), None, None]);
        let out = to_display_aligned(None, UnitKind::MsToSeconds, 2);
        assert_eq!(out.values, vec![None, None]);
        let out = to_display_aligned(Some(&[1.0, 2.0, 3.0]), UnitKind::Identity, 2);
        assert_eq!(out.values.len(), 2);
    }
}
