use heliotype::stats::HistorySample;

/// Compute X (seconds) and Y (WPM) bounds for the results chart. The Y bound
/// covers both the net and raw series
pub fn compute_chart_params(history: &[HistorySample]) -> (f64, f64) {
    let mut highest = 0u32;
    for sample in history {
        highest = highest.max(sample.wpm).max(sample.raw);
    }

    let mut overall_duration = history.last().map_or(1.0, |s| s.time as f64);
    if overall_duration < 1.0 {
        overall_duration = 1.0;
    }

    (overall_duration, highest as f64)
}

/// Split the history into the two plotted series
pub fn series(history: &[HistorySample]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let net = history
        .iter()
        .map(|s| (s.time as f64, s.wpm as f64))
        .collect();
    let raw = history
        .iter()
        .map(|s| (s.time as f64, s.raw as f64))
        .collect();
    (net, raw)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_unit_bounds() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 1.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn bounds_cover_the_raw_series() {
        let history = [
            HistorySample {
                time: 1,
                wpm: 40,
                raw: 55,
            },
            HistorySample {
                time: 5,
                wpm: 44,
                raw: 48,
            },
        ];
        let (x, y) = compute_chart_params(&history);
        assert_eq!(x, 5.0);
        assert_eq!(y, 55.0);
    }

    #[test]
    fn series_split_preserves_order() {
        let history = [
            HistorySample {
                time: 1,
                wpm: 10,
                raw: 12,
            },
            HistorySample {
                time: 2,
                wpm: 20,
                raw: 22,
            },
        ];
        let (net, raw) = series(&history);
        assert_eq!(net, vec![(1.0, 10.0), (2.0, 20.0)]);
        assert_eq!(raw, vec![(1.0, 12.0), (2.0, 22.0)]);
    }

    #[test]
    fn format_label_trims_whole_numbers() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
