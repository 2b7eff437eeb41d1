//! One-line terminal rendering of the live meter.

use splmeter::meter::{MeterSnapshot, Statistics};
use splmeter::safety::{format_exposure, normalized_level, safe_exposure_hours, SafetyLevel};

/// Characters for the meter bar.
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';
const PEAK_MARKER: char = '│';

/// Sparkline characters, quietest first.
const WAVEFORM_CHARS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub(crate) const BAR_WIDTH: usize = 30;

/// Horizontal bar over the 0-140 dB scale with a peak marker past the fill.
#[must_use]
pub(crate) fn format_level_bar(current_db: f64, peak_db: f64, width: usize) -> String {
    let fill = (normalized_level(current_db) * width as f64) as usize;
    let peak = (normalized_level(peak_db) * width as f64) as usize;

    (0..width)
        .map(|i| {
            if i < fill {
                BAR_FULL
            } else if i == peak && peak > fill {
                PEAK_MARKER
            } else {
                BAR_EMPTY
            }
        })
        .collect()
}

/// Sparkline spanning the whole `levels` window in `width` cells.
///
/// Short windows are left-padded with the floor glyph. Longer windows are bucketed
/// so each cell shows the loudest reading in its slice of time.
#[must_use]
pub(crate) fn format_sparkline(levels: &[f64], width: usize) -> String {
    let pad = width.saturating_sub(levels.len());
    let cells = width - pad;
    let glyphs = (0..cells).map(|cell| {
        let start = cell * levels.len() / cells;
        let end = ((cell + 1) * levels.len() / cells).max(start + 1);
        let loudest = levels[start..end].iter().copied().fold(f64::MIN, f64::max);
        waveform_glyph(loudest)
    });
    std::iter::repeat_n(WAVEFORM_CHARS[0], pad)
        .chain(glyphs)
        .collect()
}

fn waveform_glyph(db: f64) -> char {
    let top = WAVEFORM_CHARS.len() - 1;
    let idx = (normalized_level(db) * top as f64).round() as usize;
    WAVEFORM_CHARS[idx.min(top)]
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |db| format!("{db:.0}"))
}

pub(crate) fn format_statistics(stats: &Statistics) -> String {
    format!(
        "{}/{}/{}",
        fmt_stat(stats.min()),
        fmt_stat(stats.avg()),
        fmt_stat(stats.max())
    )
}

/// Safety band, followed by the daily exposure limit once one applies.
fn format_safety(db: f64) -> String {
    let band = SafetyLevel::for_level(db);
    match safe_exposure_hours(db) {
        Some(hours) => format!("{band}, {} max", format_exposure(hours)),
        None => band.to_string(),
    }
}

/// Full status line: bar, level, peak, min/avg/max, safety band and sparkline.
#[must_use]
pub(crate) fn format_status_line(
    snapshot: &MeterSnapshot,
    graph: &[f64],
    graph_width: usize,
) -> String {
    let unit = snapshot.weighting.label();
    format!(
        "{} {:>5.1} {unit}  peak {:>5.1}  min/avg/max {}  [{}]  {}",
        format_level_bar(snapshot.current_db, snapshot.peak_db, BAR_WIDTH),
        snapshot.current_db,
        snapshot.peak_db,
        format_statistics(&snapshot.statistics),
        format_safety(snapshot.current_db),
        format_sparkline(graph, graph_width),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use splmeter::dsp::WeightingMode;
    use splmeter::meter::MeterState;

    #[test]
    fn silent_bar_is_empty() {
        let bar = format_level_bar(0.0, 0.0, 10);
        assert_eq!(bar.chars().count(), 10);
        assert!(bar.chars().all(|c| c == BAR_EMPTY));
    }

    #[test]
    fn half_scale_bar_with_peak_marker() {
        let bar: Vec<char> = format_level_bar(70.0, 112.0, 10).chars().collect();
        assert_eq!(bar.iter().filter(|&&c| c == BAR_FULL).count(), 5);
        assert_eq!(bar[8], PEAK_MARKER);
    }

    #[test]
    fn full_scale_bar_clamps() {
        let bar = format_level_bar(200.0, 200.0, 8);
        assert!(bar.chars().all(|c| c == BAR_FULL));
    }

    #[test]
    fn sparkline_pads_and_keeps_recent_levels() {
        assert_eq!(format_sparkline(&[], 4), "▁▁▁▁");
        assert_eq!(format_sparkline(&[140.0], 3), "▁▁█");
        assert_eq!(format_sparkline(&[0.0, 0.0, 140.0, 0.0], 2), "▁█");
    }

    #[test]
    fn quiet_levels_carry_no_exposure_limit() {
        assert_eq!(format_safety(60.0), "Safe");
        assert_eq!(format_safety(85.0), "Limited exposure, 8 hours max");
    }

    #[test]
    fn sparkline_covers_the_whole_window() {
        // Five seconds at ten readings per second, loud for the first three.
        let mut levels = vec![140.0; 30];
        levels.extend([0.0; 20]);
        let line: Vec<char> = format_sparkline(&levels, 20).chars().collect();
        assert_eq!(line.len(), 20);
        assert!(line[..12].iter().all(|&c| c == '█'), "{line:?}");
        assert!(line[12..].iter().all(|&c| c == '▁'), "{line:?}");
    }

    #[test]
    fn sparkline_bucket_keeps_short_spikes() {
        let mut levels = vec![0.0; 40];
        levels[17] = 140.0;
        let line: Vec<char> = format_sparkline(&levels, 4).chars().collect();
        assert_eq!(line, vec!['▁', '█', '▁', '▁']);
    }

    #[test]
    fn empty_statistics_render_dashes() {
        assert_eq!(format_statistics(&Statistics::EMPTY), "--/--/--");
        assert_eq!(
            format_statistics(&Statistics::from_readings([40.0, 60.0])),
            "40/50/60"
        );
    }

    #[test]
    fn status_line_names_unit_and_band() {
        let snapshot = MeterSnapshot {
            state: MeterState::Running,
            weighting: WeightingMode::C,
            current_db: 91.0,
            peak_db: 95.0,
            statistics: Statistics::from_readings([91.0]),
        };
        let line = format_status_line(&snapshot, &[91.0], 5);
        assert!(line.contains(" 91.0 dBC"), "{line}");
        assert!(line.contains("peak  95.0"), "{line}");
        assert!(line.contains("[Hearing damage risk, 2 hours max]"), "{line}");
    }
}
