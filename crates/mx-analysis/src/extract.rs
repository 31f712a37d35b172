//! Feature extraction arithmetic for quick and full analysis modes

use mx_core::{AnalysisMode, TrackFeatures, amp_to_db};

/// Feature floor returned for digital silence (empty or all-zero signals).
fn floor_features() -> TrackFeatures {
    TrackFeatures {
        lufs: -70.0,
        peak_dbfs: -70.0,
        rms_dbfs: -70.0,
        crest_factor_db: 0.0,
        spectral_centroid_hz: 0.0,
        band_energy_low: 0.0,
        band_energy_mid: 0.0,
        band_energy_high: 0.0,
        dynamic_range_db: 0.0,
        loudness_range_db: 0.0,
        transient_density: 0.0,
        zero_crossing_rate: 0.0,
    }
}

/// Extract the fixed feature vector from a mono signal.
pub fn extract_features(signal: &[f64], mode: AnalysisMode) -> TrackFeatures {
    let peak = signal.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
    if signal.is_empty() || peak == 0.0 {
        return floor_features();
    }
    match mode {
        AnalysisMode::Quick => extract_quick(signal),
        AnalysisMode::Full => extract_full(signal),
    }
}

fn extract_quick(signal: &[f64]) -> TrackFeatures {
    let abs_samples: Vec<f64> = signal.iter().map(|s| s.abs()).collect();
    let peak = abs_samples.iter().fold(0.0_f64, |a, &s| a.max(s));
    let mean_square = signal.iter().map(|s| s * s).sum::<f64>() / signal.len() as f64;
    let rms = mean_square.sqrt();

    // Stride-3 bucket split: cheap stand-in for a band decomposition.
    let low_bucket: f64 = abs_samples.iter().step_by(3).sum();
    let mid_bucket: f64 = abs_samples.iter().skip(1).step_by(3).sum();
    let high_bucket: f64 = abs_samples.iter().skip(2).step_by(3).sum();
    let bucket_sum = non_zero(low_bucket + mid_bucket + high_bucket);

    let centroid = (90.0 * low_bucket + 1200.0 * mid_bucket + 6500.0 * high_bucket) / bucket_sum;

    let percentile_95 = percentile(&abs_samples, 95);
    let percentile_10 = percentile(&abs_samples, 10);
    let dynamic_range = amp_to_db(percentile_95) - amp_to_db(percentile_10.max(1e-8));
    let loudness_range = dynamic_range * 0.75;

    let peak_db = amp_to_db(peak);
    let rms_db = amp_to_db(rms.max(1e-8));

    TrackFeatures {
        lufs: rms_db - 1.0,
        peak_dbfs: peak_db,
        rms_dbfs: rms_db,
        crest_factor_db: peak_db - rms_db,
        spectral_centroid_hz: centroid,
        band_energy_low: low_bucket / bucket_sum,
        band_energy_mid: mid_bucket / bucket_sum,
        band_energy_high: high_bucket / bucket_sum,
        dynamic_range_db: dynamic_range,
        loudness_range_db: loudness_range,
        transient_density: transient_density(signal, 0.06),
        zero_crossing_rate: zero_crossing_rate(signal),
    }
}

fn extract_full(signal: &[f64]) -> TrackFeatures {
    let abs_samples: Vec<f64> = signal.iter().map(|s| s.abs()).collect();
    let peak = abs_samples.iter().fold(0.0_f64, |a, &s| a.max(s));
    let mean_square = signal.iter().map(|s| s * s).sum::<f64>() / signal.len() as f64;
    let rms = mean_square.sqrt();

    let (low_bucket, mid_bucket, high_bucket) = full_band_energies(signal);
    let bucket_sum = non_zero(low_bucket + mid_bucket + high_bucket);
    let centroid = (120.0 * low_bucket + 1500.0 * mid_bucket + 8000.0 * high_bucket) / bucket_sum;

    let percentile_95 = percentile(&abs_samples, 95);
    let percentile_10 = percentile(&abs_samples, 10);
    let dynamic_range = amp_to_db(percentile_95) - amp_to_db(percentile_10.max(1e-8));

    let frame_rms = frame_rms(signal, 1024);
    let loudness_range =
        amp_to_db(percentile(&frame_rms, 95)) - amp_to_db(percentile(&frame_rms, 10).max(1e-8));

    let peak_db = amp_to_db(peak);
    let rms_db = amp_to_db(rms.max(1e-8));

    TrackFeatures {
        lufs: rms_db - 0.5,
        peak_dbfs: peak_db,
        rms_dbfs: rms_db,
        crest_factor_db: peak_db - rms_db,
        spectral_centroid_hz: centroid,
        band_energy_low: low_bucket / bucket_sum,
        band_energy_mid: mid_bucket / bucket_sum,
        band_energy_high: high_bucket / bucket_sum,
        dynamic_range_db: dynamic_range,
        loudness_range_db: loudness_range,
        transient_density: transient_density(signal, 0.04),
        zero_crossing_rate: zero_crossing_rate(signal),
    }
}

#[inline]
fn non_zero(value: f64) -> f64 {
    if value == 0.0 { 1.0 } else { value }
}

/// One-pole low/high/mid decomposition, leak coefficient 0.97.
fn full_band_energies(signal: &[f64]) -> (f64, f64, f64) {
    let mut low_energy = 0.0;
    let mut mid_energy = 0.0;
    let mut high_energy = 0.0;
    let mut lp = 0.0;

    for &sample in signal {
        lp = 0.97 * lp + 0.03 * sample;
        let hp = sample - lp;
        let mp = sample - lp - hp * 0.4;
        low_energy += lp.abs();
        mid_energy += mp.abs();
        high_energy += hp.abs();
    }
    (low_energy, mid_energy, high_energy)
}

/// RMS per non-overlapping frame, floored at 1e-8 per frame.
fn frame_rms(signal: &[f64], frame_size: usize) -> Vec<f64> {
    if frame_size == 0 {
        return vec![0.0];
    }
    let values: Vec<f64> = signal
        .chunks(frame_size)
        .filter(|frame| !frame.is_empty())
        .map(|frame| {
            let energy = frame.iter().map(|s| s * s).sum::<f64>() / frame.len() as f64;
            energy.sqrt().max(1e-8)
        })
        .collect();
    if values.is_empty() { vec![1e-8] } else { values }
}

/// Fraction of adjacent-sample deltas at or above `threshold`.
fn transient_density(signal: &[f64], threshold: f64) -> f64 {
    if signal.len() < 2 {
        return 0.0;
    }
    let transients = signal
        .windows(2)
        .filter(|w| (w[1] - w[0]).abs() >= threshold)
        .count();
    transients as f64 / (signal.len() - 1) as f64
}

/// Fraction of adjacent-sample sign changes.
fn zero_crossing_rate(signal: &[f64]) -> f64 {
    if signal.len() < 2 {
        return 0.0;
    }
    let crossings = signal
        .windows(2)
        .filter(|w| (w[0] < 0.0 && w[1] >= 0.0) || (w[0] > 0.0 && w[1] <= 0.0))
        .count();
    crossings as f64 / (signal.len() - 1) as f64
}

/// Percentile with linear interpolation between bracketing order statistics.
fn percentile(values: &[f64], percentile: u32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut ordered = values.to_vec();
    ordered.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = percentile.min(100) as f64 / 100.0 * (ordered.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return ordered[lower];
    }
    let fraction = rank - lower as f64;
    ordered[lower] + fraction * (ordered[upper] - ordered[lower])
}
