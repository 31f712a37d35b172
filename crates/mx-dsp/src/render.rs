//! Full-track offline render: input gain -> EQ -> compressor -> gate ->
//! saturator -> fader/pan -> hard clip
//!
//! Every stage is gated by its own activity test so an untouched track is a
//! byte-identical passthrough and callers can skip rendering entirely.

use mx_core::{EffectKind, EffectState, TrackState, db_to_gain, effect_spec};

use crate::EPSILON;
use crate::dynamics::{Compressor, Gate};
use crate::eq::ThreeBandEq;
use crate::saturation::Saturator;
use crate::clip;

/// True when any gain/pan/parameter differs from its silence-default by more
/// than epsilon. Inactive tracks render as exact copies.
pub fn track_processing_active(track: &TrackState) -> bool {
    if track.input_gain_db.abs() > EPSILON
        || track.fader_db.abs() > EPSILON
        || track.pan.abs() > EPSILON
    {
        return true;
    }
    EffectKind::ALL
        .iter()
        .any(|&kind| effect_active(track.fx_chain.effect(kind)))
}

/// True when any of the effect's parameters differs from its spec default.
pub fn effect_active(state: &EffectState) -> bool {
    effect_spec(state.kind)
        .parameters
        .iter()
        .any(|spec| (state.param_or_default(spec.param_id) - spec.default).abs() > EPSILON)
}

/// Render per-channel sample buffers through a track's full mixer state.
///
/// Pure with respect to its inputs: the track state is read-only and a new
/// buffer is returned. Degenerate inputs (no channels, empty channels, zero
/// sample rate) come back unchanged apart from gain staging.
pub fn render_track(channels: &[Vec<f64>], sample_rate: u32, track: &TrackState) -> Vec<Vec<f64>> {
    if !track_processing_active(track) {
        return channels.to_vec();
    }

    let chain = &track.fx_chain;
    let eq_state = chain.effect(EffectKind::Eq);
    let comp_state = chain.effect(EffectKind::Compressor);
    let gate_state = chain.effect(EffectKind::Gate);
    let sat_state = chain.effect(EffectKind::Saturator);

    let eq_active = effect_active(eq_state);
    let comp_active = effect_active(comp_state);
    let gate_active = effect_active(gate_state);
    let sat_active = effect_active(sat_state);

    let input_gain = db_to_gain(track.input_gain_db);

    let mut processed: Vec<Vec<f64>> = Vec::with_capacity(channels.len());
    for channel in channels {
        let mut samples: Vec<f64> = channel.iter().map(|s| s * input_gain).collect();

        if eq_active {
            let mut eq = ThreeBandEq::new(
                sample_rate,
                eq_state.param_or_default("low_gain_db"),
                eq_state.param_or_default("mid_gain_db"),
                eq_state.param_or_default("high_gain_db"),
                eq_state.param_or_default("low_freq_hz"),
                eq_state.param_or_default("high_freq_hz"),
            );
            eq.process_block(&mut samples);
        }
        if comp_active {
            let mut comp = Compressor::new(
                sample_rate,
                comp_state.param_or_default("threshold_db"),
                comp_state.param_or_default("ratio"),
                comp_state.param_or_default("attack_ms"),
                comp_state.param_or_default("release_ms"),
                comp_state.param_or_default("makeup_db"),
            );
            comp.process_block(&mut samples);
        }
        if gate_active {
            let mut gate = Gate::new(
                sample_rate,
                gate_state.param_or_default("threshold_db"),
                gate_state.param_or_default("attack_ms"),
                gate_state.param_or_default("release_ms"),
            );
            gate.process_block(&mut samples);
        }
        if sat_active {
            let sat = Saturator::new(
                sat_state.param_or_default("drive"),
                sat_state.param_or_default("mix"),
            );
            sat.process_block(&mut samples);
        }
        processed.push(samples);
    }

    apply_output_gain_and_pan(&mut processed, track);
    for channel in &mut processed {
        for sample in channel.iter_mut() {
            *sample = clip(*sample);
        }
    }
    log::debug!(
        "rendered track '{}': {} channels, eq={} comp={} gate={} sat={}",
        track.track_id,
        processed.len(),
        eq_active,
        comp_active,
        gate_active,
        sat_active
    );
    processed
}

/// Output stage: fader gain, constant-power pan law for the first two
/// channels, fader-only for any channels beyond.
fn apply_output_gain_and_pan(channels: &mut [Vec<f64>], track: &TrackState) {
    if channels.is_empty() {
        return;
    }
    let output_gain = db_to_gain(track.fader_db);

    if channels.len() == 1 {
        for sample in channels[0].iter_mut() {
            *sample *= output_gain;
        }
        return;
    }

    let pan = track.pan.clamp(-1.0, 1.0);
    let angle = (pan + 1.0) * (std::f64::consts::PI / 4.0);
    let left_gain = angle.cos() * output_gain;
    let right_gain = angle.sin() * output_gain;

    for sample in channels[0].iter_mut() {
        *sample *= left_gain;
    }
    for sample in channels[1].iter_mut() {
        *sample *= right_gain;
    }
    for channel in channels.iter_mut().skip(2) {
        for sample in channel.iter_mut() {
            *sample *= output_gain;
        }
    }
}
