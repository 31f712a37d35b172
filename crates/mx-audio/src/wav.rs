//! WAV read/write and the offline preview render
//!
//! Container parsing goes through `hound`; sample values are scaled with the
//! same full-scale constants as the raw PCM codec so file and in-memory
//! paths agree bit for bit.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use mx_core::TrackState;
use mx_dsp::codec::BitDepth;
use mx_dsp::render::{render_track, track_processing_active};

use crate::error::{AudioError, AudioResult};

/// Decoded WAV contents as per-channel f64 buffers.
#[derive(Debug, Clone)]
pub struct WavBuffer {
    pub sample_rate: u32,
    pub depth: BitDepth,
    pub channels: Vec<Vec<f64>>,
}

impl WavBuffer {
    pub fn frame_count(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }
}

fn depth_for_spec(spec: &WavSpec) -> AudioResult<BitDepth> {
    if spec.sample_format != SampleFormat::Int {
        return Err(AudioError::UnsupportedSampleFormat);
    }
    BitDepth::from_bits(spec.bits_per_sample)
        .ok_or(AudioError::UnsupportedBitDepth(spec.bits_per_sample))
}

/// Read an integer-PCM WAV file into per-channel f64 buffers.
pub fn read_wav(path: impl AsRef<Path>) -> AudioResult<WavBuffer> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::InvalidChannelCount);
    }
    let depth = depth_for_spec(&spec)?;
    let scale = depth.scale();
    let channel_count = spec.channels as usize;

    let mut channels: Vec<Vec<f64>> = vec![Vec::new(); channel_count];
    for (index, sample) in reader.samples::<i32>().enumerate() {
        channels[index % channel_count].push(sample? as f64 / scale);
    }
    // Drop a trailing partial frame so channels stay frame-aligned.
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    for channel in &mut channels {
        channel.truncate(frames);
    }

    Ok(WavBuffer {
        sample_rate: spec.sample_rate,
        depth,
        channels,
    })
}

/// Write per-channel f64 buffers as an integer-PCM WAV file.
pub fn write_wav(path: impl AsRef<Path>, buffer: &WavBuffer) -> AudioResult<()> {
    let spec = WavSpec {
        channels: buffer.channels.len() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: buffer.depth.bits(),
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    let frames = buffer.frame_count();
    for index in 0..frames {
        for channel in &buffer.channels {
            writer.write_sample(encode_int(channel[index], buffer.depth))?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Quantize a sample to the signed integer value hound expects for a depth.
fn encode_int(value: f64, depth: BitDepth) -> i32 {
    let clipped = value.clamp(-1.0, 1.0);
    match depth {
        BitDepth::Bits8 => {
            let v = (clipped * 127.5 + 128.0).round().clamp(0.0, 255.0) as i32;
            v - 128
        }
        BitDepth::Bits16 => (clipped * 32767.0).round().clamp(-32768.0, 32767.0) as i32,
        BitDepth::Bits24 => {
            (clipped * 8_388_607.0)
                .round()
                .clamp(-8_388_608.0, 8_388_607.0) as i32
        }
        BitDepth::Bits32 => {
            (clipped * 2_147_483_647.0)
                .round()
                .clamp(-2_147_483_648.0, 2_147_483_647.0) as i32
        }
    }
}

/// Render a track's mixer state over a source WAV into a target file.
///
/// When no processing is active the source bytes are copied verbatim, which
/// keeps untouched tracks byte-identical and skips the DSP entirely.
pub fn render_preview_file(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    track: &TrackState,
) -> AudioResult<PathBuf> {
    let source = source.as_ref();
    let target = target.as_ref().to_path_buf();
    if !source.exists() {
        return Err(AudioError::SourceNotFound(source.display().to_string()));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if !track_processing_active(track) {
        fs::copy(source, &target)?;
        log::debug!(
            "preview passthrough for track '{}': {}",
            track.track_id,
            target.display()
        );
        return Ok(target);
    }

    let buffer = read_wav(source)?;
    let processed = render_track(&buffer.channels, buffer.sample_rate, track);
    write_wav(
        &target,
        &WavBuffer {
            sample_rate: buffer.sample_rate,
            depth: buffer.depth,
            channels: processed,
        },
    )?;
    log::debug!(
        "rendered preview for track '{}': {}",
        track.track_id,
        target.display()
    );
    Ok(target)
}
