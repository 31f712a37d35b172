//! Linear PCM sample codec
//!
//! Standard offset/scale conventions per bit depth: 8-bit is unsigned with a
//! 128 offset, 16/24/32-bit are signed little-endian. 24-bit samples are
//! sign-extended into a 4-byte container before arithmetic.

/// Supported linear PCM bit depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Bits8,
    Bits16,
    Bits24,
    Bits32,
}

impl BitDepth {
    pub fn from_bytes_per_sample(bytes: usize) -> Option<BitDepth> {
        match bytes {
            1 => Some(BitDepth::Bits8),
            2 => Some(BitDepth::Bits16),
            3 => Some(BitDepth::Bits24),
            4 => Some(BitDepth::Bits32),
            _ => None,
        }
    }

    pub fn from_bits(bits: u16) -> Option<BitDepth> {
        match bits {
            8 => Some(BitDepth::Bits8),
            16 => Some(BitDepth::Bits16),
            24 => Some(BitDepth::Bits24),
            32 => Some(BitDepth::Bits32),
            _ => None,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            BitDepth::Bits8 => 1,
            BitDepth::Bits16 => 2,
            BitDepth::Bits24 => 3,
            BitDepth::Bits32 => 4,
        }
    }

    pub fn bits(self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }

    /// Full-scale divisor for the signed integer range of this depth.
    pub fn scale(self) -> f64 {
        match self {
            BitDepth::Bits8 => 128.0,
            BitDepth::Bits16 => 32768.0,
            BitDepth::Bits24 => 8_388_608.0,
            BitDepth::Bits32 => 2_147_483_648.0,
        }
    }
}

/// Decode one little-endian PCM sample into [-1, 1).
///
/// `chunk` must hold exactly `depth.bytes_per_sample()` bytes.
pub fn decode_sample(chunk: &[u8], depth: BitDepth) -> f64 {
    match depth {
        BitDepth::Bits8 => (chunk[0] as i32 - 128) as f64 / 128.0,
        BitDepth::Bits16 => i16::from_le_bytes([chunk[0], chunk[1]]) as f64 / 32768.0,
        BitDepth::Bits24 => {
            let sign = if chunk[2] & 0x80 != 0 { 0xff } else { 0x00 };
            i32::from_le_bytes([chunk[0], chunk[1], chunk[2], sign]) as f64 / 8_388_608.0
        }
        BitDepth::Bits32 => {
            i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64 / 2_147_483_648.0
        }
    }
}

/// Encode one sample, clipping to [-1, 1] and rounding to the nearest
/// representable integer value.
pub fn encode_sample(value: f64, depth: BitDepth, out: &mut Vec<u8>) {
    let clipped = value.clamp(-1.0, 1.0);
    match depth {
        BitDepth::Bits8 => {
            let v = (clipped * 127.5 + 128.0).round() as i64;
            out.push(v.clamp(0, 255) as u8);
        }
        BitDepth::Bits16 => {
            let v = (clipped * 32767.0).round() as i64;
            let v = v.clamp(-32768, 32767) as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
        BitDepth::Bits24 => {
            let v = (clipped * 8_388_607.0).round() as i64;
            let v = v.clamp(-8_388_608, 8_388_607) as i32;
            out.extend_from_slice(&v.to_le_bytes()[..3]);
        }
        BitDepth::Bits32 => {
            let v = (clipped * 2_147_483_647.0).round() as i64;
            let v = v.clamp(-2_147_483_648, 2_147_483_647) as i32;
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
}

/// Decode interleaved PCM frames into per-channel buffers. A trailing
/// partial frame is dropped.
pub fn decode_interleaved(raw: &[u8], channels: usize, depth: BitDepth) -> Vec<Vec<f64>> {
    if channels == 0 {
        return Vec::new();
    }
    let bytes = depth.bytes_per_sample();
    let frame_size = channels * bytes;
    let frame_count = raw.len() / frame_size;

    let mut out: Vec<Vec<f64>> = vec![Vec::with_capacity(frame_count); channels];
    for frame in raw.chunks_exact(frame_size) {
        for (channel, chunk) in frame.chunks_exact(bytes).enumerate() {
            out[channel].push(decode_sample(chunk, depth));
        }
    }
    out
}

/// Encode per-channel buffers into interleaved PCM frames. The frame count
/// is the shortest channel length.
pub fn encode_interleaved(channels: &[Vec<f64>], depth: BitDepth) -> Vec<u8> {
    let frame_count = channels.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frame_count * channels.len() * depth.bytes_per_sample());
    for index in 0..frame_count {
        for channel in channels {
            encode_sample(channel[index], depth, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_24bit_sign_extension() {
        // 0x800000 is the most negative 24-bit value.
        assert_eq!(decode_sample(&[0x00, 0x00, 0x80], BitDepth::Bits24), -1.0);
        // 0x7fffff is the most positive.
        let v = decode_sample(&[0xff, 0xff, 0x7f], BitDepth::Bits24);
        assert!((v - (8_388_607.0 / 8_388_608.0)).abs() < 1e-12);
    }

    #[test]
    fn test_8bit_offset_convention() {
        assert_eq!(decode_sample(&[128], BitDepth::Bits8), 0.0);
        assert_eq!(decode_sample(&[0], BitDepth::Bits8), -1.0);
        let mut out = Vec::new();
        encode_sample(0.0, BitDepth::Bits8, &mut out);
        assert_eq!(out, vec![128]);
    }

    #[test]
    fn test_16bit_roundtrip() {
        // Exact below half scale; the 32768/32767 scale asymmetry costs at
        // most one code at the extremes.
        let mut raw = Vec::new();
        for v in [-16000i16, -1, 0, 1, 12345, 16000] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        let decoded = decode_interleaved(&raw, 1, BitDepth::Bits16);
        let encoded = encode_interleaved(&decoded, BitDepth::Bits16);
        assert_eq!(raw, encoded);

        let extremes = decode_interleaved(
            &[0x00, 0x80, 0xff, 0x7f],
            1,
            BitDepth::Bits16,
        );
        let encoded = encode_interleaved(&extremes, BitDepth::Bits16);
        let values = decode_interleaved(&encoded, 1, BitDepth::Bits16);
        assert!((values[0][0] - extremes[0][0]).abs() <= 1.0 / 32768.0);
        assert!((values[0][1] - extremes[0][1]).abs() <= 1.0 / 32768.0);
    }

    #[test]
    fn test_interleave_deinterleave() {
        let left = vec![0.5, -0.25];
        let right = vec![-0.5, 0.25];
        let raw = encode_interleaved(&[left.clone(), right.clone()], BitDepth::Bits32);
        let channels = decode_interleaved(&raw, 2, BitDepth::Bits32);
        assert_eq!(channels.len(), 2);
        for (a, b) in left.iter().zip(&channels[0]) {
            assert!((a - b).abs() < 1e-8);
        }
        for (a, b) in right.iter().zip(&channels[1]) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn test_partial_trailing_frame_is_dropped() {
        let raw = [0u8, 0, 0, 0, 0]; // 1.25 stereo 16-bit frames
        let channels = decode_interleaved(&raw, 2, BitDepth::Bits16);
        assert_eq!(channels[0].len(), 1);
        assert_eq!(channels[1].len(), 1);
    }
}
