//! # Sample Format Converter
//!
//! Converts decoded audio buffers to the PCM layout the host expects.

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::Sample;

/// Sample converter that produces interleaved signed 16-bit little-endian
/// PCM bytes.
///
/// Symphonia outputs planar audio in whatever sample type the codec uses
/// (Vorbis decodes to f32). Samples are converted with symphonia's own
/// `IntoSample` rules, which round and clamp to the i16 range.
pub struct SampleConverter;

impl SampleConverter {
    /// Append `buffer` to `out` as interleaved s16le bytes.
    ///
    /// Returns the number of frames appended.
    pub fn append_s16le(buffer: &AudioBufferRef<'_>, out: &mut Vec<u8>) -> usize {
        match buffer {
            AudioBufferRef::F32(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::F64(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::S32(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::S24(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::S16(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::S8(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::U32(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::U24(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::U16(buf) => Self::interleave_into(&**buf, out),
            AudioBufferRef::U8(buf) => Self::interleave_into(&**buf, out),
        }
    }

    /// Convert and interleave samples of any type.
    ///
    /// Converts from planar format (LLLL...RRRR...) to interleaved (LRLRLR...).
    fn interleave_into<T>(buf: &AudioBuffer<T>, out: &mut Vec<u8>) -> usize
    where
        T: Sample + IntoSample<i16>,
    {
        let num_channels = buf.spec().channels.count();
        let num_frames = buf.frames();
        out.reserve(num_frames * num_channels * 2);

        for frame_idx in 0..num_frames {
            for chan_idx in 0..num_channels {
                let sample: i16 = buf.chan(chan_idx)[frame_idx].into_sample();
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }

        num_frames
    }
}
