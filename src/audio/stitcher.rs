//! Audio stitching: ordered concatenation of per-segment WAV buffers.

use std::io::Cursor;

use tracing::info;

use super::generator::GeneratedSegment;
use crate::error::{PodforgeError, Result};

/// The stitched artifact and its measured duration.
#[derive(Debug, Clone)]
pub struct StitchedAudio {
    pub bytes: Vec<u8>,
    /// Real duration computed from the sample stream, rounded up to whole
    /// seconds. Not the text estimate.
    pub duration_seconds: u64,
    pub sample_rate: u32,
    pub segment_count: usize,
}

/// Concatenate per-segment WAV buffers into one artifact.
///
/// Buffers are consumed strictly in segment-index order regardless of the
/// order they arrive in. All segments must share one sample spec.
pub fn stitch_segments(mut segments: Vec<GeneratedSegment>) -> Result<StitchedAudio> {
    if segments.is_empty() {
        return Err(PodforgeError::Audio("No segments to stitch".to_string()));
    }

    segments.sort_by_key(|segment| segment.index);

    let mut spec: Option<hound::WavSpec> = None;
    let mut samples: Vec<i32> = Vec::new();

    for segment in &segments {
        let mut reader = hound::WavReader::new(Cursor::new(segment.audio.as_slice()))
            .map_err(|e| {
                PodforgeError::Audio(format!("Segment {} is not valid WAV: {e}", segment.index))
            })?;

        let segment_spec = reader.spec();
        if segment_spec.sample_format != hound::SampleFormat::Int {
            return Err(PodforgeError::Audio(format!(
                "Segment {} uses float samples; only PCM is supported",
                segment.index
            )));
        }

        match spec {
            None => spec = Some(segment_spec),
            Some(expected) if expected != segment_spec => {
                return Err(PodforgeError::Audio(format!(
                    "Segment {} sample spec {:?} does not match {:?}",
                    segment.index, segment_spec, expected
                )));
            }
            Some(_) => {}
        }

        for sample in reader.samples::<i32>() {
            samples.push(sample.map_err(|e| {
                PodforgeError::Audio(format!(
                    "Failed reading samples of segment {}: {e}",
                    segment.index
                ))
            })?);
        }
    }

    let spec = spec.expect("at least one segment");
    let frames = samples.len() as u64 / u64::from(spec.channels.max(1));
    let duration_seconds = frames.div_ceil(u64::from(spec.sample_rate));

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| PodforgeError::Audio(format!("Failed to start WAV writer: {e}")))?;
        for sample in &samples {
            writer
                .write_sample(*sample)
                .map_err(|e| PodforgeError::Audio(format!("Failed to write sample: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| PodforgeError::Audio(format!("Failed to finalize WAV: {e}")))?;
    }

    let bytes = cursor.into_inner();
    info!(
        segments = segments.len(),
        duration_seconds, "stitched audio artifact"
    );

    Ok(StitchedAudio {
        bytes,
        duration_seconds,
        sample_rate: spec.sample_rate,
        segment_count: segments.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for sample in samples {
                writer.write_sample(*sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn stitches_in_index_order() {
        // Segments supplied out of order; the output must follow indexes.
        let segments = vec![
            GeneratedSegment {
                index: 1,
                audio: wav_bytes(&[3, 4], 8000),
            },
            GeneratedSegment {
                index: 0,
                audio: wav_bytes(&[1, 2], 8000),
            },
        ];
        let stitched = stitch_segments(segments).unwrap();

        let reader = hound::WavReader::new(Cursor::new(stitched.bytes.as_slice())).unwrap();
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, 2, 3, 4]);
        assert_eq!(stitched.segment_count, 2);
    }

    #[test]
    fn duration_comes_from_samples() {
        // 12000 frames at 8 kHz is 1.5 s, rounded up to 2.
        let segments = vec![GeneratedSegment {
            index: 0,
            audio: wav_bytes(&vec![0i16; 12000], 8000),
        }];
        let stitched = stitch_segments(segments).unwrap();
        assert_eq!(stitched.duration_seconds, 2);
        assert_eq!(stitched.sample_rate, 8000);
    }

    #[test]
    fn rejects_mismatched_specs() {
        let segments = vec![
            GeneratedSegment {
                index: 0,
                audio: wav_bytes(&[1], 8000),
            },
            GeneratedSegment {
                index: 1,
                audio: wav_bytes(&[2], 16000),
            },
        ];
        let err = stitch_segments(segments).unwrap_err();
        assert!(matches!(err, PodforgeError::Audio(_)));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let segments = vec![GeneratedSegment {
            index: 0,
            audio: b"not a wav".to_vec(),
        }];
        assert!(stitch_segments(segments).is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(stitch_segments(Vec::new()).is_err());
    }
}
