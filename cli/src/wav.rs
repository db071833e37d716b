use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use magswipe_core::resample::{downmix_to_mono, f32_to_i16, resample};
use magswipe_core::{MagstripeError, SAMPLE_RATE};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV error: {0}")]
    Hound(#[from] hound::Error),

    #[error("Unsupported WAV format: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Magstripe(#[from] MagstripeError),
}

/// Mono 16-bit audio at the decoder's operating rate
#[derive(Debug, Clone)]
pub struct Capture {
    pub samples: Vec<i16>,
    /// Rate of the source file before conversion
    pub source_rate: u32,
    pub source_channels: u16,
}

/// Read any PCM WAV and convert it to mono 16-bit at 44.1 kHz
pub fn read_wav<R: Read>(reader: R) -> Result<Capture, WavError> {
    let mut reader = WavReader::new(reader)?;
    let spec = reader.spec();
    log::info!(
        "Read WAV: {} Hz, {} channels, {} bits {:?}",
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8..=16) => {
            let shift = 16 - spec.bits_per_sample;
            reader
                .samples::<i16>()
                .map(|s| s.map(|s| s << shift))
                .collect::<Result<_, _>>()?
        }
        (SampleFormat::Int, 17..=32) => {
            let shift = spec.bits_per_sample - 16;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| (s >> shift) as i16))
                .collect::<Result<_, _>>()?
        }
        (SampleFormat::Float, 32) => {
            let floats = reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?;
            f32_to_i16(&floats)
        }
        (format, bits) => {
            return Err(WavError::Unsupported(format!("{:?} with {} bits", format, bits)));
        }
    };

    let mono = downmix_to_mono(&interleaved, spec.channels as usize)?;
    if spec.sample_rate != SAMPLE_RATE {
        log::warn!(
            "Resampling {} Hz to {} Hz; decoder thresholds are tuned for {} Hz",
            spec.sample_rate,
            SAMPLE_RATE,
            SAMPLE_RATE
        );
    }
    let samples = resample(&mono, spec.sample_rate, SAMPLE_RATE);

    Ok(Capture {
        samples,
        source_rate: spec.sample_rate,
        source_channels: spec.channels,
    })
}

pub fn read_wav_file(path: &Path) -> Result<Capture, WavError> {
    let file = std::fs::File::open(path).map_err(hound::Error::IoError)?;
    read_wav(std::io::BufReader::new(file))
}

fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write mono 16-bit PCM
pub fn write_wav<W: Write + Seek>(writer: W, samples: &[i16], sample_rate: u32) -> Result<(), WavError> {
    let mut writer = WavWriter::new(writer, mono_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// In-memory WAV image of mono 16-bit PCM
pub fn wav_bytes(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, samples, sample_rate)?;
    Ok(cursor.into_inner())
}
