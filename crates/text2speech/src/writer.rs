//! WAV output

use crate::error::{SynthesisError, SynthesisResult};
use crate::types::Waveform;
use std::io::BufWriter;
use std::path::Path;

/// Write a waveform as 32-bit float PCM WAV.
///
/// Samples go through a temporary file next to `path` that is renamed into
/// place after the header is finalized, so a failed write never leaves a
/// partial file at `path`. The parent directory is not created.
pub fn write_wav(
    waveform: &Waveform,
    sample_rate: u32,
    path: impl AsRef<Path>,
) -> SynthesisResult<()> {
    let path = path.as_ref();
    if sample_rate == 0 {
        return Err(SynthesisError::Shape("sampling rate must be positive".to_string()));
    }
    let channels = u16::try_from(waveform.channels()).map_err(|_| {
        SynthesisError::Shape(format!(
            "{} channels exceed the WAV limit",
            waveform.channels()
        ))
    })?;

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".text2speech-")
        .suffix(".wav.part")
        .tempfile_in(parent)?;

    {
        let mut writer = hound::WavWriter::new(BufWriter::new(temp.as_file_mut()), spec)?;
        for sample in waveform.interleaved() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    temp.persist(path).map_err(|err| SynthesisError::Io(err.error))?;
    log::debug!(
        "wrote {} frames x {} channel(s) at {} Hz to {}",
        waveform.frames(),
        channels,
        sample_rate,
        path.display()
    );
    Ok(())
}

/// Read a WAV file back as interleaved samples.
///
/// Returns `(samples, sample_rate, channels)`; integer formats are scaled to
/// `[-1.0, 1.0]`.
pub fn read_wav(path: impl AsRef<Path>) -> SynthesisResult<(Vec<f32>, u32, usize)> {
    let mut reader = hound::WavReader::open(path.as_ref())?;
    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
                .collect::<Result<_, _>>()?,
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / i32::MAX as f32))
                .collect::<Result<_, _>>()?,
            bits => {
                return Err(SynthesisError::Wav(format!(
                    "unsupported bit depth: {bits}"
                )));
            }
        },
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    };

    Ok((samples, sample_rate, channels))
}
