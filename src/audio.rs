use std::io::Cursor;
use std::time::Duration;

/// Parses a WAV buffer and returns how long it plays.
///
/// Fails on anything hound cannot read as RIFF/WAVE.
pub fn wav_duration(bytes: &[u8]) -> Result<Duration, hound::Error> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(hound::Error::FormatError("sample rate is zero"));
    }
    // duration() counts frames, i.e. samples per channel
    let frames = reader.duration() as f64;
    Ok(Duration::from_secs_f64(frames / spec.sample_rate as f64))
}
