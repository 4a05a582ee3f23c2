//! Ogg Vorbis and WAV decoding into an [`AudioBuffer`]

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use lewton::inside_ogg::OggStreamReader;
use lewton::VorbisError;

use crate::buffer::AudioBuffer;
use crate::MAX_CHANNELS;

/// Failure to load a media file
#[derive(Debug)]
pub enum MediaError {
    /// The file could not be opened or read
    Io(std::io::Error),
    /// The Ogg container or Vorbis stream is malformed
    Vorbis(VorbisError),
    /// The RIFF/WAVE stream is malformed
    Wav(hound::Error),
    /// The file is neither Ogg Vorbis nor WAV
    Unsupported,
    /// The file decoded fine but contains no audio frames
    Empty,
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "unable to read media: {}", e),
            Self::Vorbis(e) => write!(f, "unable to decode Ogg Vorbis: {}", e),
            Self::Wav(e) => write!(f, "unable to decode WAV: {}", e),
            Self::Unsupported => f.write_str("unsupported media format, expected Ogg Vorbis or WAV"),
            Self::Empty => f.write_str("media contains no audio frames"),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Vorbis(e) => Some(e),
            Self::Wav(e) => Some(e),
            Self::Unsupported | Self::Empty => None,
        }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<VorbisError> for MediaError {
    fn from(e: VorbisError) -> Self {
        Self::Vorbis(e)
    }
}

impl From<hound::Error> for MediaError {
    fn from(e: hound::Error) -> Self {
        Self::Wav(e)
    }
}

/// Decode the file at `path` completely into memory
pub(crate) fn decode_file<P: AsRef<Path>>(path: P) -> Result<AudioBuffer, MediaError> {
    let file = File::open(path)?;
    decode_audio_data(BufReader::new(file))
}

/// Decode an Ogg Vorbis or WAV stream, the format is sniffed from the magic bytes
pub(crate) fn decode_audio_data<R: Read + Seek>(mut input: R) -> Result<AudioBuffer, MediaError> {
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => MediaError::Unsupported,
        _ => MediaError::Io(e),
    })?;
    input.seek(SeekFrom::Start(0))?;

    let buffer = match &magic {
        b"OggS" => decode_ogg(input)?,
        b"RIFF" => decode_wav(input)?,
        _ => return Err(MediaError::Unsupported),
    };

    log::debug!(
        "decoded {} channels, {} frames at {} Hz",
        buffer.number_of_channels(),
        buffer.length(),
        buffer.sample_rate()
    );

    Ok(buffer)
}

fn decode_ogg<R: Read + Seek>(input: R) -> Result<AudioBuffer, MediaError> {
    let mut stream = OggStreamReader::new(input)?;
    let sample_rate = stream.ident_hdr.audio_sample_rate as f32;
    let number_of_channels = stream.ident_hdr.audio_channels as usize;

    let mut channels: Vec<Vec<f32>> = vec![vec![]; number_of_channels];

    while let Some(packet) = stream.read_dec_packet_generic::<Vec<Vec<f32>>>()? {
        channels
            .iter_mut()
            .zip(packet)
            .for_each(|(channel, data)| channel.extend(data));
    }

    into_buffer(channels, sample_rate)
}

fn decode_wav<R: Read>(input: R) -> Result<AudioBuffer, MediaError> {
    let mut reader = hound::WavReader::new(input)?;
    let hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format,
    } = reader.spec();

    let number_of_channels = channels as usize;
    let length = reader.duration() as usize;
    let mut decoded: Vec<Vec<f32>> = vec![Vec::with_capacity(length); number_of_channels];

    // samples are interleaved
    match sample_format {
        hound::SampleFormat::Float => {
            for (i, sample) in reader.samples::<f32>().enumerate() {
                decoded[i % number_of_channels].push(sample?);
            }
        }
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (bits_per_sample - 1)) as f32;
            for (i, sample) in reader.samples::<i32>().enumerate() {
                decoded[i % number_of_channels].push(sample? as f32 / scale);
            }
        }
    }

    into_buffer(decoded, sample_rate as f32)
}

fn into_buffer(channels: Vec<Vec<f32>>, sample_rate: f32) -> Result<AudioBuffer, MediaError> {
    if channels.is_empty() || channels.len() > MAX_CHANNELS || sample_rate <= 0. {
        return Err(MediaError::Unsupported);
    }

    // a truncated stream may leave the last frame incomplete
    let length = channels.iter().map(Vec::len).min().unwrap_or(0);
    if length == 0 {
        return Err(MediaError::Empty);
    }

    let channels = channels
        .into_iter()
        .map(|mut c| {
            c.truncate(length);
            c
        })
        .collect();

    Ok(AudioBuffer::from(channels, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use std::io::Cursor;

    fn wav_bytes(
        spec: hound::WavSpec,
        write: impl FnOnce(&mut hound::WavWriter<&mut Cursor<Vec<u8>>>),
    ) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_wav_int16_stereo() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |writer| {
            for _ in 0..100 {
                writer.write_sample(i16::MIN).unwrap();
                writer.write_sample(16_384_i16).unwrap();
            }
        });

        let buffer = decode_audio_data(Cursor::new(bytes)).unwrap();
        assert_eq!(buffer.number_of_channels(), 2);
        assert_eq!(buffer.length(), 100);
        assert_float_eq!(buffer.sample_rate(), 22_050., abs <= 0.);
        assert_float_eq!(buffer.get_channel_data(0), &[-1.; 100][..], abs_all <= 0.);
        assert_float_eq!(buffer.get_channel_data(1), &[0.5; 100][..], abs_all <= 0.);
    }

    #[test]
    fn test_decode_wav_float_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |writer| {
            for i in 0..10 {
                writer.write_sample(i as f32 / 10.).unwrap();
            }
        });

        let buffer = decode_audio_data(Cursor::new(bytes)).unwrap();
        assert_eq!(buffer.number_of_channels(), 1);
        assert_float_eq!(buffer.get_channel_data(0)[3], 0.3, abs <= 1e-7);
    }

    #[test]
    fn test_decode_empty_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |_| {});

        let result = decode_audio_data(Cursor::new(bytes));
        assert!(matches!(result, Err(MediaError::Empty)));
    }

    #[test]
    fn test_decode_unsupported() {
        let result = decode_audio_data(Cursor::new(vec![0u8; 32]));
        assert!(matches!(result, Err(MediaError::Unsupported)));

        let result = decode_audio_data(Cursor::new(vec![0u8; 2]));
        assert!(matches!(result, Err(MediaError::Unsupported)));
    }

    #[test]
    fn test_decode_corrupt_ogg() {
        let mut bytes = b"OggS".to_vec();
        bytes.extend_from_slice(&[0u8; 60]);

        let result = decode_audio_data(Cursor::new(bytes));
        assert!(matches!(result, Err(MediaError::Vorbis(_))));
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_file("does/not/exist.wav");
        assert!(matches!(result, Err(MediaError::Io(_))));
    }
}
