//! Audio signal data structures

/// Memory-resident audio asset, one `Vec<f32>` of samples per channel
///
/// Used both for decoded media and for the render quanta passed between nodes of the graph.
///
/// # Usage
///
/// ```
/// use web_play_rec::buffer::AudioBuffer;
///
/// let mut buffer = AudioBuffer::new(2, 128, 44_100.);
/// buffer.copy_to_channel(&[0.5; 128], 0);
///
/// assert_eq!(buffer.number_of_channels(), 2);
/// assert_eq!(buffer.get_channel_data(0)[0], 0.5);
/// assert_eq!(buffer.get_channel_data(1)[0], 0.);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: f32,
}

impl AudioBuffer {
    /// Allocate a silent buffer with the given number of channels and frames
    ///
    /// # Panics
    ///
    /// This function panics if `number_of_channels` is zero or exceeds [`crate::MAX_CHANNELS`]
    pub fn new(number_of_channels: usize, length: usize, sample_rate: f32) -> Self {
        assert_valid_number_of_channels(number_of_channels);
        crate::assert_valid_sample_rate(sample_rate);

        Self {
            channels: vec![vec![0.; length]; number_of_channels],
            sample_rate,
        }
    }

    /// Wrap existing channel data
    ///
    /// # Panics
    ///
    /// This function panics if no channels are given, or if the channels differ in length
    pub fn from(channels: Vec<Vec<f32>>, sample_rate: f32) -> Self {
        assert_valid_number_of_channels(channels.len());
        crate::assert_valid_sample_rate(sample_rate);

        let length = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == length),
            "InvalidStateError - channels of an AudioBuffer must have equal length"
        );

        Self {
            channels,
            sample_rate,
        }
    }

    /// Number of channels in this buffer
    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of sample-frames in this buffer
    pub fn length(&self) -> usize {
        self.channels[0].len()
    }

    /// Sample rate in Hertz
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.length() as f64 / self.sample_rate as f64
    }

    /// Samples of the channel with the given index
    ///
    /// # Panics
    ///
    /// This function panics if the channel index is out of bounds
    pub fn get_channel_data(&self, channel: usize) -> &[f32] {
        &self.channels[channel]
    }

    /// Mutable samples of the channel with the given index
    ///
    /// # Panics
    ///
    /// This function panics if the channel index is out of bounds
    pub fn get_channel_data_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.channels[channel]
    }

    /// Copy samples from `source` into the given channel, starting at the first frame
    ///
    /// Excess samples on either side are ignored.
    pub fn copy_to_channel(&mut self, source: &[f32], channel: usize) {
        self.channels[channel]
            .iter_mut()
            .zip(source)
            .for_each(|(o, i)| *o = *i);
    }

    pub(crate) fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }

    /// Returns true if all samples are zero
    pub fn is_silent(&self) -> bool {
        self.channels.iter().flatten().all(|v| *v == 0.)
    }

    /// Set all samples to zero
    pub fn make_silent(&mut self) {
        self.channels
            .iter_mut()
            .for_each(|c| c.iter_mut().for_each(|v| *v = 0.));
    }

    /// Change the channel count, up-mixing a mono signal to all channels
    ///
    /// Down-mixing drops the excess channels, so this is only meant for the mono/stereo cases
    /// that the graph uses.
    pub(crate) fn set_number_of_channels(&mut self, number_of_channels: usize) {
        assert_valid_number_of_channels(number_of_channels);

        let current = self.number_of_channels();
        if number_of_channels == current {
            return;
        }

        if number_of_channels > current {
            let fill = if current == 1 {
                self.channels[0].clone()
            } else {
                vec![0.; self.length()]
            };
            self.channels.resize(number_of_channels, fill);
        } else {
            self.channels.truncate(number_of_channels);
        }
    }

    /// Mix `other` into this buffer, up-mixing mono signals where needed
    pub(crate) fn add(&mut self, other: &Self) {
        if other.number_of_channels() > self.number_of_channels() {
            self.set_number_of_channels(other.number_of_channels());
        }

        if other.number_of_channels() == 1 {
            let source = &other.channels[0];
            self.channels.iter_mut().for_each(|c| {
                c.iter_mut().zip(source).for_each(|(a, b)| *a += b);
            });
        } else {
            self.channels
                .iter_mut()
                .zip(other.channels.iter())
                .for_each(|(c, o)| c.iter_mut().zip(o).for_each(|(a, b)| *a += b));
        }
    }

    /// Copy frames `[offset, offset + len)` of this buffer into `dest`, zero-padding past the end
    ///
    /// Returns the number of frames actually copied.
    pub(crate) fn copy_frames_into(&self, dest: &mut Self, offset: usize) -> usize {
        dest.set_number_of_channels(self.number_of_channels());

        let available = self.length().saturating_sub(offset);
        let len = dest.length();
        let copied = available.min(len);

        dest.channels
            .iter_mut()
            .zip(self.channels.iter())
            .for_each(|(d, s)| {
                if copied > 0 {
                    d[..copied].copy_from_slice(&s[offset..offset + copied]);
                }
                d[copied..].iter_mut().for_each(|v| *v = 0.);
            });

        copied
    }
}

#[track_caller]
#[inline(always)]
fn assert_valid_number_of_channels(number_of_channels: usize) {
    assert!(
        number_of_channels > 0 && number_of_channels <= crate::MAX_CHANNELS,
        "NotSupportedError - Invalid number of channels: {} is outside range [1, {}]",
        number_of_channels,
        crate::MAX_CHANNELS
    );
}
