//! AudioParam interface
use std::sync::Arc;

use crate::AtomicF32;

/// Options for constructing an [`AudioParam`]
#[derive(Clone, Debug)]
pub struct AudioParamDescriptor {
    pub default_value: f32,
    pub min_value: f32,
    pub max_value: f32,
}

/// AudioParam controls an individual aspect of an AudioNode's functionality, such as volume.
///
/// Values are applied directly: there is no automation timeline, a new value takes effect from
/// the next render quantum on.
#[derive(Debug)]
pub struct AudioParam {
    current_value: Arc<AtomicF32>,
    default_value: f32,
    min_value: f32,
    max_value: f32,
}

/// Render side of an [`AudioParam`], shares the current value with the control side
#[derive(Debug, Clone)]
pub(crate) struct AudioParamProcessor {
    current_value: Arc<AtomicF32>,
}

impl AudioParamProcessor {
    pub fn value(&self) -> f32 {
        self.current_value.load()
    }
}

impl AudioParam {
    /// Create the control and render side of a new parameter
    pub(crate) fn new(descriptor: AudioParamDescriptor) -> (Self, AudioParamProcessor) {
        let AudioParamDescriptor {
            default_value,
            min_value,
            max_value,
        } = descriptor;

        assert!(
            min_value <= default_value && default_value <= max_value,
            "InvalidStateError - default value {} is outside range [{}, {}]",
            default_value,
            min_value,
            max_value
        );

        let current_value = Arc::new(AtomicF32::new(default_value));

        let param = Self {
            current_value: Arc::clone(&current_value),
            default_value,
            min_value,
            max_value,
        };
        let processor = AudioParamProcessor { current_value };

        (param, processor)
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Current value of the parameter
    pub fn value(&self) -> f32 {
        self.current_value.load()
    }

    /// Set the value, clamped to the nominal range `[min_value, max_value]`
    pub fn set_value(&self, value: f32) {
        let clamped = value.clamp(self.min_value, self.max_value);
        self.current_value.store(clamped);
    }
}
