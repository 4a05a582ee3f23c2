//! Messages from the control thread to the render thread

use crate::context::AudioNodeId;
use crate::graph::AudioProcessor;

/// Graph mutations, applied by the render thread at the start of each render call
pub(crate) enum ControlMessage {
    /// Add a node (and its processor) to the audio graph
    RegisterNode {
        id: AudioNodeId,
        node: Box<dyn AudioProcessor>,
        inputs: usize,
        outputs: usize,
    },

    /// Connect a node output to another node's input
    ConnectNode {
        from: AudioNodeId,
        to: AudioNodeId,
        output: usize,
        input: usize,
    },

    /// Remove all connections from one node to another
    DisconnectNode { from: AudioNodeId, to: AudioNodeId },

    /// Remove all outgoing connections of a node
    DisconnectAll { from: AudioNodeId },
}

impl std::fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ControlMessage::*;

        match self {
            RegisterNode {
                id,
                inputs,
                outputs,
                ..
            } => f
                .debug_struct("RegisterNode")
                .field("id", id)
                .field("inputs", inputs)
                .field("outputs", outputs)
                .finish_non_exhaustive(),
            ConnectNode {
                from,
                to,
                output,
                input,
            } => f
                .debug_struct("ConnectNode")
                .field("from", from)
                .field("to", to)
                .field("output", output)
                .field("input", input)
                .finish(),
            DisconnectNode { from, to } => f
                .debug_struct("DisconnectNode")
                .field("from", from)
                .field("to", to)
                .finish(),
            DisconnectAll { from } => f.debug_struct("DisconnectAll").field("from", from).finish(),
        }
    }
}
