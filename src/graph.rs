//! The render thread and the audio graph it processes

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::buffer::AudioBuffer;
use crate::context::AudioNodeId;
use crate::control::ControlMessage;
use crate::events::EventDispatch;
use crate::RENDER_QUANTUM_SIZE;

/// Render-time information, passed to every [`AudioProcessor`] per render quantum
pub(crate) struct RenderScope {
    pub current_frame: u64,
    pub current_time: f64,
    pub sample_rate: f32,
    pub(crate) event_sender: Option<Sender<EventDispatch>>,
}

impl RenderScope {
    /// Notify the control side that a source node has ended
    pub(crate) fn send_ended_event(&self, id: AudioNodeId) {
        // sending may fail when the event loop is gone, or when the queue is full
        if let Some(sender) = self.event_sender.as_ref() {
            let _ = sender.try_send(EventDispatch::ended(id));
        }
    }
}

/// Render side of an audio node, runs on the render thread
pub(crate) trait AudioProcessor: Send {
    fn process(&mut self, inputs: &[AudioBuffer], outputs: &mut [AudioBuffer], scope: &RenderScope);
}

/// Operations running off the system-level audio callback
pub(crate) struct RenderThread {
    graph: Graph,
    sample_rate: f32,
    number_of_channels: usize,
    frames_played: Arc<AtomicU64>,
    receiver: Receiver<ControlMessage>,
    event_sender: Option<Sender<EventDispatch>>,
    /// rendered quantum that did not fully fit the previous output buffer
    buffer_offset: Option<(usize, AudioBuffer)>,
}

impl RenderThread {
    pub fn new(
        sample_rate: f32,
        number_of_channels: usize,
        receiver: Receiver<ControlMessage>,
        frames_played: Arc<AtomicU64>,
        event_sender: Option<Sender<EventDispatch>>,
    ) -> Self {
        Self {
            graph: Graph::new(sample_rate),
            sample_rate,
            number_of_channels,
            frames_played,
            receiver,
            event_sender,
            buffer_offset: None,
        }
    }

    fn handle_control_messages(&mut self) {
        for msg in self.receiver.try_iter() {
            use ControlMessage::*;

            match msg {
                RegisterNode {
                    id,
                    node,
                    inputs,
                    outputs,
                } => {
                    self.graph.add_node(NodeIndex(id.0), node, inputs, outputs);
                }
                ConnectNode {
                    from,
                    to,
                    output,
                    input,
                } => {
                    self.graph
                        .add_edge((NodeIndex(from.0), output), (NodeIndex(to.0), input));
                }
                DisconnectNode { from, to } => {
                    self.graph.remove_edge(NodeIndex(from.0), NodeIndex(to.0));
                }
                DisconnectAll { from } => {
                    self.graph.remove_edges_from(NodeIndex(from.0));
                }
            }
        }
    }

    /// Render a single quantum of the graph, returns the destination signal
    pub fn render_audiobuffer(&mut self) -> AudioBuffer {
        self.handle_control_messages();

        let current_frame = self
            .frames_played
            .fetch_add(RENDER_QUANTUM_SIZE as u64, Ordering::SeqCst);
        let scope = RenderScope {
            current_frame,
            current_time: current_frame as f64 / self.sample_rate as f64,
            sample_rate: self.sample_rate,
            event_sender: self.event_sender.clone(),
        };

        self.graph.render(&scope).clone()
    }

    /// Fill an interleaved output slice, as handed out by the audio device
    pub fn render(&mut self, output_buffer: &mut [f32]) {
        let channels = self.number_of_channels;
        let mut written = 0;

        // first drain the leftovers of the previous call
        if let Some((offset, prev)) = self.buffer_offset.take() {
            let frames = (RENDER_QUANTUM_SIZE - offset).min(output_buffer.len() / channels);
            write_interleaved(
                &prev,
                offset,
                &mut output_buffer[..frames * channels],
                channels,
            );
            written = frames * channels;

            if offset + frames < RENDER_QUANTUM_SIZE {
                self.buffer_offset = Some((offset + frames, prev));
                return;
            }
        }

        for chunk in output_buffer[written..].chunks_mut(RENDER_QUANTUM_SIZE * channels) {
            let rendered = self.render_audiobuffer();
            write_interleaved(&rendered, 0, chunk, channels);

            let frames = chunk.len() / channels;
            if frames < RENDER_QUANTUM_SIZE {
                self.buffer_offset = Some((frames, rendered));
            }
        }
    }
}

/// Interleave `rendered` (starting at frame `offset`) into `output`
///
/// A mono signal is copied to all output channels, excess output channels are silenced.
fn write_interleaved(rendered: &AudioBuffer, offset: usize, output: &mut [f32], width: usize) {
    let channels = rendered.channels();
    let number_of_channels = channels.len();

    for (i, frame) in output.chunks_mut(width).enumerate() {
        for (c, sample) in frame.iter_mut().enumerate() {
            *sample = if number_of_channels == 1 {
                channels[0][offset + i]
            } else if c < number_of_channels {
                channels[c][offset + i]
            } else {
                0.
            };
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeIndex(pub u64);

struct Node {
    processor: Box<dyn AudioProcessor>,
    inputs: usize,
    outputs: Vec<AudioBuffer>,
}

pub(crate) struct Graph {
    nodes: HashMap<NodeIndex, Node>,

    // connections, from (node,output) to (node,input)
    edges: HashSet<((NodeIndex, usize), (NodeIndex, usize))>,

    marked: Vec<NodeIndex>,
    ordered: Vec<NodeIndex>,

    sample_rate: f32,
}

impl Graph {
    pub fn new(sample_rate: f32) -> Self {
        let root_index = NodeIndex(0);

        let mut graph = Graph {
            nodes: HashMap::new(),
            edges: HashSet::new(),
            ordered: vec![root_index],
            marked: vec![root_index],
            sample_rate,
        };

        // the destination always lives at index 0, with 1 input and 1 output
        let root = crate::node::DestinationRenderer {};
        graph.add_node(root_index, Box::new(root), 1, 1);

        graph
    }

    pub fn add_node(
        &mut self,
        index: NodeIndex,
        processor: Box<dyn AudioProcessor>,
        inputs: usize,
        outputs: usize,
    ) {
        let outputs = (0..outputs)
            .map(|_| AudioBuffer::new(1, RENDER_QUANTUM_SIZE, self.sample_rate))
            .collect();

        self.nodes.insert(
            index,
            Node {
                processor,
                inputs,
                outputs,
            },
        );
    }

    pub fn add_edge(&mut self, source: (NodeIndex, usize), dest: (NodeIndex, usize)) {
        self.edges.insert((source, dest));

        self.order_nodes();
    }

    pub fn remove_edge(&mut self, source: NodeIndex, dest: NodeIndex) {
        self.edges.retain(|&(s, d)| s.0 != source || d.0 != dest);

        self.order_nodes();
    }

    pub fn remove_edges_from(&mut self, source: NodeIndex) {
        self.edges.retain(|&(s, _d)| s.0 != source);

        self.order_nodes();
    }

    fn children(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.edges
            .iter()
            .filter(move |&(_s, d)| d.0 == node)
            .map(|&(s, _d)| s.0)
    }

    fn visit(&self, n: NodeIndex, marked: &mut Vec<NodeIndex>, ordered: &mut Vec<NodeIndex>) {
        if marked.contains(&n) {
            return;
        }
        marked.push(n);
        self.children(n)
            .for_each(|c| self.visit(c, marked, ordered));
        ordered.push(n);
    }

    fn order_nodes(&mut self) {
        // empty ordered_nodes, and temporarily move out of self (no allocs)
        let mut ordered = std::mem::take(&mut self.ordered);
        ordered.clear();

        // empty marked_nodes, and temporarily move out of self (no allocs)
        let mut marked = std::mem::take(&mut self.marked);
        marked.clear();

        // start by visiting the root node, children are pushed before their parents
        let start = NodeIndex(0);
        self.visit(start, &mut marked, &mut ordered);

        // re-instate vecs to prevent new allocs
        self.ordered = ordered;
        self.marked = marked;
    }

    pub fn render(&mut self, scope: &RenderScope) -> &AudioBuffer {
        // split (mut) borrows
        let ordered = &self.ordered;
        let edges = &self.edges;
        let nodes = &mut self.nodes;
        let sample_rate = self.sample_rate;

        ordered.iter().for_each(|index| {
            // remove node from map, re-insert later (for borrowck reasons)
            let mut node = match nodes.remove(index) {
                Some(node) => node,
                None => return, // connected before registration, skip this quantum
            };

            // todo prevent all these allocations
            let mut input_bufs: Vec<_> = (0..node.inputs)
                .map(|_| AudioBuffer::new(1, RENDER_QUANTUM_SIZE, sample_rate))
                .collect();

            edges
                .iter()
                .filter(|(_s, d)| d.0 == *index)
                .for_each(|&((node_index, output), (_, input))| {
                    if let (Some(source), Some(buf)) =
                        (nodes.get(&node_index), input_bufs.get_mut(input))
                    {
                        if let Some(signal) = source.outputs.get(output) {
                            buf.add(signal);
                        }
                    }
                });

            node.processor
                .process(&input_bufs[..], &mut node.outputs[..], scope);

            // re-insert node in graph
            nodes.insert(*index, node);
        });

        // return buffer of destination node
        &self.nodes[&NodeIndex(0)].outputs[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestNode {}

    impl AudioProcessor for TestNode {
        fn process(&mut self, _: &[AudioBuffer], _: &mut [AudioBuffer], _: &RenderScope) {}
    }

    /// Emits a constant signal
    struct ConstantNode(f32);

    impl AudioProcessor for ConstantNode {
        fn process(&mut self, _: &[AudioBuffer], outputs: &mut [AudioBuffer], _: &RenderScope) {
            outputs[0]
                .get_channel_data_mut(0)
                .iter_mut()
                .for_each(|v| *v = self.0);
        }
    }

    fn scope() -> RenderScope {
        RenderScope {
            current_frame: 0,
            current_time: 0.,
            sample_rate: 48_000.,
            event_sender: None,
        }
    }

    #[test]
    fn test_add_remove() {
        let mut graph = Graph::new(48_000.);

        graph.add_node(NodeIndex(1), Box::new(TestNode {}), 1, 1);
        graph.add_node(NodeIndex(2), Box::new(TestNode {}), 1, 1);
        graph.add_node(NodeIndex(3), Box::new(TestNode {}), 1, 1);

        graph.add_edge((NodeIndex(1), 0), (NodeIndex(0), 0));
        graph.add_edge((NodeIndex(2), 0), (NodeIndex(1), 0));
        graph.add_edge((NodeIndex(3), 0), (NodeIndex(0), 0));

        // sorting is not deterministic, can be either of these two
        if graph.ordered != [NodeIndex(3), NodeIndex(2), NodeIndex(1), NodeIndex(0)] {
            assert_eq!(
                graph.ordered,
                vec![NodeIndex(2), NodeIndex(1), NodeIndex(3), NodeIndex(0)]
            );
        }

        graph.remove_edge(NodeIndex(1), NodeIndex(0));
        assert_eq!(graph.ordered, vec![NodeIndex(3), NodeIndex(0)]);
    }

    #[test]
    fn test_remove_all() {
        let mut graph = Graph::new(48_000.);

        graph.add_node(NodeIndex(1), Box::new(TestNode {}), 1, 1);
        graph.add_node(NodeIndex(2), Box::new(TestNode {}), 1, 1);

        graph.add_edge((NodeIndex(1), 0), (NodeIndex(0), 0));
        graph.add_edge((NodeIndex(2), 0), (NodeIndex(0), 0));
        graph.add_edge((NodeIndex(2), 0), (NodeIndex(1), 0));

        assert_eq!(
            graph.ordered,
            vec![NodeIndex(2), NodeIndex(1), NodeIndex(0)]
        );

        graph.remove_edges_from(NodeIndex(2));

        assert_eq!(graph.ordered, vec![NodeIndex(1), NodeIndex(0)]);
    }

    #[test]
    fn test_render_sums_inputs() {
        let mut graph = Graph::new(48_000.);

        graph.add_node(NodeIndex(1), Box::new(ConstantNode(0.25)), 0, 1);
        graph.add_node(NodeIndex(2), Box::new(ConstantNode(0.5)), 0, 1);

        graph.add_edge((NodeIndex(1), 0), (NodeIndex(0), 0));
        graph.add_edge((NodeIndex(2), 0), (NodeIndex(0), 0));

        let rendered = graph.render(&scope());
        assert!(rendered.get_channel_data(0).iter().all(|v| *v == 0.75));
    }

    #[test]
    fn test_render_unconnected_is_silent() {
        let mut graph = Graph::new(48_000.);
        graph.add_node(NodeIndex(1), Box::new(ConstantNode(1.)), 0, 1);

        assert!(graph.render(&scope()).is_silent());
    }

    #[test]
    fn test_render_thread_partial_quanta() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let frames_played = Arc::new(AtomicU64::new(0));
        let mut render = RenderThread::new(48_000., 2, receiver, frames_played.clone(), None);

        sender
            .send(ControlMessage::RegisterNode {
                id: AudioNodeId(1),
                node: Box::new(ConstantNode(1.)),
                inputs: 0,
                outputs: 1,
            })
            .unwrap();
        sender
            .send(ControlMessage::ConnectNode {
                from: AudioNodeId(1),
                to: AudioNodeId(0),
                output: 0,
                input: 0,
            })
            .unwrap();

        // 100 frames, then 100 frames: the second call consumes the remaining 28 frames of the
        // first quantum before rendering a new one
        let mut data = vec![0.; 200];
        render.render(&mut data);
        assert!(data.iter().all(|v| *v == 1.));
        assert_eq!(frames_played.load(Ordering::SeqCst), 128);

        render.render(&mut data);
        assert!(data.iter().all(|v| *v == 1.));
        assert_eq!(frames_played.load(Ordering::SeqCst), 256);
    }
}
