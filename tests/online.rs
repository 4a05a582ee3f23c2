//! Test for the online AudioContext
//!
//! CI runners have no sound card enabled so these tests use the 'none' audio backend.

use web_play_rec::buffer::AudioBuffer;
use web_play_rec::context::{
    AudioContext, AudioContextOptions, AudioContextState, BaseAudioContext,
};
use web_play_rec::media::MediaElement;
use web_play_rec::node::AudioNode;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn require_send_sync_static<T: Send + Sync + 'static>(_: T) {}

fn none_options() -> AudioContextOptions {
    AudioContextOptions {
        sink_id: "none".into(),
        ..AudioContextOptions::default()
    }
}

#[allow(dead_code)]
fn ensure_send_sync_static() {
    let context = AudioContext::new(none_options()).unwrap();

    require_send_sync_static(context.create_gain());
    require_send_sync_static(context.create_stereo_panner());
    require_send_sync_static(context.destination());

    let mut element = MediaElement::from_buffer(AudioBuffer::new(1, 1, 48_000.));
    require_send_sync_static(context.create_media_element_source(&mut element));

    require_send_sync_static(context);
}

#[allow(dead_code)]
fn ensure_audio_node_object_safe() {
    let context = AudioContext::new(none_options()).unwrap();
    let node = context.create_gain();
    let _object: Box<dyn AudioNode> = Box::new(node);
}

#[test]
fn test_none_sink_id() {
    let context = AudioContext::new(none_options()).unwrap();
    assert_eq!(context.sink_id(), "none");
    assert_eq!(context.sample_rate(), 48_000.);
    assert_eq!(context.destination().max_channel_count(), 2);
}

#[test]
fn test_starts_suspended() {
    let context = AudioContext::new(none_options()).unwrap();
    assert_eq!(context.state(), AudioContextState::Suspended);

    // no time progression before a resume
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(context.current_time(), 0.);

    context.resume();
    assert_eq!(context.state(), AudioContextState::Running);

    std::thread::sleep(Duration::from_millis(200));
    assert!(context.current_time() >= 0.1);
}

#[test]
fn test_custom_sample_rate() {
    let options = AudioContextOptions {
        sample_rate: Some(24_000.),
        ..none_options()
    };

    let context = AudioContext::new(options).unwrap();
    assert_eq!(context.sample_rate(), 24_000.);
}

#[test]
fn test_closed() {
    let context = AudioContext::new(none_options()).unwrap();
    let node = context.create_gain();

    // Close the context
    context.close();
    assert_eq!(context.state(), AudioContextState::Closed);

    // Should not be able to resume
    context.resume();
    assert_eq!(context.state(), AudioContextState::Closed);

    // Drop the context (otherwise the comms channel is kept alive)
    drop(context);

    // allow some time for the render thread to drop
    std::thread::sleep(Duration::from_millis(10));

    node.disconnect(); // should not panic
}

#[test]
fn test_double_suspend() {
    let context = AudioContext::new(none_options()).unwrap();

    context.resume();
    assert_eq!(context.state(), AudioContextState::Running);
    context.suspend();
    assert_eq!(context.state(), AudioContextState::Suspended);
    context.suspend();
    assert_eq!(context.state(), AudioContextState::Suspended);
    context.resume();
    assert_eq!(context.state(), AudioContextState::Running);
}

#[test]
fn test_suspend_halts_time() {
    let context = AudioContext::new(none_options()).unwrap();
    context.resume();
    std::thread::sleep(Duration::from_millis(50));

    context.suspend();
    // let the render thread pick up the message
    std::thread::sleep(Duration::from_millis(20));
    let time = context.current_time();

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(context.current_time(), time);
}

#[test]
fn test_double_close() {
    let context = AudioContext::new(none_options()).unwrap();

    context.close();
    assert_eq!(context.state(), AudioContextState::Closed);
    context.close();
    assert_eq!(context.state(), AudioContextState::Closed);
}

#[test]
fn test_media_element_ended_event() {
    let context = AudioContext::new(none_options()).unwrap();

    // 10 ms of audio
    let mut element = MediaElement::from_buffer(AudioBuffer::from(vec![vec![0.5; 480]], 48_000.));
    let src = context.create_media_element_source(&mut element);
    src.connect(&context.destination());

    let ended = Arc::new(AtomicU32::new(0));
    let ended_clone = Arc::clone(&ended);
    src.set_onended(move |_| {
        ended_clone.fetch_add(1, Ordering::SeqCst);
    });

    context.resume();
    element.play();

    let start = Instant::now();
    while ended.load(Ordering::SeqCst) == 0 && start.elapsed() < Duration::from_secs(5) {
        std::thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(ended.load(Ordering::SeqCst), 1);
    assert!(element.ended());
    assert!(element.paused());
}
