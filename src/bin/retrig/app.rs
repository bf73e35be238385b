//! Audio stream setup: engine, voice, and the cpal output callback.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::ui;

use retrig::engine::GraphEngine;
use retrig::graph::AudioGraph;
use retrig::voice::EnvelopeVoice;
use retrig::MAX_BLOCK_SIZE;

/// Samples buffered between the audio callback and the UI visualizers.
const VIS_RING_CAPACITY: usize = 1 << 14;

pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;

    let engine = GraphEngine::new(sample_rate);
    let mut voice = EnvelopeVoice::new(&engine);
    voice.set_frequency(220.0);
    engine.connect_to_destination(voice.output());

    let (mut audio_tx, audio_rx) = rtrb::RingBuffer::<f32>::new(VIS_RING_CAPACITY);

    // The callback only needs a cloned engine handle; the voice stays on
    // the UI thread and talks to the same engine through its own handle.
    let render_engine = engine.clone();
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames];
                render_engine.render(block);

                // Mono to all channels, plus a tap for the visualizers.
                let out_off = frames_written * channels;
                for (i, &sample) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = sample;
                    }
                    // Dropped samples only cost the scope some detail.
                    let _ = audio_tx.push(sample);
                }

                frames_written += frames;
            }
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;
    stream.play()?;

    let mut terminal = ratatui::init();
    let result = ui::UiApp::new(engine, voice, audio_rx).run(&mut terminal);
    ratatui::restore();
    result
}
