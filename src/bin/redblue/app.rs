//! Monitor - audio/terminal front end around the control loop

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rtrb::Producer;

use redblue::alloc::{AllocatorConfig, PlayMode, VoiceId};
use redblue::cv::{MapperConfig, OutputFrame};
use redblue::io::queue::event_queue;
use redblue::io::{ControlSink, EventSource, MidiEvent, ModJack};
use redblue::runtime::{ControlLoop, TickReport};
use redblue::MAX_HELD_NOTES;

/// Audio frames per control tick. At 48 kHz this gives a 750 Hz control
/// rate, comfortably above pitch-glide resolution.
const TICK_BLOCK: usize = 64;

/// What the UI thread reads each frame.
#[derive(Clone)]
pub struct MonitorSnapshot {
    pub frame: OutputFrame,
    pub mode: PlayMode,
    pub held: ([u8; MAX_HELD_NOTES], usize),
    pub report: Option<TickReport>,
}

impl Default for MonitorSnapshot {
    fn default() -> Self {
        Self {
            frame: OutputFrame::default(),
            mode: PlayMode::Unison,
            held: ([0; MAX_HELD_NOTES], 0),
            report: None,
        }
    }
}

/// Latches committed output levels the way a DAC and gate drivers would.
#[derive(Default)]
struct HeldOutputs {
    pitch: [f32; 2],
    gate: [bool; 2],
    mod_cv: [f32; 2],
}

impl ControlSink for HeldOutputs {
    fn pitch_cv(&mut self, voice: VoiceId, volts: f32) {
        self.pitch[voice.index()] = volts;
    }

    fn gate(&mut self, voice: VoiceId, high: bool) {
        self.gate[voice.index()] = high;
    }

    fn mod_cv(&mut self, jack: ModJack, volts: f32) {
        let i = match jack {
            ModJack::C => 0,
            ModJack::D => 1,
        };
        self.mod_cv[i] = volts;
    }
}

/// Naive sawtooth that stands in for an analog oscillator patched to one
/// pitch CV and gate. Amplitude is smoothed to avoid clicks on gate edges.
struct AuditionVoice {
    phase: f32,
    amp: f32,
}

impl AuditionVoice {
    fn new() -> Self {
        Self {
            phase: 0.0,
            amp: 0.0,
        }
    }

    fn next_sample(&mut self, pitch_volts: f32, gate: bool, sample_rate: f32) -> f32 {
        let target = if gate { 0.15 } else { 0.0 };
        self.amp += (target - self.amp) * 0.002;

        // Invert the 1 V/octave mapping (0 V reference is MIDI note 36).
        let note = 36.0 + 12.0 * pitch_volts;
        let freq = 440.0 * 2.0_f32.powf((note - 69.0) / 12.0);

        self.phase += freq / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        (2.0 * self.phase - 1.0) * self.amp
    }
}

/// Scripted stand-in for a keyboardist: a looping performance that walks
/// the engine through unison attacks, snap and glide legato, duophonic
/// alternation with a steal, and a closing panic.
struct DemoScript {
    events: Vec<(f32, MidiEvent)>,
    cursor: usize,
    started: Instant,
}

impl DemoScript {
    const CYCLE: f32 = 8.5;

    fn new() -> Self {
        let on = |channel, key, velocity| MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        };
        let off = |channel, key| MidiEvent::NoteOff {
            channel,
            key,
            velocity: 0,
        };
        let cc = |controller, value| MidiEvent::ControlChange {
            channel: 0,
            controller,
            value,
        };

        let events = vec![
            (0.5, on(0, 48, 127)), // unison, accented
            (1.2, on(0, 60, 60)),  // snap legato up
            (1.9, off(0, 60)),     // fall back to the held note
            (2.4, cc(65, 127)),    // glide on
            (2.6, on(0, 67, 60)),  // glide up
            (3.6, off(0, 67)),     // glide back down
            (4.4, off(0, 48)),
            (4.8, cc(65, 0)),
            (5.2, on(1, 48, 100)), // duophonic: RED
            (5.6, on(1, 55, 127)), // BLUE, accented
            (6.0, on(1, 60, 60)),  // steals RED
            (6.6, off(1, 55)),
            (7.0, off(1, 60)),
            (7.2, off(1, 48)),
            (7.6, cc(123, 0)), // tidy up before looping
        ];

        Self {
            events,
            cursor: 0,
            started: Instant::now(),
        }
    }

    /// Push every event whose time has come; restart the cycle when done.
    fn pump(&mut self, tx: &mut Producer<MidiEvent>) {
        let elapsed = self.started.elapsed().as_secs_f32();
        if self.cursor >= self.events.len() {
            if elapsed >= Self::CYCLE {
                self.cursor = 0;
                self.started = Instant::now();
            }
            return;
        }

        while let Some(&(time, event)) = self.events.get(self.cursor) {
            if elapsed < time {
                break;
            }
            // A full queue just drops the event; this is a demo feed.
            let _ = tx.push(event);
            self.cursor += 1;
        }
    }
}

/// Everything the audio callback owns.
struct AudioState {
    engine: ControlLoop,
    rx: rtrb::Consumer<MidiEvent>,
    outputs: HeldOutputs,
    voices: [AuditionVoice; 2],
    countdown: usize,
    sample_rate: f32,
}

pub struct Monitor;

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self
    }

    /// Run the monitor (takes over, plays audio until `q`).
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let tick_rate = sample_rate / TICK_BLOCK as f32;

        let (mut tx, rx) = event_queue(64);
        let snapshot = Arc::new(Mutex::new(MonitorSnapshot::default()));

        let state = Arc::new(Mutex::new(AudioState {
            engine: ControlLoop::new(
                tick_rate,
                AllocatorConfig::default(),
                MapperConfig::default(),
            ),
            rx,
            outputs: HeldOutputs::default(),
            voices: [AuditionVoice::new(), AuditionVoice::new()],
            countdown: 0,
            sample_rate,
        }));

        let state_clone = state.clone();
        let snapshot_clone = snapshot.clone();

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let mut state = state_clone.lock().unwrap();
                let AudioState {
                    engine,
                    rx,
                    outputs,
                    voices,
                    countdown,
                    sample_rate,
                } = &mut *state;
                let sample_rate = *sample_rate;
                let frames = data.len() / channels;

                for frame_idx in 0..frames {
                    if *countdown == 0 {
                        let event = rx.poll();
                        let out = engine.tick(event, outputs);

                        // Never block the audio thread on the UI's lock.
                        if let Ok(mut snap) = snapshot_clone.try_lock() {
                            snap.frame = out;
                            snap.mode = engine.allocator().mode();
                            let notes = engine.state().notes();
                            snap.held.0[..notes.len()].copy_from_slice(notes);
                            snap.held.1 = notes.len();
                            if let Some(report) = engine.take_report() {
                                snap.report = Some(report);
                            }
                        }
                        *countdown = TICK_BLOCK;
                    }
                    *countdown -= 1;

                    let mut mix = 0.0;
                    for (i, voice) in voices.iter_mut().enumerate() {
                        mix += voice.next_sample(outputs.pitch[i], outputs.gate[i], sample_rate);
                    }

                    let off = frame_idx * channels;
                    for ch in 0..channels {
                        data[off + ch] = mix;
                    }
                }
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = Self::ui_loop(&mut terminal, &mut tx, &snapshot);
        ratatui::restore();
        result
    }

    fn ui_loop(
        terminal: &mut ratatui::DefaultTerminal,
        tx: &mut Producer<MidiEvent>,
        snapshot: &Arc<Mutex<MonitorSnapshot>>,
    ) -> EyreResult<()> {
        let mut script = DemoScript::new();

        loop {
            script.pump(tx);

            let snap = snapshot.lock().unwrap().clone();
            terminal.draw(|frame| super::ui::render(frame, &snap))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
                    {
                        return Ok(());
                    }
                }
            }
        }
    }
}
