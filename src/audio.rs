//! Sound trigger points
//!
//! The simulation only decides *when* a sound plays. Hosts inject an
//! `AudioSink`; on the web that is the procedural Web Audio synthesizer below,
//! headless runs use `NullAudio`.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Blade cuts through fruit
    Slice,
    /// Wet impact layered on every slice
    Squish,
    /// Bomb detonation / final life lost
    Explosion,
    /// Run ended
    GameOver,
}

/// Audio capability injected into the engine
///
/// Calls are fire-and-forget; a sink that cannot play must simply do nothing.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Unlock playback after a user gesture (browsers start suspended)
    fn resume(&mut self) {}

    /// Output level in 0.0 - 1.0
    fn set_volume(&mut self, _volume: f32) {}
}

/// Silent sink for headless runs and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};

    /// Web Audio synthesizer - no sample files needed
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(volume: f32) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Slice - sawtooth swish sweeping down
        fn play_slice(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(800.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(100.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Squish - soft wet thump
        fn play_squish(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Explosion - boom!
        fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();

            // High frequency crack
            if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain2.gain().set_value_at_time(vol * 0.3, t).ok();
                gain2
                    .gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc2.start().ok();
                osc2.stop_with_when(t + 0.15).ok();
            }
        }

        /// Game over - long falling tone
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 1.0).ok();
            osc.frequency().set_value_at_time(400.0, t).ok();
            osc.frequency()
                .linear_ramp_to_value_at_time(100.0, t + 1.0)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 1.0).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Slice => self.play_slice(ctx, vol),
                SoundEffect::Squish => self.play_squish(ctx, vol),
                SoundEffect::Explosion => self.play_explosion(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}
