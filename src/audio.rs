//! Sound cues
//!
//! Procedurally generated tones on the web - no external files needed!
//! Simulations only see the [`ToneSignal`] trait; the browser build plugs in
//! [`WebTone`], tests and the native binary use [`CueLog`].

use std::cell::RefCell;

/// Named sound cues shared by every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Menu or modal button
    Click,
    /// Bubble launched
    Shoot,
    /// Bubbles matched or correct answer caught
    Pop,
    /// Card turned over
    Flip,
    /// Card pair matched
    Match,
    /// Level cleared
    Win,
    /// Wrong answer or game over
    Lose,
}

/// Fire-and-forget sound output
pub trait ToneSignal {
    /// Play a cue; must return immediately
    fn play(&self, cue: Cue);
}

/// Records cues instead of playing them
#[derive(Debug, Default)]
pub struct CueLog {
    cues: RefCell<Vec<Cue>>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues played so far, oldest first
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }

    /// Number of times `cue` was played
    pub fn count(&self, cue: Cue) -> usize {
        self.cues.borrow().iter().filter(|c| **c == cue).count()
    }

    pub fn clear(&self) {
        self.cues.borrow_mut().clear();
    }
}

impl ToneSignal for CueLog {
    fn play(&self, cue: Cue) {
        log::debug!("cue {:?}", cue);
        self.cues.borrow_mut().push(cue);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebTone;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Cue, ToneSignal};
    use crate::settings::Settings;

    /// Web Audio backed tone generator
    pub struct WebTone {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebTone {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator routed through a gain node
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

        /// Short sine note with a linear fade, optionally delayed
        fn note(&self, ctx: &AudioContext, freq: f32, duration: f64, delay: f64, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(0.0, t + duration)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// Click - short high blip
        fn play_click(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Shoot - quick rising sweep
        fn play_shoot(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .linear_ramp_to_value_at_time(600.0, t + 0.1)
                .ok();
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.1).ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Pop - crisp upward chirp
        fn play_pop(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 600.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            osc.frequency().set_value_at_time(600.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1200.0, t + 0.1)
                .ok();
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Flip - soft low tap
        fn play_flip(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.05, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.1).ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Lose - sagging sawtooth
        fn play_lose(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency()
                .linear_ramp_to_value_at_time(100.0, t + 0.5)
                .ok();
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.5).ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.5).ok();
        }
    }

    impl ToneSignal for WebTone {
        fn play(&self, cue: Cue) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::Click => self.play_click(ctx, vol),
                Cue::Shoot => self.play_shoot(ctx, vol),
                Cue::Pop => self.play_pop(ctx, vol),
                Cue::Flip => self.play_flip(ctx, vol),
                // C5 then E5
                Cue::Match => {
                    self.note(ctx, 523.25, 0.1, 0.0, vol);
                    self.note(ctx, 659.25, 0.2, 0.1, vol);
                }
                // C major arpeggio up to C6
                Cue::Win => {
                    self.note(ctx, 523.25, 0.2, 0.0, vol);
                    self.note(ctx, 659.25, 0.2, 0.1, vol);
                    self.note(ctx, 783.99, 0.4, 0.2, vol);
                    self.note(ctx, 1046.50, 0.6, 0.3, vol);
                }
                Cue::Lose => self.play_lose(ctx, vol),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_log_records_in_order() {
        let log = CueLog::new();
        log.play(Cue::Shoot);
        log.play(Cue::Pop);
        log.play(Cue::Pop);
        assert_eq!(log.cues(), vec![Cue::Shoot, Cue::Pop, Cue::Pop]);
        assert_eq!(log.count(Cue::Pop), 2);

        log.clear();
        assert!(log.cues().is_empty());
    }
}
