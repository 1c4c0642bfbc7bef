//! Multi-channel block processor.
//!
//! Owns one [`RcaMk2Sef`] per channel.  Each block:
//!
//! 1. the parameter snapshot is fanned out to every channel,
//! 2. if a switched section moved to a new position, every channel is reset,
//! 3. samples are filtered and scaled by the output gain.
//!
//! Switching a hardware position swaps component values in one step, which
//! leaves the reactive elements holding charge that no longer matches the
//! circuit.  Clearing that state trades the resulting transient for a short
//! dropout; no crossfade is attempted.

use crate::mapping::{decibels_to_gain, KnobPosition};
use crate::network::RcaMk2Sef;
use crate::params::{apply_params, FilterParams, SectionParams};

#[derive(Debug, Clone)]
pub struct SefProcessor {
    channels: Vec<RcaMk2Sef>,
    /// Switch positions of discrete sections in the previous block.
    switches: Option<[Option<KnobPosition>; 2]>,
    sample_rate: f64,
}

fn switch_position(section: &SectionParams) -> Option<KnobPosition> {
    (!section.continuous).then_some(section.knob)
}

impl SefProcessor {
    pub fn new(num_channels: usize) -> Self {
        Self {
            channels: (0..num_channels).map(|_| RcaMk2Sef::new()).collect(),
            switches: None,
            sample_rate: 0.0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        for filter in &mut self.channels {
            filter.prepare(sample_rate);
        }
        self.switches = None;
        tracing::debug!(channels = self.channels.len(), sample_rate, "processor prepared");
    }

    pub fn reset(&mut self) {
        for filter in &mut self.channels {
            filter.reset();
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> Option<&RcaMk2Sef> {
        self.channels.get(index)
    }

    /// Linear output gain for `params`.
    pub fn current_gain(params: &FilterParams) -> f64 {
        decibels_to_gain(params.output_gain_db)
    }

    /// Filter one block in place.
    ///
    /// `channels[i]` is processed by filter `i`; buffers past the processor's
    /// channel count are silenced.
    pub fn process_block(&mut self, params: &FilterParams, channels: &mut [&mut [f32]]) {
        let current = [
            switch_position(&params.high_pass),
            switch_position(&params.low_pass),
        ];
        let switched = self.switches.is_some_and(|previous| {
            current
                .iter()
                .zip(previous.iter())
                .any(|(now, before)| now.is_some() && now != before)
        });
        self.switches = Some(current);

        apply_params(self.channels.iter_mut(), params);
        if switched {
            tracing::trace!(
                high_pass = ?current[0],
                low_pass = ?current[1],
                "switch moved, clearing filter state"
            );
            self.reset();
        }

        let gain = Self::current_gain(params);
        for (index, buffer) in channels.iter_mut().enumerate() {
            match self.channels.get_mut(index) {
                Some(filter) => {
                    for sample in buffer.iter_mut() {
                        *sample = (filter.process_sample(f64::from(*sample)) * gain) as f32;
                    }
                }
                None => buffer.fill(0.0),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
