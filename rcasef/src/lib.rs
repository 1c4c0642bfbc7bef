//! rcasef: a Wave Digital Filter model of the RCA MK II Sound Effects Filter.
//!
//! The unit is a passive constant-k ladder with a switchable high-pass and
//! low-pass section, each of which can be doubled by a "mod" section.  The
//! model simulates the circuit sample by sample, either from continuous
//! cutoff knobs or from the eleven measured positions of the hardware
//! rotary switches.
//!
//! # Modules
//!
//! - [`elements`]: WDF one-port elements (R, C, L) and the ideal source
//! - [`tree`]: series/parallel adaptors and the component-addressed node tree
//! - [`network`]: the fixed filter circuit, [`RcaMk2Sef`]
//! - [`mapping`]: cutoff formulas, switch tables, mod bypass, impedance knob
//! - [`analysis`]: impulse/FFT magnitude response on a dedicated instance
//! - [`params`]: parameter snapshot, lock-free store and fan-out
//! - [`processor`]: multi-channel block processing with reset-on-switch
//! - [`wav`]: WAV file I/O for offline rendering and testing
//! - [`config`]: YAML presets

pub mod analysis;
pub mod config;
pub mod elements;
pub mod error;
pub mod mapping;
pub mod network;
pub mod params;
pub mod processor;
pub mod tree;
pub mod wav;

pub use analysis::{AnalysisConfig, ResponseAnalyzer, ResponseCurve};
pub use config::{ConfigError, SefConfig};
pub use error::{Error, Result};
pub use mapping::{map_impedance, ComponentValues, KnobPosition};
pub use network::{RcaMk2Sef, SectionMode};
pub use params::{apply_params, FilterParams, ParameterStore, SectionParams};
pub use processor::SefProcessor;
pub use tree::Component;
