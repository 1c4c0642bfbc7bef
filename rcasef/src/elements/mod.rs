//! WDF circuit elements: the node interface and one-port leaves.
//!
//! Every adapted port in the filter, leaf or adaptor, implements
//! [`WdfNode`].  A node exchanges two traveling waves with its parent:
//! the reflected wave `b` (sent up, towards the root) and the incident
//! wave `a` (received back down).  The port resistance `Rp` is what the
//! parent adaptor uses to compute its scattering coefficients.
//!
//! The ideal voltage source is not a [`WdfNode`]: it cannot be adapted,
//! so it only ever appears as the root of a tree.

mod linear;

pub use linear::*;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Adapted WDF port (resistor, capacitor, inductor, or an adaptor over them).
pub trait WdfNode {
    /// Port resistance seen looking into this node (Ω).
    fn port_resistance(&self) -> f64;

    /// Produce the reflected wave for the current sample.
    ///
    /// For resistors: `b = 0` (matched termination)
    /// For capacitors: `b = z⁻¹ a` (previous incident)
    /// For inductors: `b = -z⁻¹ a`
    /// For adaptors: the scattering of the children's reflected waves.
    fn reflected(&mut self) -> f64;

    /// Accept the incident wave from the parent.
    ///
    /// Reactive elements latch this value as state for the next sample.
    fn incident(&mut self, a: f64);

    /// Propagate a new sample rate (reactive elements recompute `Rp`).
    fn prepare(&mut self, _sample_rate: f64) {}

    /// Zero integrator memory.  Configured values are untouched.
    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
