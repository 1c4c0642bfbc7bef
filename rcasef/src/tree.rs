//! WDF tree: adaptors and the owned node hierarchy.
//!
//! A tree is processed one sample at a time in two passes driven by the
//! root:
//! 1. **reflected**, bottom-up: leaves produce reflected waves `b`,
//!    adaptors combine them via their scattering matrices.
//! 2. **incident**, top-down: adaptors distribute the root's incident
//!    wave to their children, and reactive leaves latch it as state.
//!
//! Every adaptor owns both children through a [`Node`]; nothing is shared
//! and the topology never changes after construction.  Leaf values are
//! addressed by [`Component`], and a value change re-derives the port
//! resistance of every ancestor on the way back up.
//!
//! Port voltages follow the junction orientation: the children of a series
//! junction carry the negated parent voltage between them, so each series
//! level on the path to a leaf flips the sign it reads.
//!
//! The tree is boxed once at build time; processing never allocates.

use crate::elements::*;

// ---------------------------------------------------------------------------
// Component addressing
// ---------------------------------------------------------------------------

/// Named leaf positions in the filter network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Source impedance.
    InputResistor,
    HighPassC1,
    HighPassL,
    HighPassC2,
    HighPassModC1,
    HighPassModL,
    HighPassModC2,
    LowPassL1,
    LowPassC,
    LowPassL2,
    LowPassModL1,
    LowPassModC,
    LowPassModL2,
    /// Load impedance; the voltage across it is the filter output.
    OutputResistor,
}

impl Component {
    pub const ALL: [Component; 14] = [
        Component::InputResistor,
        Component::HighPassC1,
        Component::HighPassL,
        Component::HighPassC2,
        Component::HighPassModC1,
        Component::HighPassModL,
        Component::HighPassModC2,
        Component::LowPassL1,
        Component::LowPassC,
        Component::LowPassL2,
        Component::LowPassModL1,
        Component::LowPassModC,
        Component::LowPassModL2,
        Component::OutputResistor,
    ];

    /// Schematic-style reference designator.
    pub fn designator(self) -> &'static str {
        match self {
            Component::InputResistor => "Rin",
            Component::HighPassC1 => "C_HP1",
            Component::HighPassL => "L_HP1",
            Component::HighPassC2 => "C_HP2",
            Component::HighPassModC1 => "C_HPm1",
            Component::HighPassModL => "L_HPm",
            Component::HighPassModC2 => "C_HPm2",
            Component::LowPassL1 => "L_LP1",
            Component::LowPassC => "C_LP1",
            Component::LowPassL2 => "L_LP2",
            Component::LowPassModL1 => "L_LPm1",
            Component::LowPassModC => "C_LPm1",
            Component::LowPassModL2 => "L_LPm2",
            Component::OutputResistor => "Rt",
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf elements
// ---------------------------------------------------------------------------

/// A physical one-port element.
#[derive(Debug, Clone, Copy)]
pub enum Element {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
}

impl Element {
    /// Physical value: ohms, farads, or henries.
    pub fn value(&self) -> f64 {
        match self {
            Element::Resistor(r) => r.resistance(),
            Element::Capacitor(c) => c.capacitance(),
            Element::Inductor(l) => l.inductance(),
        }
    }

    /// Returns `true` if the value changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        match self {
            Element::Resistor(r) => r.set_value(value),
            Element::Capacitor(c) => c.set_value(value),
            Element::Inductor(l) => l.set_value(value),
        }
    }

    #[inline]
    pub fn voltage(&self) -> f64 {
        match self {
            Element::Resistor(r) => r.voltage(),
            Element::Capacitor(c) => c.voltage(),
            Element::Inductor(l) => l.voltage(),
        }
    }
}

impl WdfNode for Element {
    #[inline]
    fn port_resistance(&self) -> f64 {
        match self {
            Element::Resistor(r) => r.port_resistance(),
            Element::Capacitor(c) => c.port_resistance(),
            Element::Inductor(l) => l.port_resistance(),
        }
    }

    #[inline]
    fn reflected(&mut self) -> f64 {
        match self {
            Element::Resistor(r) => r.reflected(),
            Element::Capacitor(c) => c.reflected(),
            Element::Inductor(l) => l.reflected(),
        }
    }

    #[inline]
    fn incident(&mut self, a: f64) {
        match self {
            Element::Resistor(r) => r.incident(a),
            Element::Capacitor(c) => c.incident(a),
            Element::Inductor(l) => l.incident(a),
        }
    }

    fn prepare(&mut self, sample_rate: f64) {
        match self {
            Element::Resistor(r) => r.prepare(sample_rate),
            Element::Capacitor(c) => c.prepare(sample_rate),
            Element::Inductor(l) => l.prepare(sample_rate),
        }
    }

    fn reset(&mut self) {
        match self {
            Element::Resistor(r) => r.reset(),
            Element::Capacitor(c) => c.reset(),
            Element::Inductor(l) => l.reset(),
        }
    }
}

/// A tagged leaf of the tree.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub component: Component,
    pub element: Element,
}

// ---------------------------------------------------------------------------
// Adaptors
// ---------------------------------------------------------------------------

/// How an adaptor ties its two sub-trees to the port above it.
///
/// The ladder only needs two shapes: series arms (`Series`) carrying the
/// signal from input to load, and shunt legs (`Parallel`) to ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Series,
    Parallel,
}

/// Port resistance seen from above and the left sub-tree's share of it.
///
/// For `Series` the share is `Rl / (Rl + Rr)`; for `Parallel` it is the
/// conductance share `Rr / (Rl + Rr)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scattering {
    pub port_resistance: f64,
    pub left_share: f64,
}

impl Connection {
    pub fn scattering(self, left: f64, right: f64) -> Scattering {
        let total = left + right;
        match self {
            Connection::Series => Scattering {
                port_resistance: total,
                left_share: left / total,
            },
            Connection::Parallel => Scattering {
                port_resistance: left * right / total,
                left_share: right / total,
            },
        }
    }
}

/// An adaptor together with the two sub-trees it owns.
///
/// Along the ladder the continuing chain always hangs off `right`, so the
/// load sits at the end of the right spine.
#[derive(Debug, Clone)]
pub struct Adaptor {
    connection: Connection,
    scattering: Scattering,
    left: Node,
    right: Node,
    /// Waves reflected by the children in the last upward pass.
    from_left: f64,
    from_right: f64,
}

impl Adaptor {
    fn new(connection: Connection, left: Node, right: Node) -> Self {
        let scattering = connection.scattering(left.port_resistance(), right.port_resistance());
        Self {
            connection,
            scattering,
            left,
            right,
            from_left: 0.0,
            from_right: 0.0,
        }
    }

    fn rescatter(&mut self) {
        self.scattering = self
            .connection
            .scattering(self.left.port_resistance(), self.right.port_resistance());
    }

    /// Wave sent to the parent from the cached child waves.
    #[inline]
    fn combined(&self) -> f64 {
        let (l, r) = (self.from_left, self.from_right);
        match self.connection {
            Connection::Series => -(l + r),
            Connection::Parallel => r + self.scattering.left_share * (l - r),
        }
    }
}

impl WdfNode for Adaptor {
    #[inline]
    fn port_resistance(&self) -> f64 {
        self.scattering.port_resistance
    }

    #[inline]
    fn reflected(&mut self) -> f64 {
        self.from_left = self.left.reflected();
        self.from_right = self.right.reflected();
        self.combined()
    }

    #[inline]
    fn incident(&mut self, a: f64) {
        let (l, r) = (self.from_left, self.from_right);
        let (to_left, to_right) = match self.connection {
            Connection::Series => {
                // Loop voltage the two arms must drop between them.
                let excess = l + r + a;
                let share = self.scattering.left_share;
                (l - share * excess, r - (1.0 - share) * excess)
            }
            Connection::Parallel => {
                // Both legs see the node voltage `(a + b) / 2`.
                let node = a + self.combined();
                (node - l, node - r)
            }
        };
        self.left.incident(to_left);
        self.right.incident(to_right);
    }

    fn prepare(&mut self, sample_rate: f64) {
        self.left.prepare(sample_rate);
        self.right.prepare(sample_rate);
        self.rescatter();
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.from_left = 0.0;
        self.from_right = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node of the WDF tree: either a leaf element or an adaptor.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Leaf),
    Adaptor(Box<Adaptor>),
}

impl Node {
    pub fn resistor(component: Component, resistance: f64) -> Self {
        Node::Leaf(Leaf {
            component,
            element: Element::Resistor(Resistor::new(resistance)),
        })
    }

    pub fn capacitor(component: Component, capacitance: f64, sample_rate: f64) -> Self {
        Node::Leaf(Leaf {
            component,
            element: Element::Capacitor(Capacitor::new(capacitance, sample_rate)),
        })
    }

    pub fn inductor(component: Component, inductance: f64, sample_rate: f64) -> Self {
        Node::Leaf(Leaf {
            component,
            element: Element::Inductor(Inductor::new(inductance, sample_rate)),
        })
    }

    /// Join two sub-trees in series.
    pub fn series(left: Node, right: Node) -> Self {
        Node::Adaptor(Box::new(Adaptor::new(Connection::Series, left, right)))
    }

    /// Join two sub-trees in parallel.
    pub fn parallel(left: Node, right: Node) -> Self {
        Node::Adaptor(Box::new(Adaptor::new(Connection::Parallel, left, right)))
    }

    /// Update the value of the leaf tagged `component`.
    ///
    /// Returns `true` if a value changed; every adaptor on the path back to
    /// this node has then re-derived its port resistance.  Setting a value
    /// equal to the current one is a no-op.
    pub fn set_component(&mut self, component: Component, value: f64) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.component == component && leaf.element.set_value(value),
            Node::Adaptor(adaptor) => {
                let changed = adaptor.left.set_component(component, value)
                    || adaptor.right.set_component(component, value);
                if changed {
                    adaptor.rescatter();
                }
                changed
            }
        }
    }

    /// Find the leaf element tagged `component`.
    pub fn element(&self, component: Component) -> Option<&Element> {
        match self {
            Node::Leaf(leaf) if leaf.component == component => Some(&leaf.element),
            Node::Leaf(_) => None,
            Node::Adaptor(adaptor) => adaptor
                .left
                .element(component)
                .or_else(|| adaptor.right.element(component)),
        }
    }

    /// The leaf at the end of the right spine; in the ladder this is the load.
    #[inline]
    pub fn rightmost(&self) -> &Leaf {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(leaf) => return leaf,
                Node::Adaptor(adaptor) => node = &adaptor.right,
            }
        }
    }

    /// Instantaneous voltage across the leaf tagged `component`.
    #[inline]
    pub fn voltage_across(&self, component: Component) -> Option<f64> {
        self.element(component).map(Element::voltage)
    }

    /// Total number of nodes (leaves + adaptors).
    pub fn node_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Adaptor(adaptor) => 1 + adaptor.left.node_count() + adaptor.right.node_count(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Adaptor(adaptor) => adaptor.left.leaf_count() + adaptor.right.leaf_count(),
        }
    }
}

impl WdfNode for Node {
    #[inline]
    fn port_resistance(&self) -> f64 {
        match self {
            Node::Leaf(leaf) => leaf.element.port_resistance(),
            Node::Adaptor(adaptor) => adaptor.port_resistance(),
        }
    }

    #[inline]
    fn reflected(&mut self) -> f64 {
        match self {
            Node::Leaf(leaf) => leaf.element.reflected(),
            Node::Adaptor(adaptor) => adaptor.reflected(),
        }
    }

    #[inline]
    fn incident(&mut self, a: f64) {
        match self {
            Node::Leaf(leaf) => leaf.element.incident(a),
            Node::Adaptor(adaptor) => adaptor.incident(a),
        }
    }

    fn prepare(&mut self, sample_rate: f64) {
        match self {
            Node::Leaf(leaf) => leaf.element.prepare(sample_rate),
            Node::Adaptor(adaptor) => adaptor.prepare(sample_rate),
        }
    }

    fn reset(&mut self) {
        match self {
            Node::Leaf(leaf) => leaf.element.reset(),
            Node::Adaptor(adaptor) => adaptor.reset(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
