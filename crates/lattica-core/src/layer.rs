//! Layer stacks handed to the RCWA solver.

use ndarray::Array2;
use num_complex::Complex64;

/// One patterned layer: convolution operators for $\epsilon$ and $\mu$ plus
/// its thickness (units of $L_0$).
#[derive(Debug, Clone)]
pub struct Layer {
    pub permittivity: Array2<Complex64>,
    pub permeability: Array2<Complex64>,
    pub thickness: f64,
}

impl Layer {
    /// # Panics
    /// Panics if the operators are not square or do not share a dimension.
    pub fn new(
        permittivity: Array2<Complex64>,
        permeability: Array2<Complex64>,
        thickness: f64,
    ) -> Self {
        assert!(permittivity.is_square(), "permittivity operator must be square");
        assert_eq!(
            permittivity.dim(),
            permeability.dim(),
            "permittivity and permeability operators must have equal dimensions"
        );
        Self {
            permittivity,
            permeability,
            thickness,
        }
    }

    /// Number of harmonics the operators act on.
    pub fn order_count(&self) -> usize {
        self.permittivity.nrows()
    }
}

/// Ordered layers from the reflection side to the transmission side.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single non-magnetic layer built from a permittivity convolution matrix.
    ///
    /// # Panics
    /// Panics if `conv_matrix` is not `order_count x order_count`; the orders
    /// are fixed for a whole run, so a mismatch is a caller bug.
    pub fn assemble(conv_matrix: Array2<Complex64>, order_count: usize, thickness: f64) -> Self {
        assert_eq!(
            conv_matrix.dim(),
            (order_count, order_count),
            "convolution matrix does not match {order_count} harmonics"
        );
        let permeability = Array2::eye(order_count);
        let mut stack = Self::new();
        stack.push(Layer::new(conv_matrix, permeability, thickness));
        stack
    }

    /// # Panics
    /// Panics if `layer` acts on a different number of harmonics than the
    /// layers already in the stack.
    pub fn push(&mut self, layer: Layer) {
        if let Some(first) = self.layers.first() {
            assert_eq!(
                first.order_count(),
                layer.order_count(),
                "all layers must act on the same harmonics"
            );
        }
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Harmonic count shared by every layer, `None` for an empty stack.
    pub fn order_count(&self) -> Option<usize> {
        self.layers.first().map(Layer::order_count)
    }

    /// Total physical thickness.
    pub fn thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }
}
