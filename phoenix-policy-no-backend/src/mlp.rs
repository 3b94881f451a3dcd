use crate::Mat;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activation function applied after an affine layer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// No activation.
    Identity,
    /// `max(x, 0)`.
    Relu,
    /// Hyperbolic tangent.
    Tanh,
}

impl Activation {
    fn apply(&self, x: Mat) -> Mat {
        match self {
            Activation::Identity => x,
            Activation::Relu => x.relu(),
            Activation::Tanh => x.tanh(),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Identity => write!(f, "Identity"),
            Activation::Relu => write!(f, "ReLU"),
            Activation::Tanh => write!(f, "Tanh"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Multilayer perceptron.
///
/// Only constructed with [`Mlp::new`], so every instance has layers that fit
/// together. Checkpoints are read through [`Checkpoint`](crate::Checkpoint).
pub struct Mlp {
    /// Weights of layers, of shape `[out, in]`.
    ws: Vec<Mat>,

    /// Biases of layers, of shape `[out, 1]`.
    bs: Vec<Mat>,

    /// Activation after each layer.
    activations: Vec<Activation>,
}

impl Mlp {
    /// Constructs an MLP, checking that consecutive layers fit together.
    pub fn new(ws: Vec<Mat>, bs: Vec<Mat>, activations: Vec<Activation>) -> Result<Self> {
        if ws.is_empty() {
            bail!("MLP without layers");
        }
        if ws.len() != bs.len() || ws.len() != activations.len() {
            bail!(
                "Got {} weights, {} biases and {} activations",
                ws.len(),
                bs.len(),
                activations.len()
            );
        }
        for (i, (w, b)) in ws.iter().zip(bs.iter()).enumerate() {
            if w.shape().len() != 2 || w.data.len() != w.n_rows() * w.n_cols() {
                bail!("Layer {}: malformed weight of shape {:?}", i, w.shape());
            }
            if b.shape() != [w.shape[0], 1] || b.data.len() != w.n_rows() {
                bail!(
                    "Layer {}: bias of shape {:?} does not fit weight of shape {:?}",
                    i,
                    b.shape(),
                    w.shape()
                );
            }
            if i > 0 && ws[i - 1].n_rows() != w.n_cols() {
                bail!(
                    "Layer {}: expects {} inputs but layer {} has {} outputs",
                    i,
                    w.n_cols(),
                    i - 1,
                    ws[i - 1].n_rows()
                );
            }
        }
        Ok(Self {
            ws,
            bs,
            activations,
        })
    }

    /// Number of inputs.
    pub fn input_dim(&self) -> usize {
        self.ws[0].n_cols()
    }

    /// Number of outputs.
    pub fn output_dim(&self) -> usize {
        self.ws[self.ws.len() - 1].n_rows()
    }

    /// Layers as `(weight, bias, activation)`.
    pub fn layers(&self) -> impl Iterator<Item = (&Mat, &Mat, Activation)> {
        self.ws
            .iter()
            .zip(self.bs.iter())
            .zip(self.activations.iter())
            .map(|((w, b), a)| (w, b, *a))
    }

    /// Computes the output for the column vector `x`.
    pub fn forward(&self, x: &Mat) -> Result<Mat> {
        if x.shape() != [self.input_dim() as i32, 1] {
            bail!(
                "MLP expects an input of shape {:?}, got {:?}",
                [self.input_dim(), 1],
                x.shape()
            );
        }
        let mut x = x.clone();
        for (w, b, activation) in self.layers() {
            x = activation.apply(w.matmul(&x).add(b));
        }
        Ok(x)
    }
}

impl fmt::Display for Mlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mlp(")?;
        for (i, (w, _, activation)) in self.layers().enumerate() {
            writeln!(
                f,
                "  ({}): Linear(in_features={}, out_features={}), {}",
                i,
                w.n_cols(),
                w.n_rows(),
                activation
            )?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mlp() -> Mlp {
        // 2 -> 3 -> 1
        let w1 = Mat::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, -1.0]]).unwrap();
        let b1: Mat = vec![0.0, 0.5, -0.5].into();
        let w2 = Mat::from_rows(&[vec![1.0, 1.0, 1.0]]).unwrap();
        let b2: Mat = vec![0.25].into();
        Mlp::new(
            vec![w1, w2],
            vec![b1, b2],
            vec![Activation::Relu, Activation::Identity],
        )
        .unwrap()
    }

    #[test]
    fn test_forward() -> Result<()> {
        let mlp = mlp();
        assert_eq!(mlp.input_dim(), 2);
        assert_eq!(mlp.output_dim(), 1);

        // hidden = relu([1, 2.5, -1.5]) = [1, 2.5, 0]
        let y = mlp.forward(&vec![1.0, 2.0].into())?;
        assert_eq!(y, Mat::new(vec![3.75], vec![1, 1]));
        Ok(())
    }

    #[test]
    fn test_forward_rejects_wrong_input() {
        assert!(mlp().forward(&vec![1.0, 2.0, 3.0].into()).is_err());
    }

    #[test]
    fn test_new_rejects_mismatched_layers() {
        let w1 = Mat::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let w2 = Mat::from_rows(&[vec![1.0, 1.0, 1.0]]).unwrap();
        let res = Mlp::new(
            vec![w1, w2],
            vec![vec![0.0, 0.0].into(), vec![0.0].into()],
            vec![Activation::Tanh, Activation::Identity],
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_new_rejects_malformed_layers() {
        assert!(Mlp::new(vec![], vec![], vec![]).is_err());

        // Data does not fill the shape.
        let w = Mat::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
        let res = Mlp::new(vec![w], vec![vec![0.0, 0.0].into()], vec![Activation::Tanh]);
        assert!(res.is_err());

        // Bias of the wrong length.
        let w = Mat::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let res = Mlp::new(vec![w], vec![vec![0.0].into()], vec![Activation::Tanh]);
        assert!(res.is_err());
    }

    #[test]
    fn test_display() {
        let s = format!("{}", mlp());
        assert!(s.contains("(0): Linear(in_features=2, out_features=3), ReLU"));
        assert!(s.contains("(1): Linear(in_features=3, out_features=1), Identity"));
    }
}
