//! JSON checkpoint of an MLP policy.
//!
//! A checkpoint is a JSON object whose numbered keys hold the layers of the
//! network, in order, together with the observation statistics recorded at
//! training time:
//!
//! ```json
//! {
//!   "0": {"weight": [[0.1, 0.2], [0.3, 0.4]], "bias": [0.0, 0.0], "activation": "tanh"},
//!   "1": {"weight": [[1.0, -1.0]], "bias": [0.5], "activation": "identity"},
//!   "scaling_parameters": [[0.0, 0.0], [1.0, 1.0]],
//!   "log_std": [-0.5]
//! }
//! ```
//!
//! `scaling_parameters` has two rows, the mean and the standard deviation of
//! the observations. `log_std` is optional.
use crate::{Activation, Mat, Mlp};
use anyhow::{anyhow, bail, Context, Result};
use phoenix_core::ScalingParameters;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom, fs::File, io::BufReader, path::Path};

/// A single affine layer as stored in a checkpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LayerRecord {
    /// Weight, one row per output.
    pub weight: Vec<Vec<f32>>,

    /// Bias, one element per output.
    pub bias: Vec<f32>,

    /// Activation applied after the layer.
    #[serde(default = "default_activation")]
    pub activation: Activation,
}

fn default_activation() -> Activation {
    Activation::Identity
}

#[derive(Deserialize, Serialize)]
struct RawCheckpoint {
    scaling_parameters: Vec<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_std: Option<Vec<f32>>,

    #[serde(flatten)]
    layers: BTreeMap<String, LayerRecord>,
}

/// Parsed checkpoint of an MLP policy.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    /// The network.
    pub mlp: Mlp,

    /// Observation statistics the network was trained with.
    pub scaling_parameters: ScalingParameters,

    /// Log standard deviation of the action noise.
    pub log_std: Option<Vec<f32>>,
}

impl Checkpoint {
    /// Reads a checkpoint from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open checkpoint {}", path.display()))?;
        let raw: RawCheckpoint = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse checkpoint {}", path.display()))?;
        Self::from_raw(raw)
    }

    /// Parses a checkpoint from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawCheckpoint = serde_json::from_str(s)?;
        Self::from_raw(raw)
    }

    /// Serializes the checkpoint into the JSON layout it is read from.
    pub fn to_json(&self) -> Result<String> {
        let layers = self
            .mlp
            .layers()
            .enumerate()
            .map(|(i, (w, b, activation))| {
                let record = LayerRecord {
                    weight: w.rows(),
                    bias: b.data.clone(),
                    activation,
                };
                (i.to_string(), record)
            })
            .collect();
        let raw = RawCheckpoint {
            scaling_parameters: vec![
                self.scaling_parameters.mean.clone(),
                self.scaling_parameters.std.clone(),
            ],
            log_std: self.log_std.clone(),
            layers,
        };
        Ok(serde_json::to_string(&raw)?)
    }

    /// Writes the checkpoint to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn from_raw(raw: RawCheckpoint) -> Result<Self> {
        // Keys are layer indices; BTreeMap orders "10" before "2".
        let mut layers = raw
            .layers
            .into_iter()
            .map(|(k, v)| {
                k.parse::<usize>()
                    .map(|i| (i, v))
                    .map_err(|_| anyhow!("Unexpected key in checkpoint: {}", k))
            })
            .collect::<Result<Vec<_>>>()?;
        layers.sort_by_key(|(i, _)| *i);

        let mut ws = Vec::with_capacity(layers.len());
        let mut bs = Vec::with_capacity(layers.len());
        let mut activations = Vec::with_capacity(layers.len());
        for (pos, (i, layer)) in layers.into_iter().enumerate() {
            if i != pos {
                bail!("Layer {} is missing in checkpoint", pos);
            }
            let w = Mat::from_rows(&layer.weight)
                .ok_or_else(|| anyhow!("Layer {}: rows of weight differ in length", i))?;
            ws.push(w);
            bs.push(layer.bias.into());
            activations.push(layer.activation);
        }
        let mlp = Mlp::new(ws, bs, activations)?;

        let scaling_parameters = ScalingParameters::try_from(raw.scaling_parameters)?;
        if scaling_parameters.dim() != mlp.input_dim() {
            bail!(
                "scaling_parameters have dimension {} but the network expects {} inputs",
                scaling_parameters.dim(),
                mlp.input_dim()
            );
        }
        if let Some(log_std) = raw.log_std.as_ref() {
            if log_std.len() != mlp.output_dim() {
                bail!(
                    "log_std has {} elements but the network has {} outputs",
                    log_std.len(),
                    mlp.output_dim()
                );
            }
        }

        Ok(Self {
            mlp,
            scaling_parameters,
            log_std: raw.log_std,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    const JSON: &str = r#"{
        "1": {"weight": [[1.0, -1.0]], "bias": [0.5], "activation": "identity"},
        "0": {"weight": [[1.0, 0.0], [0.0, 2.0]], "bias": [0.0, 1.0], "activation": "relu"},
        "scaling_parameters": [[1.0, 2.0], [0.5, 4.0]]
    }"#;

    #[test]
    fn test_parse() -> Result<()> {
        let ckpt = Checkpoint::from_json_str(JSON)?;
        assert_eq!(ckpt.mlp.input_dim(), 2);
        assert_eq!(ckpt.mlp.output_dim(), 1);
        assert_eq!(ckpt.scaling_parameters.mean, vec![1.0, 2.0]);
        assert_eq!(ckpt.scaling_parameters.std, vec![0.5, 4.0]);
        assert!(ckpt.log_std.is_none());

        // relu([1, 2 * 3 + 1]) = [1, 7]; 1 - 7 + 0.5
        let y = ckpt.mlp.forward(&vec![1.0, 3.0].into())?;
        assert_eq!(y.data, vec![-5.5]);
        Ok(())
    }

    #[test]
    fn test_layers_are_ordered_numerically() -> Result<()> {
        let mut layers = String::new();
        for i in 0..11 {
            layers.push_str(&format!(
                r#""{}": {{"weight": [[1.0]], "bias": [{}.0]}},"#,
                i, i
            ));
        }
        let json = format!(
            r#"{{ {} "scaling_parameters": [[0.0], [1.0]] }}"#,
            layers
        );
        let ckpt = Checkpoint::from_json_str(&json)?;
        let biases: Vec<f32> = ckpt.mlp.layers().map(|(_, b, _)| b.data[0]).collect();
        assert_eq!(biases, (0..11).map(|i| i as f32).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_invalid_checkpoints() {
        // Missing layer 1.
        let json = r#"{
            "0": {"weight": [[1.0]], "bias": [0.0]},
            "2": {"weight": [[1.0]], "bias": [0.0]},
            "scaling_parameters": [[0.0], [1.0]]
        }"#;
        assert!(Checkpoint::from_json_str(json).is_err());

        // Scaling parameters do not fit the input layer.
        let json = r#"{
            "0": {"weight": [[1.0, 1.0]], "bias": [0.0]},
            "scaling_parameters": [[0.0], [1.0]]
        }"#;
        assert!(Checkpoint::from_json_str(json).is_err());

        // Only one row of scaling parameters.
        let json = r#"{
            "0": {"weight": [[1.0]], "bias": [0.0]},
            "scaling_parameters": [[0.0]]
        }"#;
        assert!(Checkpoint::from_json_str(json).is_err());

        // Unknown key.
        let json = r#"{
            "0": {"weight": [[1.0]], "bias": [0.0]},
            "first": {"weight": [[1.0]], "bias": [0.0]},
            "scaling_parameters": [[0.0], [1.0]]
        }"#;
        assert!(Checkpoint::from_json_str(json).is_err());

        // log_std does not fit the output layer.
        let json = r#"{
            "0": {"weight": [[1.0]], "bias": [0.0]},
            "scaling_parameters": [[0.0], [1.0]],
            "log_std": [0.0, 0.0]
        }"#;
        assert!(Checkpoint::from_json_str(json).is_err());
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        let path = dir.path().join("model.json");
        let mut ckpt = Checkpoint::from_json_str(JSON)?;
        ckpt.log_std = Some(vec![-1.0]);
        ckpt.save(&path)?;
        assert_eq!(Checkpoint::from_json_path(&path)?, ckpt);
        Ok(())
    }
}
