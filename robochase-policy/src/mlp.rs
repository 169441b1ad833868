use crate::{Mat, PolicyError};
use anyhow::Result;
use log::{info, warn};
use robochase_core::{Configurable, Obs, Policy};
use robochase_env::{IrLayout, RoboboAct, RoboboEnv, RoboboObs};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
/// Multilayer perceptron with ReLU hidden layers and a tanh output.
pub struct Mlp {
    /// Weights of layers, `[out, in]`.
    ws: Vec<Mat>,

    /// Biases of layers, `[out, 1]`.
    bs: Vec<Mat>,
}

impl Mlp {
    /// Constructs an [`Mlp`], checking that consecutive layers fit together.
    pub fn new(ws: Vec<Mat>, bs: Vec<Mat>) -> Result<Self, PolicyError> {
        let mlp = Self { ws, bs };
        mlp.check()?;
        Ok(mlp)
    }

    fn check(&self) -> Result<(), PolicyError> {
        if self.ws.is_empty() || self.ws.len() != self.bs.len() {
            return Err(PolicyError::Shape(format!(
                "{} weight matrices and {} bias vectors",
                self.ws.len(),
                self.bs.len()
            )));
        }
        for (i, (w, b)) in self.ws.iter().zip(self.bs.iter()).enumerate() {
            if w.data.len() != w.rows() * w.cols() || b.data.len() != b.rows() * b.cols() {
                return Err(PolicyError::Shape(format!("layer {}: inconsistent data", i)));
            }
            if b.shape != [w.rows(), 1] {
                return Err(PolicyError::Shape(format!(
                    "layer {}: bias {:?} for weight {:?}",
                    i, b.shape, w.shape
                )));
            }
            if i > 0 && w.cols() != self.ws[i - 1].rows() {
                return Err(PolicyError::Shape(format!(
                    "layer {} takes {} inputs, layer {} gives {}",
                    i,
                    w.cols(),
                    i - 1,
                    self.ws[i - 1].rows()
                )));
            }
        }
        Ok(())
    }

    /// Number of inputs.
    pub fn in_dim(&self) -> usize {
        self.ws.first().map_or(0, |w| w.cols())
    }

    /// Number of outputs.
    pub fn out_dim(&self) -> usize {
        self.ws.last().map_or(0, |w| w.rows())
    }

    /// Forward pass of a column vector.
    pub fn forward(&self, x: &Mat) -> Result<Mat, PolicyError> {
        let n_layers = self.ws.len();
        let mut x = x.clone();
        for i in 0..n_layers {
            x = self.ws[i].matmul(&x)?.add(&self.bs[i])?;
            if i != n_layers - 1 {
                x = x.relu();
            }
        }
        Ok(x.tanh())
    }
}

/// Configuration of [`MlpPolicy`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MlpPolicyConfig {
    /// Network weights.
    pub mlp: Mlp,

    /// Infrared layout of the observations fed to the network.
    pub ir_layout: IrLayout,

    /// Scale of the network outputs, usually the velocity bound.
    pub velocity_max: f32,
}

/// Feed-forward controller over the flattened observation.
///
/// The two tanh outputs, scaled by `velocity_max`, are the `forward` and
/// `turn` increments of the action.
pub struct MlpPolicy {
    mlp: Mlp,
    ir_layout: IrLayout,
    velocity_max: f32,
}

impl MlpPolicy {
    /// Number of features of an observation with the given infrared layout.
    pub fn feature_len(layout: IrLayout) -> usize {
        3 + layout.channels().len() + 2 + 1
    }
}

impl Configurable for MlpPolicy {
    type Config = MlpPolicyConfig;

    /// Builds the policy, checking the network against the observation layout.
    fn build(config: Self::Config) -> Result<Self> {
        config.mlp.check()?;
        let n_features = Self::feature_len(config.ir_layout);
        if config.mlp.in_dim() != n_features {
            return Err(PolicyError::InputSize {
                expected: config.mlp.in_dim(),
                actual: n_features,
            }
            .into());
        }
        if config.mlp.out_dim() != 2 {
            return Err(PolicyError::OutputSize(config.mlp.out_dim()).into());
        }
        info!(
            "MlpPolicy with {} layers, {} inputs",
            config.mlp.ws.len(),
            n_features
        );

        Ok(Self {
            mlp: config.mlp,
            ir_layout: config.ir_layout,
            velocity_max: config.velocity_max,
        })
    }
}

impl Policy<RoboboEnv> for MlpPolicy {
    fn sample(&mut self, obs: &RoboboObs) -> RoboboAct {
        debug_assert_eq!(obs.ir_layout, self.ir_layout);
        debug_assert_eq!(obs.len(), self.mlp.in_dim());

        match self.mlp.forward(&Mat::from(obs.to_features())) {
            Ok(y) => RoboboAct::new(y.data[0] * self.velocity_max, y.data[1] * self.velocity_max),
            Err(e) => {
                warn!("MlpPolicy: {}, holding velocity", e);
                RoboboAct::default()
            }
        }
    }
}
