use crate::PolicyError;
use serde::{Deserialize, Serialize};

/// A row-major matrix of `f32`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Mat {
    /// Elements, row by row.
    pub data: Vec<f32>,

    /// `[rows, cols]`.
    pub shape: [usize; 2],
}

impl Mat {
    /// Constructs a matrix, checking that `data` fills `shape`.
    pub fn new(data: Vec<f32>, shape: [usize; 2]) -> Result<Self, PolicyError> {
        if data.len() != shape[0] * shape[1] {
            return Err(PolicyError::Shape(format!(
                "{} elements do not fill a {}x{} matrix",
                data.len(),
                shape[0],
                shape[1]
            )));
        }
        Ok(Self { data, shape })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Matrix product `self * x`.
    pub fn matmul(&self, x: &Mat) -> Result<Self, PolicyError> {
        let (m, l, n) = (self.rows(), self.cols(), x.cols());
        if x.rows() != l {
            return Err(PolicyError::Shape(format!(
                "cannot multiply {:?} by {:?}",
                self.shape, x.shape
            )));
        }

        let mut data = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                let kk = i * n + j;
                for k in 0..l {
                    data[kk] += self.data[i * l + k] * x.data[k * n + j];
                }
            }
        }

        Ok(Self {
            shape: [m, n],
            data,
        })
    }

    /// Elementwise sum.
    pub fn add(&self, x: &Mat) -> Result<Self, PolicyError> {
        if self.shape != x.shape {
            return Err(PolicyError::Shape(format!(
                "cannot add {:?} and {:?}",
                self.shape, x.shape
            )));
        }

        let data = self
            .data
            .iter()
            .zip(x.data.iter())
            .map(|(a, b)| *a + *b)
            .collect();

        Ok(Mat {
            data,
            shape: self.shape,
        })
    }

    /// Elementwise `max(0, x)`.
    pub fn relu(&self) -> Self {
        self.map(|a| a.max(0.0))
    }

    /// Elementwise hyperbolic tangent.
    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.iter().map(|a| f(*a)).collect(),
            shape: self.shape,
        }
    }
}

/// A column vector.
impl From<Vec<f32>> for Mat {
    fn from(x: Vec<f32>) -> Self {
        let shape = [x.len(), 1];
        Self { shape, data: x }
    }
}
