use serde::{Deserialize, Serialize};

/// Row-major matrix of `f32`.
///
/// Vectors are stored as column matrices of shape `[n, 1]`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Mat {
    /// Elements in row-major order.
    pub data: Vec<f32>,

    /// `[n_rows, n_cols]`.
    pub shape: Vec<i32>,
}

impl Mat {
    /// Constructs a matrix without checking `data` against `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<i32>) -> Self {
        Self { data, shape }
    }

    /// Constructs a matrix from its rows.
    ///
    /// Returns `None` if the rows have different lengths.
    pub fn from_rows(rows: &[Vec<f32>]) -> Option<Self> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        let data = rows.iter().flat_map(|r| r.iter().cloned()).collect();
        Some(Self::new(data, vec![rows.len() as i32, n_cols as i32]))
    }

    /// Shape of the matrix.
    pub fn shape(&self) -> &[i32] {
        &self.shape
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.shape[0] as usize
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.shape[1] as usize
    }

    /// Rows of the matrix.
    pub fn rows(&self) -> Vec<Vec<f32>> {
        self.data
            .chunks(self.n_cols().max(1))
            .map(|r| r.to_vec())
            .collect()
    }

    /// Matrix product `self * x`.
    ///
    /// Panics if the number of columns of `self` differs from the number of rows of `x`.
    pub fn matmul(&self, x: &Mat) -> Self {
        let (m, l, n) = (self.n_rows(), self.n_cols(), x.n_cols());
        if l != x.n_rows() {
            panic!(
                "Trying to multiply matrices of incompatible sizes: {:?}",
                (&self.shape, &x.shape)
            );
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

        Self {
            shape: vec![m as _, n as _],
            data,
        }
    }

    /// Elementwise sum. Panics if the shapes differ.
    pub fn add(&self, x: &Mat) -> Self {
        if self.shape[0] != x.shape[0] || self.shape[1] != x.shape[1] {
            panic!(
                "Trying to add matrices of different sizes: {:?}",
                (&self.shape, &x.shape)
            );
        }

        let data = self
            .data
            .iter()
            .zip(x.data.iter())
            .map(|(a, b)| *a + *b)
            .collect();

        Mat {
            data,
            shape: self.shape.clone(),
        }
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.iter().map(|a| f(*a)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Elementwise ReLU.
    pub fn relu(&self) -> Self {
        self.map(|a| if a < 0. { 0. } else { a })
    }

    /// Elementwise `tanh`.
    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }
}

impl From<Vec<f32>> for Mat {
    fn from(x: Vec<f32>) -> Self {
        let shape = vec![x.len() as i32, 1];
        Self { shape, data: x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul() {
        let x = Mat::from_rows(&[vec![1.0, 2., 3.], vec![4., 5., 6.]]).unwrap();
        let y: Mat = vec![7.0f32, 8., 9.].into();
        let z = x.matmul(&y);
        assert_eq!(z, Mat::new(vec![50., 122.], vec![2, 1]));
    }

    #[test]
    fn test_activations() {
        let x: Mat = vec![-1.0f32, 0., 2.].into();
        assert_eq!(x.relu().data, vec![0., 0., 2.]);
        assert_eq!(x.tanh().data, vec![(-1.0f32).tanh(), 0., 2.0f32.tanh()]);
    }

    #[test]
    fn test_rows() {
        let rows = vec![vec![1.0, 2.], vec![3., 4.], vec![5., 6.]];
        let x = Mat::from_rows(&rows).unwrap();
        assert_eq!(x.shape(), &[3, 2]);
        assert_eq!(x.rows(), rows);
        assert!(Mat::from_rows(&[vec![1.0], vec![2., 3.]]).is_none());
    }
}
