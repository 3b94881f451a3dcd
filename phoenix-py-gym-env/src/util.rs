//! Conversion between numpy arrays and [`ArrayD`].
use anyhow::Result;
use ndarray::ArrayD;
use numpy::PyArrayDyn;
use pyo3::{types::IntoPyDict, IntoPy, PyAny, PyObject, Python};

/// Convert [`ArrayD<f64>`] to [`PyObject`].
pub fn arrayd_to_pyobj(py: Python<'_>, a: &ArrayD<f64>) -> PyObject {
    PyArrayDyn::<f64>::from_array(py, a).into_py(py)
}

/// Convert a Python object to [`ArrayD<f64>`].
///
/// The object is passed to `numpy.asarray()` with `dtype="float64"`,
/// so observations of any numeric dtype, lists and scalars are accepted.
pub fn pyobj_to_arrayd(py: Python<'_>, obj: &PyAny) -> Result<ArrayD<f64>> {
    let np = py.import("numpy")?;
    let kwargs = vec![("dtype", "float64")].into_py_dict(py);
    let arr = np.call_method("asarray", (obj,), Some(kwargs))?;
    let arr: &PyArrayDyn<f64> = arr.extract()?;
    Ok(arr.to_owned_array())
}
