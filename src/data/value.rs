use crate::base::{matrix_to_sym, matrix_to_tensor, Error, Result, IDENTITY6};
use russell_lab::Matrix;
use std::fmt;
use std::str::FromStr;

/// Defines the type (and shape) of a registered variable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// Single real number
    Scalar,

    /// True or false
    Boolean,

    /// Real numbers of arbitrary length
    Array,

    /// Integer numbers of arbitrary length
    IntegerArray,

    /// Strings
    List,

    /// Three real components
    Vector,

    /// Six components of a symmetric second-order tensor `[11, 22, 33, 12, 23, 13]`
    SymTensor,

    /// Nine components of a second-order tensor `[11, 12, 13, 21, ..., 33]`
    Tensor,

    /// Square n×n matrix
    ///
    /// A zero dimension means that the dimension is taken from the initial value.
    Matrix(usize),
}

impl DataType {
    /// Returns the fixed number of real components, if any
    pub fn n_components(&self) -> Option<usize> {
        match self {
            DataType::Scalar => Some(1),
            DataType::Vector => Some(3),
            DataType::SymTensor => Some(6),
            DataType::Tensor => Some(9),
            DataType::Matrix(n) => Some(n * n),
            _ => None,
        }
    }
}

impl FromStr for DataType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let words: Vec<_> = lower.split_whitespace().collect();
        match words.as_slice() {
            ["scalar"] => Ok(DataType::Scalar),
            ["boolean"] => Ok(DataType::Boolean),
            ["array"] => Ok(DataType::Array),
            ["integer", "array"] => Ok(DataType::IntegerArray),
            ["list"] => Ok(DataType::List),
            ["vector"] => Ok(DataType::Vector),
            ["symtensor"] => Ok(DataType::SymTensor),
            ["tensor"] => Ok(DataType::Tensor),
            ["matrix"] => Ok(DataType::Matrix(0)),
            ["matrix", n] => n
                .parse::<usize>()
                .map(DataType::Matrix)
                .map_err(|_| Error::UnknownType(s.to_string())),
            _ => Err(Error::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataType::Scalar => write!(f, "Scalar"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Array => write!(f, "Array"),
            DataType::IntegerArray => write!(f, "Integer Array"),
            DataType::List => write!(f, "List"),
            DataType::Vector => write!(f, "Vector"),
            DataType::SymTensor => write!(f, "SymTensor"),
            DataType::Tensor => write!(f, "Tensor"),
            DataType::Matrix(n) => write!(f, "Matrix {}", n),
        }
    }
}

/// Holds the value of a registered variable
#[derive(Clone, Debug)]
pub enum Value {
    Scalar(f64),
    Boolean(bool),
    Reals(Vec<f64>),
    Integers(Vec<i64>),
    List(Vec<String>),
    Matrix(Matrix),
}

impl Value {
    /// Returns the scalar, if this is one
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the real components, if this holds any
    pub fn as_reals(&self) -> Option<&[f64]> {
        match self {
            Value::Reals(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the strings, if this is a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the matrix, if this is one
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Reals(v.to_vec())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Reals(v)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::List(vec![s.to_string()])
    }
}

/// Specifies the initial value of a variable at registration
#[derive(Clone, Debug)]
pub enum Init {
    /// Zero (or false, or empty) of the declared type
    Default,

    /// Identity of the declared type (tensors, vectors and matrices only)
    Identity,

    /// Given value
    Value(Value),
}

/// Selects one of the three copies held by each variable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Slot {
    /// Value at the end of the last converged step
    #[default]
    Old,

    /// Provisional value within the current step
    Current,

    /// Scratch copy used while perturbing the state
    Stashed,
}

impl Slot {
    /// Selects the slot from a pair of flags
    ///
    /// # Input
    ///
    /// * `stash` -- select the stashed slot
    /// * `cur` -- select the current slot
    ///
    /// Selecting neither returns [Slot::Old]; selecting both is an error.
    pub fn from_flags(stash: bool, cur: bool) -> Result<Self> {
        match (stash, cur) {
            (true, true) => Err(Error::SlotConflict),
            (true, false) => Ok(Slot::Stashed),
            (false, true) => Ok(Slot::Current),
            (false, false) => Ok(Slot::Old),
        }
    }
}

/// Selects the representation returned by the container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Form {
    /// Flat components as stored
    #[default]
    Array,

    /// 3×3 (or n×n) matrix
    Matrix,

    /// Column-major components, as exchanged with column-major model libraries
    Interchange,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Form::Array => write!(f, "Array"),
            Form::Matrix => write!(f, "Matrix"),
            Form::Interchange => write!(f, "Interchange"),
        }
    }
}

/// Builds the initial value for a variable type
pub(crate) fn initial_value(name: &str, dtype: DataType, init: Init) -> Result<Value> {
    match init {
        Init::Default => Ok(match dtype {
            DataType::Scalar => Value::Scalar(0.0),
            DataType::Boolean => Value::Boolean(false),
            DataType::Array => Value::Reals(Vec::new()),
            DataType::IntegerArray => Value::Integers(Vec::new()),
            DataType::List => Value::List(Vec::new()),
            DataType::Matrix(0) => return Err(Error::type_mismatch(name, "matrix dimension is unknown")),
            _ => Value::Reals(vec![0.0; dtype.n_components().unwrap_or(0)]),
        }),
        Init::Identity => match dtype {
            DataType::Vector => Ok(Value::Reals(vec![1.0; 3])),
            DataType::SymTensor => Ok(Value::Reals(IDENTITY6.to_vec())),
            DataType::Tensor => Ok(Value::Reals(identity_flat(3))),
            DataType::Matrix(0) => Err(Error::type_mismatch(name, "matrix dimension is unknown")),
            DataType::Matrix(n) => Ok(Value::Reals(identity_flat(n))),
            _ => Err(Error::type_mismatch(
                name,
                format!("identity is not available for {}", dtype),
            )),
        },
        Init::Value(value) => coerce(name, dtype, value),
    }
}

/// Checks a value against the variable type and converts it to the stored layout
///
/// Tensors and matrices are stored as flat row-major components.
pub(crate) fn coerce(name: &str, dtype: DataType, value: Value) -> Result<Value> {
    let mismatch = |v: &Value| Error::type_mismatch(name, format!("cannot store {} as {}", describe(v), dtype));
    match (dtype, value) {
        (DataType::Scalar, Value::Scalar(x)) => Ok(Value::Scalar(x)),
        (DataType::Scalar, Value::Reals(v)) if v.len() == 1 => Ok(Value::Scalar(v[0])),
        (DataType::Boolean, Value::Boolean(b)) => Ok(Value::Boolean(b)),
        (DataType::Array, Value::Reals(v)) => Ok(Value::Reals(v)),
        (DataType::Array, Value::Scalar(x)) => Ok(Value::Reals(vec![x])),
        (DataType::IntegerArray, Value::Integers(v)) => Ok(Value::Integers(v)),
        (DataType::List, Value::List(v)) => Ok(Value::List(v)),
        (DataType::SymTensor, Value::Matrix(m)) if m.dims() == (3, 3) => Ok(Value::Reals(matrix_to_sym(&m).to_vec())),
        (DataType::Tensor, Value::Matrix(m)) if m.dims() == (3, 3) => Ok(Value::Reals(matrix_to_tensor(&m))),
        (DataType::Matrix(n), Value::Matrix(m)) if m.dims() == (n, n) || (n == 0 && m.nrow() == m.ncol()) => {
            Ok(Value::Reals(matrix_to_flat(&m)))
        }
        (DataType::Vector | DataType::SymTensor | DataType::Tensor | DataType::Matrix(_), Value::Reals(v)) => {
            let n = dtype.n_components().unwrap_or(0);
            if v.len() == n || (n == 0 && is_square(v.len())) {
                Ok(Value::Reals(v))
            } else {
                Err(Error::type_mismatch(
                    name,
                    format!("{} requires {} components but got {}", dtype, n, v.len()),
                ))
            }
        }
        (_, value) => Err(mismatch(&value)),
    }
}

/// Converts row-major components into a square matrix
pub(crate) fn flat_to_matrix(v: &[f64]) -> Matrix {
    let n = (v.len() as f64).sqrt().round() as usize;
    let mut m = Matrix::new(n, n);
    for i in 0..n {
        for j in 0..n {
            m.set(i, j, v[n * i + j]);
        }
    }
    m
}

fn matrix_to_flat(m: &Matrix) -> Vec<f64> {
    let (nrow, ncol) = m.dims();
    let mut v = Vec::with_capacity(nrow * ncol);
    for i in 0..nrow {
        for j in 0..ncol {
            v.push(m.get(i, j));
        }
    }
    v
}

fn identity_flat(n: usize) -> Vec<f64> {
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[n * i + i] = 1.0;
    }
    v
}

fn is_square(len: usize) -> bool {
    let n = (len as f64).sqrt().round() as usize;
    n > 0 && n * n == len
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Scalar(_) => "a scalar",
        Value::Boolean(_) => "a boolean",
        Value::Reals(_) => "real components",
        Value::Integers(_) => "integers",
        Value::List(_) => "strings",
        Value::Matrix(_) => "a matrix",
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{coerce, flat_to_matrix, initial_value, DataType, Init, Slot, Value};
    use crate::base::Error;
    use russell_lab::Matrix;

    #[test]
    fn data_type_from_str_works() {
        assert_eq!("Scalar".parse::<DataType>().unwrap(), DataType::Scalar);
        assert_eq!("Integer Array".parse::<DataType>().unwrap(), DataType::IntegerArray);
        assert_eq!("symtensor".parse::<DataType>().unwrap(), DataType::SymTensor);
        assert_eq!("Matrix 6".parse::<DataType>().unwrap(), DataType::Matrix(6));
        assert!(matches!("Banana".parse::<DataType>(), Err(Error::UnknownType(_))));
        assert!(matches!("Matrix six".parse::<DataType>(), Err(Error::UnknownType(_))));
    }

    #[test]
    fn slot_from_flags_works() {
        assert_eq!(Slot::from_flags(false, false).unwrap(), Slot::Old);
        assert_eq!(Slot::from_flags(false, true).unwrap(), Slot::Current);
        assert_eq!(Slot::from_flags(true, false).unwrap(), Slot::Stashed);
        assert!(matches!(Slot::from_flags(true, true), Err(Error::SlotConflict)));
    }

    #[test]
    fn initial_value_works() {
        let v = initial_value("F", DataType::Tensor, Init::Identity).unwrap();
        assert_eq!(v.as_reals().unwrap(), &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let v = initial_value("stress", DataType::SymTensor, Init::Identity).unwrap();
        assert_eq!(v.as_reals().unwrap(), &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        let v = initial_value("efield", DataType::Vector, Init::Default).unwrap();
        assert_eq!(v.as_reals().unwrap(), &[0.0, 0.0, 0.0]);
        let v = initial_value("J", DataType::Matrix(2), Init::Identity).unwrap();
        assert_eq!(v.as_reals().unwrap(), &[1.0, 0.0, 0.0, 1.0]);
        assert!(initial_value("x", DataType::Scalar, Init::Identity).is_err());
        assert!(initial_value("J", DataType::Matrix(0), Init::Default).is_err());
    }

    #[test]
    fn coerce_checks_shapes() {
        assert!(coerce("stress", DataType::SymTensor, Value::Reals(vec![0.0; 5])).is_err());
        assert!(coerce("time", DataType::Scalar, Value::Boolean(true)).is_err());
        let m = Matrix::from(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let v = coerce("F", DataType::Tensor, Value::Matrix(m.clone())).unwrap();
        assert_eq!(v.as_reals().unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let v = coerce("J", DataType::Matrix(0), Value::Matrix(m)).unwrap();
        assert_eq!(flat_to_matrix(v.as_reals().unwrap()).get(2, 1), 8.0);
    }
}
