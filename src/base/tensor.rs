use super::Result;
use russell_lab::{mat_inverse, mat_t_mat_mul, Matrix};
use russell_tensor::{Mandel, Tensor2, SQRT_2};

/// Holds the symmetric identity in the `[11, 22, 33, 12, 23, 13]` component order
pub const IDENTITY6: [f64; 6] = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

/// Maps the symmetric component index to the (row, column) pair
pub const SYM_INDEX: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (1, 2), (0, 2)];

/// Converts nine row-major components `[11, 12, 13, 21, ..., 33]` into a 3×3 matrix
pub fn tensor_to_matrix(v: &[f64]) -> Matrix {
    let mut a = Matrix::new(3, 3);
    for i in 0..3 {
        for j in 0..3 {
            a.set(i, j, v[3 * i + j]);
        }
    }
    a
}

/// Converts a 3×3 matrix into nine row-major components
pub fn matrix_to_tensor(a: &Matrix) -> Vec<f64> {
    let mut v = vec![0.0; 9];
    for i in 0..3 {
        for j in 0..3 {
            v[3 * i + j] = a.get(i, j);
        }
    }
    v
}

/// Converts the `[11, 22, 33, 12, 23, 13]` components into a full symmetric matrix
pub fn sym_to_matrix(s: &[f64]) -> Matrix {
    let mut a = Matrix::new(3, 3);
    for (k, (i, j)) in SYM_INDEX.iter().enumerate() {
        a.set(*i, *j, s[k]);
        a.set(*j, *i, s[k]);
    }
    a
}

/// Extracts the symmetric part of a 3×3 matrix as `[11, 22, 33, 12, 23, 13]` components
pub fn matrix_to_sym(a: &Matrix) -> [f64; 6] {
    let mut s = [0.0; 6];
    for (k, (i, j)) in SYM_INDEX.iter().enumerate() {
        s[k] = 0.5 * (a.get(*i, *j) + a.get(*j, *i));
    }
    s
}

/// Returns the transpose of a square matrix
pub fn transposed(a: &Matrix) -> Result<Matrix> {
    let (m, n) = a.dims();
    let mut at = Matrix::new(n, m);
    mat_t_mat_mul(&mut at, 1.0, a, &Matrix::identity(m), 0.0)?;
    Ok(at)
}

/// Computes the inverse of a square matrix and returns it with the determinant
///
/// Returns `None` if the matrix is singular.
pub fn inverse_and_determinant(a: &Matrix) -> Option<(Matrix, f64)> {
    let (m, n) = a.dims();
    let mut ai = Matrix::new(m, n);
    match mat_inverse(&mut ai, a) {
        Ok(det) => Some((ai, det)),
        Err(_) => None,
    }
}

/// Returns the determinant of a square matrix (zero if singular)
pub fn determinant(a: &Matrix) -> f64 {
    match inverse_and_determinant(a) {
        Some((_, det)) => det,
        None => 0.0,
    }
}

/// Returns whether the deformation gradient carries a rotation
///
/// The orthogonal factor of `F = Q·R` (with a positive diagonal in R) is the identity
/// exactly when F is upper triangular with a positive diagonal. Hence, F carries a
/// rotation when a diagonal entry is not positive or when a sub-diagonal entry exceeds
/// `tol` relative to the diagonal entry of its column.
pub fn has_rotation(f: &Matrix, tol: f64) -> bool {
    for j in 0..3 {
        let fjj = f.get(j, j);
        if fjj <= 0.0 {
            return true;
        }
        for i in (j + 1)..3 {
            if f.get(i, j).abs() > tol * fjj {
                return true;
            }
        }
    }
    false
}

/// Returns the trace of symmetric components
pub fn sym_trace(s: &[f64]) -> f64 {
    s[0] + s[1] + s[2]
}

/// Returns the Frobenius norm of symmetric components
pub fn sym_norm(s: &[f64]) -> f64 {
    (s[0] * s[0] + s[1] * s[1] + s[2] * s[2] + 2.0 * (s[3] * s[3] + s[4] * s[4] + s[5] * s[5])).sqrt()
}

/// Copies symmetric components into a Tensor2 (Mandel representation)
pub fn sym_to_tensor(tt: &mut Tensor2, s: &[f64]) {
    let vec = tt.vector_mut();
    for i in 0..3 {
        vec[i] = s[i];
        vec[3 + i] = SQRT_2 * s[3 + i];
    }
}

/// Extracts symmetric components from a Tensor2 (Mandel representation)
pub fn tensor_to_sym(tt: &Tensor2) -> [f64; 6] {
    let vec = tt.vector();
    [vec[0], vec[1], vec[2], vec[3] / SQRT_2, vec[4] / SQRT_2, vec[5] / SQRT_2]
}

/// Allocates a new symmetric Tensor2 holding the given components
pub fn new_sym_tensor(s: &[f64]) -> Tensor2 {
    let mut tt = Tensor2::new(Mandel::Symmetric);
    sym_to_tensor(&mut tt, s);
    tt
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use russell_lab::{approx_eq, mat_mat_mul};

    #[test]
    fn inverse_and_determinant_work() {
        let a = tensor_to_matrix(&[2.0, 1.0, 0.0, 0.0, 3.0, 0.5, 0.0, 0.0, 4.0]);
        approx_eq(determinant(&a), 24.0, 1e-14);
        let (ai, det) = inverse_and_determinant(&a).unwrap();
        approx_eq(det, 24.0, 1e-14);
        let mut c = Matrix::new(3, 3);
        mat_mat_mul(&mut c, 1.0, &a, &ai, 0.0).unwrap();
        let identity = Matrix::identity(3);
        for i in 0..3 {
            for j in 0..3 {
                approx_eq(c.get(i, j), identity.get(i, j), 1e-15);
            }
        }
        let singular = tensor_to_matrix(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0]);
        assert!(inverse_and_determinant(&singular).is_none());
        assert_eq!(determinant(&singular), 0.0);
    }

    #[test]
    fn transposed_works() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let at = transposed(&tensor_to_matrix(&v)).unwrap();
        assert_eq!(matrix_to_tensor(&at), &[1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn sym_conversions_work() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let a = sym_to_matrix(&s);
        assert_eq!(matrix_to_tensor(&a), &[1.0, 4.0, 6.0, 4.0, 2.0, 5.0, 6.0, 5.0, 3.0]);
        assert_eq!(matrix_to_sym(&a), s);
        let skew = tensor_to_matrix(&[0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(matrix_to_sym(&skew), [0.0; 6]);
        let tt = new_sym_tensor(&s);
        let back = tensor_to_sym(&tt);
        for i in 0..6 {
            approx_eq(back[i], s[i], 1e-15);
        }
        approx_eq(sym_norm(&[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]), f64::sqrt(3.0), 1e-15);
        assert_eq!(sym_trace(&s), 6.0);
    }

    #[test]
    fn has_rotation_works() {
        let stretch = tensor_to_matrix(&[1.1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.95]);
        assert!(!has_rotation(&stretch, 1e-12));
        let shear = tensor_to_matrix(&[1.0, 0.2, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(!has_rotation(&shear, 1e-12));
        let (c, s) = (f64::cos(0.1), f64::sin(0.1));
        let rotation = tensor_to_matrix(&[c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0]);
        assert!(has_rotation(&rotation, 1e-12));
        // half turn about the 3-axis (det = 1)
        let half_turn = tensor_to_matrix(&[-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(has_rotation(&half_turn, 1e-12));
    }
}
