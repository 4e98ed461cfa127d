use super::{register_elastic_parameters, set_up_elastic_constants, ConstitutiveModel, ModelBase};
use crate::base::{determinant, matrix_to_sym, sym_to_matrix, tensor_to_matrix, transposed, Error, Result};
use crate::data::{DataContainer, DataType, Init};
use russell_lab::{mat_mat_mul, mat_t_mat_mul, Matrix};

/// Implements a finite (hyper) elastic model of the Saint Venant-Kirchhoff type
///
/// ```text
/// E = ½ (Fᵀ·F - I)          Green-Lagrange strain
/// S = c₁₁ E + c₁₂ …         second Piola-Kirchhoff stress
/// σ = F·S·Fᵀ / J            Cauchy stress
/// ```
///
/// with `c₁₁ = K + 4G/3`, `c₁₂ = K - 2G/3` and `c₄₄ = G`. The initial Jacobian is
/// computed numerically about the undeformed state.
pub struct FiniteElastic {
    base: ModelBase,

    /// Holds c₁₁, c₁₂ and c₄₄
    cc: [f64; 3],
}

impl FiniteElastic {
    /// Allocates a new instance
    pub fn new() -> Result<Self> {
        let mut base = ModelBase::new("finite_elastic");
        register_elastic_parameters(&mut base)?;
        Ok(FiniteElastic { base, cc: [0.0; 3] })
    }
}

impl ConstitutiveModel for FiniteElastic {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn set_up(&mut self, matdat: &mut DataContainer) -> Result<()> {
        let (kk, gg) = set_up_elastic_constants(&mut self.base)?;
        self.cc = [kk + 4.0 * gg / 3.0, kk - 2.0 * gg / 3.0, gg];
        self.base.dc = self.cc.to_vec();
        matdat.register("green strain", DataType::SymTensor, Init::Default, Some("GREEN_STRAIN"))?;
        matdat.register("pk2 stress", DataType::SymTensor, Init::Default, Some("PK2"))?;
        Ok(())
    }

    fn isotropic_init_jacobian(&self) -> bool {
        false
    }

    /// Computes the stress from the current deformation gradient
    fn update_state(&mut self, _simdat: &DataContainer, matdat: &mut DataContainer) -> Result<()> {
        let ff = tensor_to_matrix(&matdat.array_cur("deformation gradient")?);
        let jac = determinant(&ff);
        if jac <= 0.0 {
            return Err(Error::setup(format!(
                "finite_elastic: deformation gradient has a non-positive determinant {}",
                jac
            )));
        }

        // E = ½ (Fᵀ·F - I)
        let mut ee = Matrix::identity(3);
        mat_t_mat_mul(&mut ee, 0.5, &ff, &ff, -0.5)?;
        let e = matrix_to_sym(&ee);

        // S = C : E (tensor shear components)
        let (c11, c12, c44) = (self.cc[0], self.cc[1], self.cc[2]);
        let mut pk2 = [0.0; 6];
        pk2[0] = c11 * e[0] + c12 * e[1] + c12 * e[2];
        pk2[1] = c12 * e[0] + c11 * e[1] + c12 * e[2];
        pk2[2] = c12 * e[0] + c12 * e[1] + c11 * e[2];
        for i in 3..6 {
            pk2[i] = 2.0 * c44 * e[i];
        }

        // σ = F·S·Fᵀ / J
        let mut fs = Matrix::new(3, 3);
        mat_mat_mul(&mut fs, 1.0, &ff, &sym_to_matrix(&pk2), 0.0)?;
        let mut push = Matrix::new(3, 3);
        mat_mat_mul(&mut push, 1.0 / jac, &fs, &transposed(&ff)?, 0.0)?;
        let sig = matrix_to_sym(&push).to_vec();

        matdat.store("stress", sig)?;
        matdat.store("pk2 stress", pk2.to_vec())?;
        matdat.store("green strain", e.to_vec())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
