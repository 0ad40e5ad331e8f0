//! Field-level coefficient sets for the two equation forms.

use crate::error::{EllipticError, Result};
use crate::field::{Field, SliceBuffer, SliceId};

/// Coefficients of ∂1(A·∂1S) + ∂2(B·∂1S) + ∂1(B·∂2S) + ∂2(C·∂2S) = F.
///
/// A and C are required; B defaults to zero. A and C may be rewritten by
/// stabilization when a solve runs with `modify` enabled.
#[derive(Clone, Debug, Default)]
pub struct SeparableCoefficients {
    pub a: Option<Field>,
    pub b: Option<Field>,
    pub c: Option<Field>,
}

impl SeparableCoefficients {
    /// Diffusion-only operator.
    pub fn new(a: Field, c: Field) -> Self {
        Self {
            a: Some(a),
            b: None,
            c: Some(c),
        }
    }

    /// Add the cross coefficient B.
    pub fn with_b(mut self, b: Field) -> Self {
        self.b = Some(b);
        self
    }

    pub(crate) fn required(&self) -> Result<(&Field, &Field)> {
        let a = self.a.as_ref().ok_or(EllipticError::MissingCoefficient("A"))?;
        let c = self.c.as_ref().ok_or(EllipticError::MissingCoefficient("C"))?;
        Ok((a, c))
    }

    pub(crate) fn check_against(&self, s: &Field) -> Result<()> {
        let (a, c) = self.required()?;
        s.check_compatible("A", a)?;
        s.check_compatible("C", c)?;
        if let Some(b) = &self.b {
            s.check_compatible("B", b)?;
        }
        Ok(())
    }

    pub(crate) fn write_back(&mut self, id: SliceId, repaired: &RepairedCoefficients) {
        if let Some(a) = self.a.as_mut() {
            a.scatter(id, &repaired.a);
        }
        if let Some(c) = self.c.as_mut() {
            c.scatter(id, &repaired.c);
        }
    }
}

/// Coefficients of A·S11 + B·S12 + C·S22 + D·S1 + E·S2 + F·S + G = 0.
///
/// A and C are required; every other term defaults to zero.
#[derive(Clone, Debug, Default)]
pub struct GeneralCoefficients {
    pub a: Option<Field>,
    pub b: Option<Field>,
    pub c: Option<Field>,
    pub d: Option<Field>,
    pub e: Option<Field>,
    pub f: Option<Field>,
    pub g: Option<Field>,
}

impl GeneralCoefficients {
    /// Operator with second-derivative terms only.
    pub fn new(a: Field, c: Field) -> Self {
        Self {
            a: Some(a),
            c: Some(c),
            ..Self::default()
        }
    }

    pub fn with_b(mut self, b: Field) -> Self {
        self.b = Some(b);
        self
    }

    pub fn with_d(mut self, d: Field) -> Self {
        self.d = Some(d);
        self
    }

    pub fn with_e(mut self, e: Field) -> Self {
        self.e = Some(e);
        self
    }

    pub fn with_f(mut self, f: Field) -> Self {
        self.f = Some(f);
        self
    }

    /// Set the source term G.
    pub fn with_g(mut self, g: Field) -> Self {
        self.g = Some(g);
        self
    }

    pub(crate) fn required(&self) -> Result<(&Field, &Field)> {
        let a = self.a.as_ref().ok_or(EllipticError::MissingCoefficient("A"))?;
        let c = self.c.as_ref().ok_or(EllipticError::MissingCoefficient("C"))?;
        Ok((a, c))
    }

    pub(crate) fn check_against(&self, s: &Field) -> Result<()> {
        let (a, c) = self.required()?;
        s.check_compatible("A", a)?;
        s.check_compatible("C", c)?;
        let optional = [
            ("B", &self.b),
            ("D", &self.d),
            ("E", &self.e),
            ("F", &self.f),
            ("G", &self.g),
        ];
        for (role, field) in optional {
            if let Some(field) = field {
                s.check_compatible(role, field)?;
            }
        }
        Ok(())
    }

    pub(crate) fn write_back(&mut self, id: SliceId, repaired: &RepairedCoefficients) {
        if let Some(a) = self.a.as_mut() {
            a.scatter(id, &repaired.a);
        }
        if let Some(c) = self.c.as_mut() {
            c.scatter(id, &repaired.c);
        }
    }
}

/// A and C of one slice after stabilization rewrote them.
#[derive(Clone, Debug, PartialEq)]
pub struct RepairedCoefficients {
    pub a: SliceBuffer,
    pub c: SliceBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Extents4D;

    fn field(name: &str) -> Field {
        Field::filled(name.to_string(), Extents4D::new(1, 1, 4, 4), false, 1.0)
    }

    #[test]
    fn test_missing_required_coefficients() {
        let s = field("s");
        let coeffs = SeparableCoefficients {
            a: Some(field("a")),
            ..Default::default()
        };
        assert_eq!(
            coeffs.check_against(&s).unwrap_err(),
            EllipticError::MissingCoefficient("C")
        );

        let coeffs = GeneralCoefficients::default();
        assert_eq!(
            coeffs.check_against(&s).unwrap_err(),
            EllipticError::MissingCoefficient("A")
        );
    }

    #[test]
    fn test_optional_term_extent_checked() {
        let s = field("s");
        let wrong = Field::filled("g", Extents4D::new(1, 1, 4, 5), false, 0.0);
        let coeffs = GeneralCoefficients::new(field("a"), field("c")).with_g(wrong);
        assert!(matches!(
            coeffs.check_against(&s),
            Err(EllipticError::ExtentMismatch { field: "G", .. })
        ));
    }
}
