use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::fmt;

use crate::error::{Error, Result};

/// Declarative description of a coefficient field, resolved once at
/// construction time into an [`ExactField`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldSpec {
    /// The rational numbers.
    Rational,
    /// Q[x]/(f) for the polynomial f with the given coefficients
    /// (ascending order). `embedding` is an approximation of the real
    /// root of f that the generator denotes; it disambiguates the root
    /// and is never used in arithmetic.
    AlgebraicExtension {
        coefficients: Vec<BigRational>,
        embedding: f64,
    },
}

impl FieldSpec {
    /// Convenience constructor taking (numerator, denominator) pairs in
    /// ascending order.
    pub fn extension(coefficients: &[(i64, i64)], embedding: f64) -> Self {
        FieldSpec::AlgebraicExtension {
            coefficients: coefficients.iter().map(|&(n, d)| ratio(n, d)).collect(),
            embedding,
        }
    }

    /// Resolve the description into a usable field.
    ///
    /// Rejects defining polynomials of degree zero or with a vanishing
    /// leading coefficient. The polynomial is normalized to be monic.
    pub fn resolve(self) -> Result<ExactField> {
        match self {
            FieldSpec::Rational => Ok(ExactField {
                kind: FieldKind::Rational,
            }),
            FieldSpec::AlgebraicExtension {
                coefficients,
                embedding,
            } => {
                let coefficients = trim(coefficients);
                if coefficients.len() < 2 {
                    return Err(Error::InvalidFieldSpec(
                        "defining polynomial must have degree at least 1".into(),
                    ));
                }
                let lead = coefficients.last().expect("nonempty").clone();
                let modulus: Vec<BigRational> =
                    coefficients.iter().map(|c| c / &lead).collect();
                Ok(ExactField {
                    kind: FieldKind::Extension { modulus, embedding },
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum FieldKind {
    Rational,
    Extension {
        /// Monic defining polynomial, ascending coefficients.
        modulus: Vec<BigRational>,
        embedding: f64,
    },
}

/// An exact coefficient field: the rationals or an algebraic extension
/// Q[x]/(f) with a chosen real embedding.
///
/// Immutable; cloned freely into the matrices it produces. All element
/// operations go through the field so that extension arithmetic can
/// reduce modulo the defining polynomial.
#[derive(Clone, Debug, PartialEq)]
pub struct ExactField {
    kind: FieldKind,
}

/// An element of an [`ExactField`], stored as a trimmed coefficient
/// vector over the rationals (ascending powers of the generator). The
/// same representation serves both field variants; rational elements
/// simply have degree zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldElement {
    coeffs: Vec<BigRational>,
}

impl ExactField {
    /// The field of rational numbers.
    pub fn rationals() -> Self {
        ExactField {
            kind: FieldKind::Rational,
        }
    }

    /// Dimension of the field as a vector space over Q (1 for the
    /// rationals).
    pub fn degree(&self) -> usize {
        match &self.kind {
            FieldKind::Rational => 1,
            FieldKind::Extension { modulus, .. } => modulus.len() - 1,
        }
    }

    /// Approximation of the real root the generator denotes, when the
    /// field is a proper extension.
    pub fn embedding(&self) -> Option<f64> {
        match &self.kind {
            FieldKind::Rational => None,
            FieldKind::Extension { embedding, .. } => Some(*embedding),
        }
    }

    /// The distinguished generator x, when the field is a proper
    /// extension.
    pub fn generator(&self) -> Option<FieldElement> {
        match &self.kind {
            FieldKind::Rational => None,
            FieldKind::Extension { .. } => {
                Some(self.reduce(vec![BigRational::zero(), BigRational::one()]))
            }
        }
    }

    pub fn zero(&self) -> FieldElement {
        FieldElement { coeffs: Vec::new() }
    }

    pub fn one(&self) -> FieldElement {
        FieldElement {
            coeffs: vec![BigRational::one()],
        }
    }

    pub fn from_integer(&self, n: i64) -> FieldElement {
        self.from_rational(ratio(n, 1))
    }

    pub fn from_bigint(&self, n: BigInt) -> FieldElement {
        self.from_rational(BigRational::from_integer(n))
    }

    pub fn from_rational(&self, q: BigRational) -> FieldElement {
        FieldElement {
            coeffs: trim(vec![q]),
        }
    }

    /// Build an element from (numerator, denominator) coefficient pairs
    /// in ascending powers of the generator. Over the rationals only the
    /// constant coefficient may be nonzero.
    pub fn element_from_coeffs(&self, coeffs: &[(i64, i64)]) -> Result<FieldElement> {
        if matches!(self.kind, FieldKind::Rational)
            && coeffs.iter().skip(1).any(|&(n, _)| n != 0)
        {
            return Err(Error::InvalidFieldSpec(
                "generator powers have no meaning over the rationals".into(),
            ));
        }
        Ok(self.reduce(coeffs.iter().map(|&(n, d)| ratio(n, d)).collect()))
    }

    pub fn add(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        let n = a.coeffs.len().max(b.coeffs.len());
        let mut out = vec![BigRational::zero(); n];
        for (i, c) in a.coeffs.iter().enumerate() {
            out[i] += c;
        }
        for (i, c) in b.coeffs.iter().enumerate() {
            out[i] += c;
        }
        FieldElement { coeffs: trim(out) }
    }

    pub fn neg(&self, a: &FieldElement) -> FieldElement {
        FieldElement {
            coeffs: a.coeffs.iter().map(|c| -c).collect(),
        }
    }

    pub fn sub(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.add(a, &self.neg(b))
    }

    pub fn mul(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        if a.is_zero() || b.is_zero() {
            return self.zero();
        }
        let mut out = vec![BigRational::zero(); a.coeffs.len() + b.coeffs.len() - 1];
        for (i, ca) in a.coeffs.iter().enumerate() {
            for (j, cb) in b.coeffs.iter().enumerate() {
                out[i + j] += ca * cb;
            }
        }
        self.reduce(out)
    }

    /// Multiplicative inverse.
    ///
    /// Panics if `a` is zero, or if the defining polynomial turns out to
    /// be reducible and `a` shares a factor with it.
    pub fn inv(&self, a: &FieldElement) -> FieldElement {
        if a.is_zero() {
            panic!("division by zero field element");
        }
        match &self.kind {
            FieldKind::Rational => FieldElement {
                coeffs: vec![a.coeffs[0].recip()],
            },
            FieldKind::Extension { modulus, .. } => {
                // Extended Euclid in Q[x]: track u with u*a = gcd (mod f).
                let mut r0 = modulus.clone();
                let mut r1 = a.coeffs.clone();
                let mut t0: Vec<BigRational> = Vec::new();
                let mut t1 = vec![BigRational::one()];
                while !r1.is_empty() {
                    let (q, r) = poly_divmod(&r0, &r1);
                    let qt1 = poly_mul(&q, &t1);
                    let t = poly_sub(&t0, &qt1);
                    r0 = r1;
                    r1 = r;
                    t0 = t1;
                    t1 = t;
                }
                if r0.len() != 1 {
                    panic!(
                        "element is not invertible: defining polynomial is reducible"
                    );
                }
                let scale = r0[0].recip();
                self.reduce(t0.iter().map(|c| c * &scale).collect())
            }
        }
    }

    pub fn div(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        self.mul(a, &self.inv(b))
    }

    /// Reduce a raw coefficient vector modulo the defining polynomial.
    fn reduce(&self, coeffs: Vec<BigRational>) -> FieldElement {
        let coeffs = trim(coeffs);
        match &self.kind {
            FieldKind::Rational => FieldElement { coeffs },
            FieldKind::Extension { modulus, .. } => {
                if coeffs.len() < modulus.len() {
                    FieldElement { coeffs }
                } else {
                    let (_, r) = poly_divmod(&coeffs, modulus);
                    FieldElement { coeffs: r }
                }
            }
        }
    }

}

impl FieldElement {
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Coefficients in ascending powers of the generator.
    pub fn coefficients(&self) -> &[BigRational] {
        &self.coeffs
    }

    /// The element as a rational number, when it has degree zero.
    pub fn as_rational(&self) -> Option<BigRational> {
        match self.coeffs.len() {
            0 => Some(BigRational::zero()),
            1 => Some(self.coeffs[0].clone()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coeffs.is_empty() {
            return write!(f, "0");
        }
        let mut first = true;
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let mag = if c < &BigRational::zero() { -c } else { c.clone() };
            if first {
                if c < &BigRational::zero() {
                    write!(f, "-")?;
                }
                first = false;
            } else if c < &BigRational::zero() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            let unit_coeff = mag.is_one() && i > 0;
            if !unit_coeff {
                write!(f, "{}", mag)?;
            }
            match i {
                0 => {}
                1 => write!(f, "x")?,
                _ => write!(f, "x^{}", i)?,
            }
        }
        Ok(())
    }
}

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn trim(mut coeffs: Vec<BigRational>) -> Vec<BigRational> {
    while coeffs.last().is_some_and(|c| c.is_zero()) {
        let _ = coeffs.pop();
    }
    coeffs
}

fn poly_sub(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
    let n = a.len().max(b.len());
    let mut out = vec![BigRational::zero(); n];
    for (i, c) in a.iter().enumerate() {
        out[i] += c;
    }
    for (i, c) in b.iter().enumerate() {
        out[i] -= c;
    }
    trim(out)
}

fn poly_mul(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![BigRational::zero(); a.len() + b.len() - 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            out[i + j] += ca * cb;
        }
    }
    trim(out)
}

/// Polynomial division with remainder over the rationals. The divisor
/// must be nonzero.
fn poly_divmod(a: &[BigRational], b: &[BigRational]) -> (Vec<BigRational>, Vec<BigRational>) {
    assert!(!b.is_empty(), "polynomial division by zero");
    let mut rem: Vec<BigRational> = a.to_vec();
    if rem.len() < b.len() {
        return (Vec::new(), trim(rem));
    }
    let mut quot = vec![BigRational::zero(); rem.len() - b.len() + 1];
    let lead = b.last().expect("nonempty").clone();
    for k in (0..quot.len()).rev() {
        let c = &rem[k + b.len() - 1] / &lead;
        if c.is_zero() {
            continue;
        }
        quot[k] = c.clone();
        for (j, bc) in b.iter().enumerate() {
            let prod = &c * bc;
            rem[k + j] -= prod;
        }
    }
    (trim(quot), trim(rem))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maxs3_field() -> ExactField {
        // Q[x]/(x^2 + x - 1/2)
        FieldSpec::extension(&[(-1, 2), (1, 1), (1, 1)], 0.5)
            .resolve()
            .expect("valid spec")
    }

    #[test]
    fn rational_arithmetic() {
        let q = ExactField::rationals();
        let a = q.from_rational(ratio(3, 4));
        let b = q.from_integer(2);
        assert_eq!(q.add(&a, &b), q.from_rational(ratio(11, 4)));
        assert_eq!(q.mul(&a, &b), q.from_rational(ratio(3, 2)));
        assert_eq!(q.div(&b, &a), q.from_rational(ratio(8, 3)));
        assert!(q.sub(&a, &a).is_zero());
        assert!(q.generator().is_none());
    }

    #[test]
    fn generator_square_reduces() {
        let k = maxs3_field();
        let x = k.generator().expect("extension has a generator");
        // x^2 = 1/2 - x
        let expected = k.element_from_coeffs(&[(1, 2), (-1, 1)]).unwrap();
        assert_eq!(k.mul(&x, &x), expected);
    }

    #[test]
    fn extension_inverse() {
        let k = maxs3_field();
        let x = k.generator().unwrap();
        let one_minus_x = k.sub(&k.one(), &x);
        let inv = k.inv(&one_minus_x);
        // (1 - x)^-1 = 4/3 + 2/3 x
        assert_eq!(inv, k.element_from_coeffs(&[(4, 3), (2, 3)]).unwrap());
        assert_eq!(k.mul(&one_minus_x, &inv), k.one());
    }

    #[test]
    fn generator_powers_rejected_over_rationals() {
        let q = ExactField::rationals();
        assert!(q.element_from_coeffs(&[(0, 1), (1, 1)]).is_err());
        assert!(q.element_from_coeffs(&[(3, 4)]).is_ok());
    }

    #[test]
    fn degenerate_spec_rejected() {
        assert!(FieldSpec::extension(&[(1, 1)], 0.0).resolve().is_err());
        assert!(FieldSpec::extension(&[], 0.0).resolve().is_err());
    }

    #[test]
    fn display_reads_like_a_polynomial() {
        let k = maxs3_field();
        let e = k.element_from_coeffs(&[(-1, 2), (0, 1), (3, 1)]).unwrap();
        // reduced: 3x^2 = 3/2 - 3x, so e = 1 - 3x
        assert_eq!(format!("{}", e), "-3x + 1");
        assert_eq!(format!("{}", k.zero()), "0");
    }
}
