//! The abstract construction surface and the table-driven ad hoc
//! constructions.

use crate::error::{Error, Result};
use crate::field::{ExactField, FieldElement, FieldSpec};
use crate::linear_system::Matrix;
use crate::structure::Structure;

/// A candidate extremal construction.
///
/// A construction that does not provide a capability returns `Ok(None)`
/// ("unknown"); callers treat that as "try another construction", not as
/// an error. Errors are reserved for configuration problems and oracle
/// failures.
pub trait Construction<S: Structure> {
    /// The coefficient field all produced matrices live over.
    fn field(&self) -> &ExactField;

    /// Limiting densities of the canonical sub-structures of size `n`.
    fn subgraph_densities(&self, n: usize) -> Result<Option<Vec<(S, FieldElement)>>> {
        let _ = n;
        Ok(None)
    }

    /// The bound this construction is conjectured to attain, with the
    /// indices of the sub-structures supporting it.
    fn target_bound(&self) -> Option<(FieldElement, Vec<usize>)> {
        None
    }

    /// Basis of linear relations forced on the densities of `flags`
    /// (all rooted at `type_graph`), as a rank-truncated reduced
    /// row-echelon matrix.
    fn zero_eigenvectors(&self, type_graph: &S, flags: &[S]) -> Result<Option<Matrix>> {
        let _ = (type_graph, flags);
        Ok(None)
    }
}

/// Polynomial in the field generator, as (numerator, denominator)
/// coefficient pairs in ascending powers.
type Poly = &'static [(i64, i64)];

const Z: Poly = &[];
const ONE: Poly = &[(1, 1)];
const NEG_ONE: Poly = &[(-1, 1)];
const X: Poly = &[(0, 1), (1, 1)];
const X_SQ: Poly = &[(0, 1), (0, 1), (1, 1)];
const ONE_MINUS_X: Poly = &[(1, 1), (-1, 1)];
const X_MINUS_X_SQ: Poly = &[(0, 1), (1, 1), (-1, 1)];

#[derive(Debug)]
enum FieldDesc {
    Rational,
    Extension { poly: Poly, embedding: f64 },
}

#[derive(Debug)]
struct BoundDesc {
    value: Poly,
    support: &'static [usize],
}

#[derive(Debug)]
struct TypeRows {
    type_label: &'static str,
    rows: &'static [&'static [Poly]],
}

#[derive(Debug)]
struct AdHocEntry {
    name: &'static str,
    field: FieldDesc,
    bound: Option<BoundDesc>,
    eigenvectors: &'static [TypeRows],
}

/// The closed table of named constructions with hand-derived data.
static REGISTRY: &[AdHocEntry] = &[
    AdHocEntry {
        name: "maxs3",
        // Q[x]/(x^2 + x - 1/2), root near 0.5
        field: FieldDesc::Extension {
            poly: &[(-1, 2), (1, 1), (1, 1)],
            embedding: 0.5,
        },
        bound: Some(BoundDesc {
            value: &[(-1, 1), (4, 1)], // 4x - 1
            support: &[0, 2, 4, 5],
        }),
        eigenvectors: &[TypeRows {
            type_label: "1:",
            rows: &[
                &[ONE_MINUS_X, Z, X],
                &[X_MINUS_X_SQ, ONE_MINUS_X, X_SQ],
            ],
        }],
    },
    AdHocEntry {
        name: "maxs4",
        // Q[x]/(x^3 + x^2 + x - 1/3), root near 0.5
        field: FieldDesc::Extension {
            poly: &[(-1, 3), (1, 1), (1, 1), (1, 1)],
            embedding: 0.5,
        },
        bound: Some(BoundDesc {
            value: &[(1, 1), (0, 1), (-9, 1)], // 1 - 9x^2
            support: &[0, 5, 8, 24, 27, 31, 37, 38],
        }),
        eigenvectors: &[
            TypeRows {
                type_label: "2:",
                rows: &[
                    &[ONE_MINUS_X, Z, Z, Z, Z, Z, Z, Z, X],
                    &[X_MINUS_X_SQ, Z, Z, Z, Z, ONE_MINUS_X, Z, Z, X_SQ],
                ],
            },
            TypeRows {
                type_label: "2:12",
                rows: &[
                    &[Z, ONE_MINUS_X, Z, Z, Z, Z, Z, Z, X],
                    &[Z, Z, Z, Z, ONE, Z, Z, Z, NEG_ONE],
                    &[Z, Z, Z, Z, Z, ONE, Z, Z, Z],
                    &[Z, Z, Z, Z, Z, Z, ONE, Z, NEG_ONE],
                ],
            },
        ],
    },
    AdHocEntry {
        name: "maxs5",
        // Q[x]/(x^4 + x^3 + x^2 + x - 1/4), root near 0.5; field-only
        // entry, no hand-derived bound or eigenvector data.
        field: FieldDesc::Extension {
            poly: &[(-1, 4), (1, 1), (1, 1), (1, 1), (1, 1)],
            embedding: 0.5,
        },
        bound: None,
        eigenvectors: &[],
    },
    AdHocEntry {
        name: "max42",
        field: FieldDesc::Rational,
        bound: Some(BoundDesc {
            value: &[(3, 4)],
            support: &[0, 4, 8, 23, 24, 27, 33],
        }),
        eigenvectors: &[
            TypeRows {
                type_label: "3:",
                rows: &[&[ONE, Z, Z, Z, ONE, ONE, ONE, Z]],
            },
            TypeRows {
                type_label: "3:123",
                rows: &[&[Z, ONE, ONE, ONE, Z, Z, Z, ONE]],
            },
        ],
    },
];

/// A named construction backed by the static registry: no enumeration,
/// just lookup and echelon reduction of literal row data.
#[derive(Debug)]
pub struct AdHocConstruction {
    entry: &'static AdHocEntry,
    field: ExactField,
}

impl AdHocConstruction {
    /// Look up a named construction. Unknown names fail here, at
    /// construction time.
    pub fn new(name: &str) -> Result<Self> {
        let entry = REGISTRY
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::UnknownConstruction(name.to_string()))?;
        let field = match &entry.field {
            FieldDesc::Rational => ExactField::rationals(),
            FieldDesc::Extension { poly, embedding } => {
                FieldSpec::extension(poly, *embedding).resolve()?
            }
        };
        Ok(Self { entry, field })
    }

    pub fn name(&self) -> &'static str {
        self.entry.name
    }
}

impl<S: Structure> Construction<S> for AdHocConstruction {
    fn field(&self) -> &ExactField {
        &self.field
    }

    fn target_bound(&self) -> Option<(FieldElement, Vec<usize>)> {
        self.entry.bound.as_ref().map(|b| {
            let value = self
                .field
                .element_from_coeffs(b.value)
                .expect("registry bound data matches its field");
            (value, b.support.to_vec())
        })
    }

    fn zero_eigenvectors(&self, type_graph: &S, flags: &[S]) -> Result<Option<Matrix>> {
        let label = type_graph.canonical().label();
        let table = self
            .entry
            .eigenvectors
            .iter()
            .find(|t| t.type_label == label);
        let matrix = match table {
            None => Matrix::empty(self.field.clone(), flags.len()),
            Some(table) => {
                let rows: Vec<Vec<FieldElement>> = table
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|poly| self.field.element_from_coeffs(poly))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?;
                let ncols = rows.first().map_or(flags.len(), Vec::len);
                Matrix::from_rows(self.field.clone(), ncols, rows).reduced_row_echelon_form()
            }
        };
        Ok(Some(matrix))
    }
}
