use crate::field::{ExactField, FieldElement};

/// Dense matrix over an [`ExactField`].
///
/// The column count is stored explicitly so that a matrix with zero rows
/// (a valid "no relations found" result) still knows its width.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    field: ExactField,
    ncols: usize,
    rows: Vec<Vec<FieldElement>>,
}

impl Matrix {
    /// Create a matrix from rows. Every row must have `ncols` entries.
    pub fn from_rows(field: ExactField, ncols: usize, rows: Vec<Vec<FieldElement>>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), ncols, "ragged matrix row");
        }
        Self { field, ncols, rows }
    }

    /// A matrix with zero rows and the given width.
    pub fn empty(field: ExactField, ncols: usize) -> Self {
        Self {
            field,
            ncols,
            rows: Vec::new(),
        }
    }

    pub fn field(&self) -> &ExactField {
        &self.field
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn row(&self, i: usize) -> &[FieldElement] {
        &self.rows[i]
    }

    pub fn rows(&self) -> &[Vec<FieldElement>] {
        &self.rows
    }

    /// Reduced row echelon form, truncated to its rank: pivot entries are
    /// 1, pivot columns are cleared elsewhere, and zero rows are dropped,
    /// so the result's row count equals its rank. Idempotent.
    pub fn reduced_row_echelon_form(&self) -> Matrix {
        let field = &self.field;
        let mut a = self.rows.clone();
        let n_rows = a.len();
        let mut row = 0usize;
        for col in 0..self.ncols {
            if row >= n_rows {
                break;
            }
            // Find a nonzero pivot in rows[row..].
            let Some(sel) = (row..n_rows).find(|&r| !a[r][col].is_zero()) else {
                continue;
            };
            a.swap(row, sel);
            // Scale the pivot row to a leading 1.
            let pivot = a[row][col].clone();
            for c in col..self.ncols {
                a[row][c] = field.div(&a[row][c], &pivot);
            }
            // Clear the pivot column everywhere else.
            for r in 0..n_rows {
                if r == row || a[r][col].is_zero() {
                    continue;
                }
                let factor = a[r][col].clone();
                for c in col..self.ncols {
                    let scaled = field.mul(&factor, &a[row][c]);
                    a[r][c] = field.sub(&a[r][c], &scaled);
                }
            }
            row += 1;
        }
        a.truncate(row);
        Matrix {
            field: self.field.clone(),
            ncols: self.ncols,
            rows: a,
        }
    }

    /// Rank of the matrix.
    pub fn rank(&self) -> usize {
        self.reduced_row_echelon_form().nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;

    fn q() -> ExactField {
        ExactField::rationals()
    }

    fn qmat(rows: &[&[i64]]) -> Matrix {
        let field = q();
        let rows: Vec<Vec<FieldElement>> = rows
            .iter()
            .map(|r| r.iter().map(|&v| field.from_integer(v)).collect())
            .collect();
        let ncols = rows.first().map_or(0, |r| r.len());
        Matrix::from_rows(field, ncols, rows)
    }

    #[test]
    fn echelon_of_dependent_rows() {
        let m = qmat(&[&[1, 2, 3], &[2, 4, 6], &[0, 1, 1]]);
        let e = m.reduced_row_echelon_form();
        assert_eq!(e.nrows(), 2);
        assert_eq!(e, qmat(&[&[1, 0, 1], &[0, 1, 1]]));
    }

    #[test]
    fn echelon_is_idempotent() {
        let m = qmat(&[&[0, 2, 4], &[3, 3, 3], &[1, 1, 1]]);
        let e = m.reduced_row_echelon_form();
        assert_eq!(e.reduced_row_echelon_form(), e);
    }

    #[test]
    fn zero_rows_are_dropped() {
        let m = qmat(&[&[0, 0], &[0, 0]]);
        let e = m.reduced_row_echelon_form();
        assert_eq!(e.nrows(), 0);
        assert_eq!(e.ncols(), 2);
        assert_eq!(m.rank(), 0);
    }

    #[test]
    fn empty_matrix_keeps_width() {
        let m = Matrix::empty(q(), 7);
        assert_eq!(m.nrows(), 0);
        assert_eq!(m.ncols(), 7);
        assert_eq!(m.reduced_row_echelon_form(), m);
    }

    #[test]
    fn echelon_over_an_extension() {
        // Q[x]/(x^2 + x - 1/2)
        let k = FieldSpec::extension(&[(-1, 2), (1, 1), (1, 1)], 0.5)
            .resolve()
            .unwrap();
        let x = k.generator().unwrap();
        let one = k.one();
        let row = vec![k.sub(&one, &x), k.zero(), x.clone()];
        let m = Matrix::from_rows(k.clone(), 3, vec![row]);
        let e = m.reduced_row_echelon_form();
        assert_eq!(e.nrows(), 1);
        assert_eq!(e.row(0)[0], one);
        // x / (1 - x) = (1 + 2x)/3
        assert_eq!(
            e.row(0)[2],
            k.element_from_coeffs(&[(1, 3), (2, 3)]).unwrap()
        );
    }
}
