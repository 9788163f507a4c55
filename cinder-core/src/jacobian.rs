/// Column-major mutable view over an engine-owned Jacobian matrix.
///
/// Engine implementations wrap their native dense or band-packed storage in
/// this view before handing it to the model, so the model can write entries
/// without knowing the storage layout. For band-packed storage, `rows` is
/// the column stride of the packed representation and the engine is
/// responsible for presenting column slices that map `(row, col)` writes to
/// the right packed locations.
#[derive(Debug)]
pub struct JacobianMatrix<'a> {
    data: &'a mut [f64],
    rows: usize,
    cols: usize,
}

impl<'a> JacobianMatrix<'a> {
    /// Wraps column-major storage with the given dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn new(data: &'a mut [f64], rows: usize, cols: usize) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "storage length must equal rows * cols"
        );
        Self { data, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Mutable access to one column.
    pub fn col_mut(&mut self, col: usize) -> &mut [f64] {
        let start = col * self.rows;
        &mut self.data[start..start + self.rows]
    }

    /// Writes a single entry.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[col * self.rows + row] = value;
    }

    /// Accumulates into a single entry.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[col * self.rows + row] += value;
    }

    /// Zeroes the full matrix.
    pub fn fill_zero(&mut self) {
        self.data.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_land_in_column_major_order() {
        let mut storage = vec![0.0; 6];
        let mut jac = JacobianMatrix::new(&mut storage, 2, 3);
        jac.set(0, 0, 1.0);
        jac.set(1, 2, 5.0);
        jac.add(1, 2, 1.0);
        assert_eq!(storage, vec![1.0, 0.0, 0.0, 0.0, 0.0, 6.0]);
    }

    #[test]
    fn col_mut_exposes_one_column() {
        let mut storage = vec![0.0; 6];
        let mut jac = JacobianMatrix::new(&mut storage, 3, 2);
        jac.col_mut(1).copy_from_slice(&[7.0, 8.0, 9.0]);
        assert_eq!(storage[3..], [7.0, 8.0, 9.0]);
    }

    #[test]
    #[should_panic(expected = "storage length")]
    fn rejects_mismatched_storage() {
        let mut storage = vec![0.0; 5];
        let _ = JacobianMatrix::new(&mut storage, 2, 3);
    }
}
