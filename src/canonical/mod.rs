//! Canonical sparse-form export.
//!
//! Serializes a [`StandardFormProblem`](crate::problem::StandardFormProblem)
//! to a NumPy `.npz` archive: a flat mapping from field name to array,
//! readable by numeric environments that do not share the in-memory
//! sparse representation.  The constraint matrix is stored in triplet
//! (COO) form with 0-based indices and an explicit shape, since a
//! triplet list alone cannot recover trailing all-zero rows or columns.
//!
//! The field set is fixed: `A_row`, `A_col`, `A_data`, `A_shape`, `b`,
//! `c`, `lb`, `ub`, `row_scale_vec`, `col_scale_vec`, `n_eq`,
//! `const_term`.  Every field is array shaped; the scalar fields `n_eq`
//! and `const_term` are length-1 arrays.  Scaling vectors are always
//! present, defaulted to all-ones when the producer performed no
//! scaling, and a consumer recovers an unscaled solution via
//! `x = col_scale_vec .* x'` and `y = row_scale_vec .* y'`.

use crate::algebra::*;
use crate::problem::{DimensionError, StandardFormProblem};
use ndarray::Array1;
use ndarray_npy::{NpzWriter, WritableElement, WriteNpzError};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned by the canonical exporter.
pub enum ExportError {
    /// Problem data disagrees with its own shape
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    /// The destination could not be written
    #[error("could not write canonical file")]
    Io(#[from] io::Error),
    /// The archive encoder failed
    #[error("could not encode canonical file")]
    Npz(#[from] WriteNpzError),
}

/// Export `problem` as a canonical `.npz` archive at `destination`.
///
/// The write goes to a sibling temporary file which is renamed into
/// place on success, so no partial archive is ever observable at
/// `destination`.
pub fn export<T, P>(problem: &StandardFormProblem<T>, destination: P) -> Result<(), ExportError>
where
    T: FloatT + WritableElement,
    P: AsRef<Path>,
{
    // recheck every vector length against the matrix shape before
    // anything is written
    problem.validate()?;

    let dest = destination.as_ref();
    let file_name = dest.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination {} has no file name", dest.display()),
        )
    })?;
    let tmp = dest.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    match write_archive(problem, &tmp) {
        Ok(()) => {
            fs::rename(&tmp, dest)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn write_archive<T>(problem: &StandardFormProblem<T>, path: &Path) -> Result<(), ExportError>
where
    T: FloatT + WritableElement,
{
    let (m, n) = problem.constraint_matrix.size();
    let nnz = problem.constraint_matrix.nnz();

    //triplet (COO) encoding of the constraint matrix.  In-memory CSC
    //indices are already 0-based, which is what the interchange format
    //requires, so they are written verbatim.
    let mut a_row = Vec::with_capacity(nnz);
    let mut a_col = Vec::with_capacity(nnz);
    let mut a_data = Vec::with_capacity(nnz);
    for (r, c, v) in problem.constraint_matrix.triplets() {
        a_row.push(r as i64);
        a_col.push(c as i64);
        a_data.push(v);
    }

    let mut npz = NpzWriter::new(File::create(path)?);
    npz.add_array("A_row", &Array1::from(a_row))?;
    npz.add_array("A_col", &Array1::from(a_col))?;
    npz.add_array("A_data", &Array1::from(a_data))?;
    npz.add_array("A_shape", &Array1::from(vec![m as i64, n as i64]))?;
    npz.add_array("b", &Array1::from(problem.right_hand_side.clone()))?;
    npz.add_array("c", &Array1::from(problem.objective_vector.clone()))?;
    npz.add_array("lb", &Array1::from(problem.variable_lower_bound.clone()))?;
    npz.add_array("ub", &Array1::from(problem.variable_upper_bound.clone()))?;
    npz.add_array("row_scale_vec", &Array1::from(problem.row_scaling_or_ones()))?;
    npz.add_array("col_scale_vec", &Array1::from(problem.col_scaling_or_ones()))?;
    npz.add_array("n_eq", &Array1::from(vec![problem.num_equalities as i64]))?;
    npz.add_array("const_term", &Array1::from(vec![problem.objective_constant]))?;
    npz.finish()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::rescale_problem;
    use ndarray_npy::NpzReader;

    fn read_f64(npz: &mut NpzReader<File>, name: &str) -> Vec<f64> {
        let arr: Array1<f64> = npz.by_name(name).unwrap();
        arr.to_vec()
    }

    fn read_i64(npz: &mut NpzReader<File>, name: &str) -> Vec<i64> {
        let arr: Array1<i64> = npz.by_name(name).unwrap();
        arr.to_vec()
    }

    fn diag_problem() -> StandardFormProblem<f64> {
        // 2x2 matrix with nonzeros on the diagonal only
        let a = CscMatrix::from_triplets(2, 2, &[0, 1], &[0, 1], &[4.0, 7.0]);
        StandardFormProblem::new(
            vec![1.0, 2.0],
            0.5,
            a,
            vec![1.0, 2.0],
            vec![0.0, f64::NEG_INFINITY],
            vec![1.0, f64::INFINITY],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_export_diagonal_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.npz");

        export(&diag_problem(), &path).unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(read_i64(&mut npz, "A_row.npy"), vec![0, 1]);
        assert_eq!(read_i64(&mut npz, "A_col.npy"), vec![0, 1]);
        assert_eq!(read_f64(&mut npz, "A_data.npy"), vec![4.0, 7.0]);
        assert_eq!(read_i64(&mut npz, "A_shape.npy"), vec![2, 2]);
        assert_eq!(read_i64(&mut npz, "n_eq.npy"), vec![1]);
        assert_eq!(read_f64(&mut npz, "b.npy"), vec![1.0, 2.0]);
        assert_eq!(read_f64(&mut npz, "const_term.npy"), vec![0.5]);
    }

    #[test]
    fn test_export_shapes_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prob.npz");

        let problem = diag_problem();
        export(&problem, &path).unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        let shape = read_i64(&mut npz, "A_shape.npy");
        let (m, n) = (shape[0] as usize, shape[1] as usize);
        assert_eq!((m, n), (2, 2));

        assert_eq!(read_f64(&mut npz, "b.npy").len(), m);
        assert_eq!(read_f64(&mut npz, "c.npy").len(), n);
        assert_eq!(read_f64(&mut npz, "lb.npy").len(), n);
        assert_eq!(read_f64(&mut npz, "ub.npy").len(), n);

        //bounds written verbatim, infinities preserved
        assert_eq!(
            read_f64(&mut npz, "lb.npy"),
            vec![0.0, f64::NEG_INFINITY]
        );
        assert_eq!(read_f64(&mut npz, "ub.npy"), vec![1.0, f64::INFINITY]);

        //no scaling on the source problem: defaulted to all-ones of
        //correct length, not omitted
        assert_eq!(read_f64(&mut npz, "row_scale_vec.npy"), vec![1.0; m]);
        assert_eq!(read_f64(&mut npz, "col_scale_vec.npy"), vec![1.0; n]);
    }

    #[test]
    fn test_export_triplets_are_zero_based() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trip.npz");

        let a = CscMatrix::from_triplets(
            3,
            2,
            &[0, 2, 1, 2],
            &[0, 0, 1, 1],
            &[1.0, -2.0, 3.0, 4.0],
        );
        let problem = StandardFormProblem::new(
            vec![0.0, 0.0],
            0.0,
            a,
            vec![0.0; 3],
            vec![0.0; 2],
            vec![1.0; 2],
            0,
        )
        .unwrap();
        export(&problem, &path).unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        let rows = read_i64(&mut npz, "A_row.npy");
        let cols = read_i64(&mut npz, "A_col.npy");
        let vals = read_f64(&mut npz, "A_data.npy");

        assert!(rows.iter().all(|&r| r >= 0 && r < 3));
        assert!(cols.iter().all(|&c| c >= 0 && c < 2));
        for ((&r, &c), &v) in std::iter::zip(std::iter::zip(&rows, &cols), &vals) {
            assert_eq!(problem.constraint_matrix.get(r as usize, c as usize), v);
        }
        assert_eq!(vals.len(), problem.nnz());
    }

    #[test]
    fn test_export_carries_scaling_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaled.npz");

        let scaled = rescale_problem(&diag_problem(), 4, false, None);
        export(&scaled, &path).unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(
            read_f64(&mut npz, "row_scale_vec.npy"),
            scaled.row_scaling_vec.clone().unwrap()
        );
        assert_eq!(
            read_f64(&mut npz, "col_scale_vec.npy"),
            scaled.col_scaling_vec.clone().unwrap()
        );
    }

    #[test]
    fn test_export_rejects_inconsistent_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.npz");

        let mut problem = diag_problem();
        problem.right_hand_side.pop();
        assert!(matches!(
            export(&problem, &path),
            Err(ExportError::Dimension(_))
        ));
        //fail-before-write: nothing at the destination
        assert!(!path.exists());
    }

    #[test]
    fn test_export_unwritable_destination() {
        let missing = Path::new("/nonexistent-dir/out.npz");
        assert!(matches!(
            export(&diag_problem(), missing),
            Err(ExportError::Io(_))
        ));
    }
}
