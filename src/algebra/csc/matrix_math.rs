use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_n(self, y, x, a, b);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_t(self.src, y, x, a, b);
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn lscale(&mut self, l: &[T]) {
        assert_eq!(l.len(), self.m);
        for (val, row) in zip(&mut self.nzval, &self.rowval) {
            *val *= l[*row];
        }
    }

    fn rscale(&mut self, r: &[T]) {
        assert_eq!(r.len(), self.n);
        let colptr = &self.colptr;
        let vals = &mut self.nzval;
        for i in 0..r.len() {
            vals[colptr[i]..colptr[i + 1]].scale(r[i]);
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);

        for (col, &ri) in r.iter().enumerate() {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let vals = &mut self.nzval[first..last];
            let rows = &self.rowval[first..last];

            for (val, row) in zip(vals, rows) {
                *val *= l[*row] * ri;
            }
        }
    }

    fn row_norms_inf(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.set(T::zero());
        for (row, val) in zip(&self.rowval, &self.nzval) {
            norms[*row] = T::max(norms[*row], T::abs(*val));
        }
    }

    fn col_norms_inf(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        norms.set(T::zero());
        for (i, v) in norms.iter_mut().enumerate() {
            *v = self
                .nzval
                .iter()
                .take(self.colptr[i + 1])
                .skip(self.colptr[i])
                .fold(*v, |m, &nzval| T::max(m, T::abs(nzval)));
        }
    }

    fn row_sums_pow(&self, sums: &mut [T], p: T) {
        assert_eq!(sums.len(), self.m);
        sums.set(T::zero());
        for (row, val) in zip(&self.rowval, &self.nzval) {
            sums[*row] += T::powf(T::abs(*val), p);
        }
    }

    fn col_sums_pow(&self, sums: &mut [T], p: T) {
        assert_eq!(sums.len(), self.n);
        sums.set(T::zero());
        for (i, s) in sums.iter_mut().enumerate() {
            *s = self
                .nzval
                .iter()
                .take(self.colptr[i + 1])
                .skip(self.colptr[i])
                .fold(*s, |acc, &nzval| acc + T::powf(T::abs(nzval), p));
        }
    }
}

#[allow(non_snake_case)]
fn _csc_axpby_n<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //first do the b*y part
    if b == T::zero() {
        y.set(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    //y += a*A*x
    if a == T::one() {
        for (j, xj) in x.iter().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] += A.nzval[i] * *xj;
            }
        }
    } else if a == -T::one() {
        for (j, xj) in x.iter().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] -= A.nzval[i] * *xj;
            }
        }
    } else {
        for (j, xj) in x.iter().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] += a * A.nzval[i] * *xj;
            }
        }
    }
}

#[allow(non_snake_case)]
fn _csc_axpby_t<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //first do the b*y part
    if b == T::zero() {
        y.set(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());
    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    //y += a*A'*x
    if a == T::one() {
        for (j, yj) in y.iter_mut().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                *yj += A.nzval[i] * x[A.rowval[i]];
            }
        }
    } else if a == -T::one() {
        for (j, yj) in y.iter_mut().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                *yj -= A.nzval[i] * x[A.rowval[i]];
            }
        }
    } else {
        for (j, yj) in y.iter_mut().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                *yj += a * A.nzval[i] * x[A.rowval[i]];
            }
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn test_matrix() -> CscMatrix<f64> {
        // A = [1.  3.  5.]
        //     [2.  0.  6.]
        //     [0.  4.  7.]
        CscMatrix::new(
            3,
            3,
            vec![0, 2, 4, 7],
            vec![0, 1, 0, 2, 0, 1, 2],
            vec![1., 2., 3., 4., 5., 6., 7.],
        )
    }

    #[test]
    fn test_gemv() {
        let A = test_matrix();
        let x = vec![1., -2., 3.];
        let mut y = vec![1., 1., 1.];

        //y = 2*A*x + y
        A.gemv(&mut y, &x, 2.0, 1.0);
        assert_eq!(y, vec![21., 41., 27.]);
    }

    #[test]
    fn test_gemv_transpose() {
        let A = test_matrix();
        let x = vec![1., -2., 3.];
        let mut y = vec![0., 0., 0.];

        //y = A'*x
        A.t().gemv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, vec![-3., 15., 14.]);
    }

    #[test]
    fn test_lrscale() {
        let mut A = test_matrix();
        A.lrscale(&[1., 2., 3.], &[2., 1., 0.5]);
        assert_eq!(A.get(0, 0), 2.);
        assert_eq!(A.get(1, 0), 8.);
        assert_eq!(A.get(2, 1), 12.);
        assert_eq!(A.get(1, 2), 6.);
        assert_eq!(A.get(2, 2), 10.5);
    }

    #[test]
    fn test_norms() {
        let A = test_matrix();
        let mut rnorms = vec![0.; 3];
        let mut cnorms = vec![0.; 3];
        A.row_norms_inf(&mut rnorms);
        A.col_norms_inf(&mut cnorms);
        assert_eq!(rnorms, vec![5., 6., 7.]);
        assert_eq!(cnorms, vec![2., 4., 7.]);

        let mut rsums = vec![0.; 3];
        A.row_sums_pow(&mut rsums, 2.0);
        assert_eq!(rsums, vec![1. + 9. + 25., 4. + 36., 16. + 49.]);
    }
}
