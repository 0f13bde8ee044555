use crate::problem::{DimensionError, StandardFormProblem};
use crate::algebra::CscMatrix;
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{self, BufRead},
    path::Path,
};
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned by the MPS reader.  Malformed input is fatal;
/// there is no partial recovery.
pub enum ParseError {
    /// An I/O failure while reading the source file
    #[error("could not read source file")]
    Io(#[from] io::Error),
    /// A syntax or format violation, with its source line number
    #[error("line {line}: {msg}")]
    Syntax { line: usize, msg: String },
    /// The parsed data violates a standard form invariant
    #[error(transparent)]
    Invalid(#[from] DimensionError),
}

/// Capability interface for producers of standard form problems.
///
/// The orchestration layer is written against this trait so that it can
/// be exercised with fake readers in tests.
pub trait StandardFormSource<T> {
    /// Read and canonicalize the LP at `source`.
    fn read_standard_form(&self, source: &Path) -> Result<StandardFormProblem<T>, ParseError>;
}

/// Reader for linear programs in (free) MPS format.
///
/// Lines are tokenized on whitespace, not on column position.  Because
/// MPS has no way to state an optimization direction, problems are read
/// as minimizations.
///
/// Canonicalization follows the standard form conventions: equality
/// rows are emitted first, `L` rows are negated into `>=` form, and
/// `RANGES` entries split a row into a pair of inequalities.
pub struct MpsReader;

impl StandardFormSource<f64> for MpsReader {
    fn read_standard_form(&self, source: &Path) -> Result<StandardFormProblem<f64>, ParseError> {
        MpsReader::read_path(source)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Eq,
    Le,
    Ge,
}

struct RowData {
    kind: RowKind,
    coeffs: Vec<(usize, f64)>,
    rhs: f64,
    range: f64,
}

#[derive(Default)]
struct ColData {
    obj_coeff: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl MpsReader {
    /// Read a standard form problem from the MPS file at `path`.
    pub fn read_path(path: &Path) -> Result<StandardFormProblem<f64>, ParseError> {
        let file = File::open(path)?;
        Self::parse(io::BufReader::new(file))
    }

    /// Parse a standard form problem from MPS text.
    ///
    /// Format descriptions:
    /// Introduction: <http://lpsolve.sourceforge.net/5.5/mps-format.htm>
    pub fn parse<R: BufRead>(input: R) -> Result<StandardFormProblem<f64>, ParseError> {
        let mut lines = Lines {
            input,
            cur: String::new(),
            idx: 0,
        };

        {
            lines.to_next()?;
            let mut tokens = Tokens::new(&lines);
            if tokens.next()? != "NAME" {
                return Err(lines.err("expected NAME section"));
            }
            // the problem name itself is not retained
        }

        let mut obj_name = None;
        let mut free_rows = HashSet::new();
        let mut rows: Vec<RowData> = vec![];
        let mut row_index = HashMap::new();
        {
            lines.to_next()?;
            if lines.cur != "ROWS" {
                return Err(lines.err("expected ROWS section"));
            }

            loop {
                lines.to_next()?;
                if !lines.cur.starts_with(' ') {
                    break;
                }

                let mut tokens = Tokens::new(&lines);
                let row_type = tokens.next()?;
                let name = tokens.next()?;
                let kind = match row_type {
                    "N" => {
                        if obj_name.is_none() {
                            obj_name = Some(name.to_owned());
                        } else {
                            free_rows.insert(name.to_owned());
                        }
                        continue;
                    }
                    "L" => RowKind::Le,
                    "G" => RowKind::Ge,
                    "E" => RowKind::Eq,
                    _ => return Err(lines.err(&format!("unexpected row type {}", row_type))),
                };

                if row_index.insert(name.to_owned(), rows.len()).is_some() {
                    return Err(lines.err(&format!("row {} already declared", name)));
                }

                rows.push(RowData {
                    kind,
                    coeffs: vec![],
                    rhs: 0.0,
                    range: 0.0,
                });
            }
        }

        let obj_name = match obj_name {
            Some(name) => name,
            None => return Err(lines.err("objective row not declared")),
        };

        let mut cols: Vec<ColData> = vec![];
        let mut col_index = HashMap::new();
        {
            if lines.cur != "COLUMNS" {
                return Err(lines.err("expected COLUMNS section"));
            }

            loop {
                lines.to_next()?;
                if !lines.cur.starts_with(' ') {
                    break;
                }
                if lines.cur.contains("'MARKER'") {
                    return Err(lines.err("integer markers are not supported"));
                }

                let mut tokens = Tokens::new(&lines);
                let name = tokens.next()?;

                let var = match col_index.get(name) {
                    Some(&j) => j,
                    None => {
                        col_index.insert(name.to_owned(), cols.len());
                        cols.push(ColData::default());
                        cols.len() - 1
                    }
                };

                for (key, val) in KVPairs::parse(&mut tokens)?.iter() {
                    if key == obj_name {
                        cols[var].obj_coeff = val;
                    } else if let Some(&idx) = row_index.get(key) {
                        rows[idx].coeffs.push((var, val));
                    } else if free_rows.get(key).is_none() {
                        return Err(lines.err(&format!("unknown row: {}", key)));
                    }
                }
            }
        }

        let mut obj_constant = 0.0;
        {
            if lines.cur != "RHS" {
                return Err(lines.err("expected RHS section"));
            }

            let mut cur_vec_name = None;
            loop {
                lines.to_next()?;
                if !lines.cur.starts_with(' ') {
                    break;
                }

                let mut tokens = Tokens::new(&lines);
                let vec_name = tokens.next()?;

                if cur_vec_name.is_none() {
                    cur_vec_name = Some(vec_name.to_owned());
                } else if cur_vec_name.as_deref() != Some(vec_name) {
                    // use only the first RHS vector
                    continue;
                }

                for (key, val) in KVPairs::parse(&mut tokens)?.iter() {
                    if key == obj_name {
                        // an RHS entry on the objective row supplies the
                        // (negated) objective constant
                        obj_constant = -val;
                    } else if let Some(&idx) = row_index.get(key) {
                        rows[idx].rhs = val;
                    } else {
                        return Err(lines.err(&format!("unknown row: {}", key)));
                    }
                }
            }
        }

        if lines.cur == "RANGES" {
            let mut cur_vec_name = None;
            loop {
                lines.to_next()?;
                if !lines.cur.starts_with(' ') {
                    break;
                }

                let mut tokens = Tokens::new(&lines);

                let vec_name = tokens.next()?;
                if cur_vec_name.is_none() {
                    cur_vec_name = Some(vec_name.to_owned());
                } else if cur_vec_name.as_deref() != Some(vec_name) {
                    // use only the first RANGES vector
                    continue;
                }

                for (key, val) in KVPairs::parse(&mut tokens)?.iter() {
                    if let Some(&idx) = row_index.get(key) {
                        rows[idx].range = val;
                    } else {
                        return Err(lines.err(&format!("unknown row: {}", key)));
                    }
                }
            }
        }

        if lines.cur == "BOUNDS" {
            let mut cur_vec_name = None;
            loop {
                lines.to_next()?;
                if !lines.cur.starts_with(' ') {
                    break;
                }

                let mut tokens = Tokens::new(&lines);

                let bound_type = tokens.next()?;

                let vec_name = tokens.next()?;
                if cur_vec_name.is_none() {
                    cur_vec_name = Some(vec_name.to_owned());
                } else if cur_vec_name.as_deref() != Some(vec_name) {
                    // use only the first BOUNDS vector
                    continue;
                }

                let var_name = tokens.next()?;
                let var = match col_index.get(var_name) {
                    Some(&j) => j,
                    None => return Err(lines.err(&format!("unknown variable: {}", var_name))),
                };
                let col = &mut cols[var];

                match bound_type {
                    "FR" => {
                        col.min = Some(f64::NEG_INFINITY);
                        col.max = Some(f64::INFINITY);
                    }
                    "MI" => col.min = Some(f64::NEG_INFINITY),
                    "PL" => col.max = Some(f64::INFINITY),
                    "LO" | "UP" | "FX" => {
                        let val = parse_f64(tokens.next()?, lines.idx)?;
                        match bound_type {
                            "LO" => col.min = Some(val),
                            "UP" => col.max = Some(val),
                            _ => {
                                col.min = Some(val);
                                col.max = Some(val);
                            }
                        }
                    }
                    _ => {
                        return Err(
                            lines.err(&format!("bound type {} is not supported", bound_type))
                        );
                    }
                }
            }
        }

        if lines.cur != "ENDATA" {
            return Err(lines.err("expected ENDATA section"));
        }

        assemble(rows, cols, obj_constant)
    }
}

// Assemble parsed row and column data into standard form: equality rows
// first, every inequality normalized to `a'x >= b`, ranged rows split
// into a pair of inequalities.
fn assemble(
    rows: Vec<RowData>,
    cols: Vec<ColData>,
    obj_constant: f64,
) -> Result<StandardFormProblem<f64>, ParseError> {
    let n = cols.len();

    let mut c = Vec::with_capacity(n);
    let mut lb = Vec::with_capacity(n);
    let mut ub = Vec::with_capacity(n);
    for col in &cols {
        let (min, max) = match (col.min, col.max) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, f64::INFINITY),
            (None, Some(max)) if max < 0.0 => (f64::NEG_INFINITY, max),
            (None, Some(max)) => (0.0, max),
            (None, None) => (0.0, f64::INFINITY),
        };
        c.push(col.obj_coeff);
        lb.push(min);
        ub.push(max);
    }

    let mut tri_row = Vec::new();
    let mut tri_col = Vec::new();
    let mut tri_val = Vec::new();
    let mut b = Vec::new();

    let mut emit = |coeffs: &[(usize, f64)], rhs: f64, negate: bool, b: &mut Vec<f64>| {
        let sign = if negate { -1.0 } else { 1.0 };
        for &(var, val) in coeffs {
            tri_row.push(b.len());
            tri_col.push(var);
            tri_val.push(sign * val);
        }
        b.push(sign * rhs);
    };

    //equality rows come first
    for row in &rows {
        if row.kind == RowKind::Eq && row.range == 0.0 {
            emit(&row.coeffs, row.rhs, false, &mut b);
        }
    }
    let num_equalities = b.len();

    //inequality rows, normalized to >=
    for row in &rows {
        match row.kind {
            RowKind::Eq if row.range == 0.0 => {}
            _ if row.range == 0.0 => {
                emit(&row.coeffs, row.rhs, row.kind == RowKind::Le, &mut b);
            }
            _ => {
                //a ranged row constrains its activity to an interval
                let (min, max) = match row.kind {
                    RowKind::Ge => (row.rhs, row.rhs + row.range.abs()),
                    RowKind::Le => (row.rhs - row.range.abs(), row.rhs),
                    RowKind::Eq if row.range > 0.0 => (row.rhs, row.rhs + row.range),
                    RowKind::Eq => (row.rhs + row.range, row.rhs),
                };
                emit(&row.coeffs, min, false, &mut b);
                emit(&row.coeffs, max, true, &mut b);
            }
        }
    }

    let m = b.len();
    let matrix = CscMatrix::from_triplets(m, n, &tri_row, &tri_col, &tri_val);

    Ok(StandardFormProblem::new(
        c,
        obj_constant,
        matrix,
        b,
        lb,
        ub,
        num_equalities,
    )?)
}

struct Lines<R: io::BufRead> {
    input: R,
    cur: String,
    idx: usize,
}

impl<R: io::BufRead> Lines<R> {
    fn to_next(&mut self) -> Result<(), ParseError> {
        loop {
            self.idx += 1;
            self.cur.clear();
            self.input.read_line(&mut self.cur)?;
            if self.cur.is_empty() {
                return Ok(());
            }

            if self.cur.starts_with('*') {
                continue;
            }

            let len = self.cur.trim_end().len();
            if len != 0 {
                self.cur.truncate(len);
                return Ok(());
            }
        }
    }

    fn err(&self, msg: &str) -> ParseError {
        ParseError::Syntax {
            line: self.idx,
            msg: msg.to_owned(),
        }
    }
}

struct Tokens<'a> {
    line_idx: usize,
    iter: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new<R: io::BufRead>(lines: &'a Lines<R>) -> Self {
        Self {
            line_idx: lines.idx,
            iter: lines.cur.split_whitespace(),
        }
    }

    fn next(&mut self) -> Result<&'a str, ParseError> {
        self.iter.next().ok_or(ParseError::Syntax {
            line: self.line_idx,
            msg: "unexpected end of line".to_owned(),
        })
    }
}

fn parse_f64(input: &str, line_idx: usize) -> Result<f64, ParseError> {
    input.parse().map_err(|_| ParseError::Syntax {
        line: line_idx,
        msg: format!("couldn't parse float from string: `{}`", input),
    })
}

struct KVPairs<'a> {
    // MPS allows one or two key-value pairs per line.
    first: (&'a str, f64),
    second: Option<(&'a str, f64)>,
}

impl<'a> KVPairs<'a> {
    fn parse(tokens: &mut Tokens<'a>) -> Result<Self, ParseError> {
        let first_key = tokens.next()?;
        let first_val = parse_f64(tokens.next()?, tokens.line_idx)?;

        let second_key = match tokens.iter.next() {
            Some(key) => key,
            None => {
                return Ok(KVPairs {
                    first: (first_key, first_val),
                    second: None,
                });
            }
        };
        let second_val = parse_f64(tokens.next()?, tokens.line_idx)?;
        Ok(KVPairs {
            first: (first_key, first_val),
            second: Some((second_key, second_val)),
        })
    }

    fn iter(self) -> impl Iterator<Item = (&'a str, f64)> {
        std::iter::once(self.first).chain(self.second)
    }
}
