use super::Literal;

const DEFAULT_BUFFER_CAP: usize = 1 << 20;

/// An accumulator for the clauses and comments of a CNF document.
///
/// Clauses are appended in DIMACS text form (the trailing `0` is added by
/// the buffer itself) together with optional non-semantic `c` comment lines.
/// The `p cnf` header can only be produced once all emission is done, since
/// the clause and variable totals are not known in advance; it is prepended
/// by [`into_dimacs`](Self::into_dimacs).
pub struct FormulaBuffer {
    body: String,
    n_clauses: usize,
    with_comments: bool,
}

impl FormulaBuffer {
    /// Builds a new, empty buffer.
    ///
    /// If `with_comments` is `false`, all [`comment`](Self::comment) calls
    /// are no-ops, reducing the output size with no semantic change.
    pub fn new(with_comments: bool) -> Self {
        Self {
            body: String::with_capacity(DEFAULT_BUFFER_CAP),
            n_clauses: 0,
            with_comments,
        }
    }

    /// Appends one clause, given as the disjunction of its literals.
    ///
    /// # Panics
    ///
    /// Panics if the literal list is empty; the encoders never build empty
    /// disjunctions, so an empty clause indicates a bug upstream.
    pub fn add_clause(&mut self, literals: Vec<Literal>) {
        if literals.is_empty() {
            panic!("cannot append an empty clause");
        }
        for l in &literals {
            self.body.push_str(&format!("{} ", l));
        }
        self.body.push('0');
        self.body.push('\n');
        self.n_clauses += 1;
    }

    /// Appends a comment line, unless comments are disabled.
    pub fn comment(&mut self, text: &str) {
        if self.with_comments {
            self.body.push_str("c ");
            self.body.push_str(text);
            self.body.push('\n');
        }
    }

    /// Returns the number of clauses appended so far.
    pub fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    /// Consumes the buffer, returning the full DIMACS document.
    ///
    /// `n_vars` must be the highest variable id ever declared (not
    /// necessarily referenced by a clause); it is written as-is in the
    /// header.
    pub fn into_dimacs(self, n_vars: usize) -> String {
        let mut document = format!("p cnf {} {}\n", n_vars, self.n_clauses);
        document.push_str(&self.body);
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::clause;

    #[test]
    fn test_header_and_body() {
        let mut buffer = FormulaBuffer::new(true);
        buffer.add_clause(clause![1, 2]);
        buffer.add_clause(clause![-1, -2]);
        assert_eq!(2, buffer.n_clauses());
        assert_eq!("p cnf 2 2\n1 2 0\n-1 -2 0\n", buffer.into_dimacs(2));
    }

    #[test]
    fn test_comments_enabled() {
        let mut buffer = FormulaBuffer::new(true);
        buffer.comment("a note");
        buffer.add_clause(clause![1]);
        assert_eq!("p cnf 1 1\nc a note\n1 0\n", buffer.into_dimacs(1));
    }

    #[test]
    fn test_comments_disabled() {
        let mut buffer = FormulaBuffer::new(false);
        buffer.comment("a note");
        buffer.add_clause(clause![1]);
        assert_eq!("p cnf 1 1\n1 0\n", buffer.into_dimacs(1));
    }

    #[test]
    fn test_header_counts_declared_not_referenced() {
        let mut buffer = FormulaBuffer::new(false);
        buffer.add_clause(clause![1]);
        assert_eq!("p cnf 5 1\n1 0\n", buffer.into_dimacs(5));
    }

    #[test]
    #[should_panic(expected = "empty clause")]
    fn test_empty_clause() {
        let mut buffer = FormulaBuffer::new(true);
        buffer.add_clause(clause![]);
    }

    #[test]
    fn test_comments_do_not_count_as_clauses() {
        let mut buffer = FormulaBuffer::new(true);
        buffer.comment("one");
        buffer.comment("two");
        assert_eq!(0, buffer.n_clauses());
    }
}
