use std::{
    fmt::Display,
    num::{NonZeroIsize, NonZeroUsize},
};

/// A boolean variable of the encoded formula.
///
/// A variable is represented by a non-null positive integer.
/// It can be obtained through the [From] trait from an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Variable(NonZeroUsize);

impl Variable {
    /// Returns the literal asserting this variable.
    pub fn positive(self) -> Literal {
        Literal::from(self.0.get() as isize)
    }

    /// Returns the literal negating this variable.
    pub fn negative(self) -> Literal {
        Literal::from(-(self.0.get() as isize))
    }
}

macro_rules! impl_var_from {
    ($t: ty) => {
        impl From<$t> for Variable {
            fn from(v: $t) -> Self {
                Self(NonZeroUsize::try_from(v as usize).unwrap())
            }
        }
    };
}
impl_var_from!(usize);
impl_var_from!(u64);
impl_var_from!(u32);

impl From<Variable> for usize {
    fn from(v: Variable) -> Self {
        v.0.into()
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal of the encoded formula.
///
/// A literal is represented by a non-null signed integer whose absolute
/// value is the underlying variable.
/// It can be obtained through the [From] trait from a signed integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal(NonZeroIsize);

impl Literal {
    /// Returns the negation of this literal.
    pub fn negate(self) -> Self {
        Self::from(-self.0.get())
    }

    /// Returns the variable this literal is built on.
    pub fn var(&self) -> Variable {
        Variable(self.0.unsigned_abs())
    }
}

macro_rules! impl_lit_from {
    ($t: ty) => {
        impl From<$t> for Literal {
            fn from(l: $t) -> Self {
                Self(NonZeroIsize::try_from(l as isize).unwrap())
            }
        }
    };
}
impl_lit_from!(isize);
impl_lit_from!(i64);
impl_lit_from!(i32);

impl From<Literal> for isize {
    fn from(l: Literal) -> Self {
        l.0.into()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a clause from a list of integers.
#[macro_export]
macro_rules! clause {
    () => (
        vec![] as Vec<$crate::cnf::Literal>
    );
    ($($x:expr),+ $(,)?) => (
        [$($x),+].into_iter().map($crate::cnf::Literal::from).collect::<Vec<$crate::cnf::Literal>>()
    );
}

pub(crate) use clause;
