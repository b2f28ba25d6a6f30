//! The CNF building blocks: variables, literals, the variable registry and
//! the clause buffer producing the final DIMACS document.

mod formula_buffer;
pub use formula_buffer::FormulaBuffer;

mod literal;
pub(crate) use literal::clause;
pub use literal::Literal;
pub use literal::Variable;

mod variable_registry;
pub use variable_registry::VarKey;
pub use variable_registry::VariableRegistry;
