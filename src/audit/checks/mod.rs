//! Rule bodies, one module per category.

pub mod accessibility;
pub mod functionality;
pub mod security;
