//! Domains module containing business logic organized by bounded contexts.
//!
//! Only the tools context exists today: the server advertises tools and
//! nothing else.

pub mod tools;
