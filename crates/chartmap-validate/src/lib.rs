#![deny(unsafe_code)]

pub mod validator;

pub use validator::{MappingValidator, TypeMismatch, UnknownPlaceholder, ValidationReport};
