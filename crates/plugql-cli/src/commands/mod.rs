pub mod inspect;
pub mod schema;
