pub mod guild;
pub mod member;
