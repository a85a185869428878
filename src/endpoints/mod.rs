pub mod kind;
pub mod url;
