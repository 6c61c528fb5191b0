pub mod image;
pub mod llm;
pub mod quota;
pub mod store;
pub mod tools;
pub mod twitter;
