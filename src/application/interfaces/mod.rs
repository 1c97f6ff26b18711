mod parser_service;

pub use parser_service::*;
