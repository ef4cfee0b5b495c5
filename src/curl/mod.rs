pub mod generator;
pub mod parser;

pub use generator::to_curl;
pub use parser::{parse, try_parse, ParseFailure, ParsedCurl};
