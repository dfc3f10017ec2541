//! Tools module containing tool abstractions and built-in tools

pub mod calculator;
pub mod function_factory;
pub mod http_request;
pub mod schema;
pub mod text;
pub mod tool;
pub mod translate;
pub mod units;
pub mod weather;

pub use calculator::{CalculatorTool, SimpleCalculatorTool};
pub use function_factory::FunctionFactory;
pub use http_request::HttpRequestTool;
pub use text::{TextAnalyzer, TextProcessor};
pub use tool::{Tool, ToolRegistry, ToolSpec};
pub use translate::SimpleTranslate;
pub use units::UnitConverter;
pub use weather::WeatherTool;
