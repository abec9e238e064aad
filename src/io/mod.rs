pub mod output;

pub use output::{create_writer, OutputFormat, OutputWriter, Report};
