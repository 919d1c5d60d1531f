mod progress;
mod report;
mod styling;
mod tables;

pub use progress::ReportProgress;
pub use report::{print_cascade, print_pipelines};
pub use styling::{dim, magenta_bold};

/// Prints the `cimon` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📡 cimon"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI pipeline monitor")
    );
}
