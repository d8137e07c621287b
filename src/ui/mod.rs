pub mod output;
pub mod progress;
pub mod selection;
pub mod signals;

pub use output::{OutputFormatter, OutputMode};
pub use progress::ProgressManager;
pub use selection::{CliSelection, SelectionSource};
pub use signals::GracefulShutdown;
