pub mod client;
pub mod docker;
pub mod executor;
pub mod logging;

pub use client::{BindMount, DockerClient, RunSpec};
pub use docker::DockerError;
pub use executor::{CommandOutput, DockerExecutor, RealExecutor, default_program};
pub use logging::LoggingExecutor;
