//! Parameter objects for the engine endpoints this crate drives.

mod containers;
mod images;
mod services;
mod system;

pub use containers::{ContainerLogsParameters, ContainerStopParameters, ContainersListParameters};
pub use images::{ImagePushParameters, ImagesCreateParameters};
pub use services::{SERVICE_MODES, ServiceFilter};
pub use system::EventsParameters;
