mod console;
mod install;
mod service;
mod start;
mod status;
mod stop;
mod uninstall;

pub use console::console;
pub use install::install;
pub use service::service;
pub use start::start;
pub use status::status;
pub use stop::stop;
pub use uninstall::uninstall;
