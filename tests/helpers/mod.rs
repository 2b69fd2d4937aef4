pub mod builders;
pub mod server;
pub mod webapp;

pub use builders::WebXmlBuilder;
pub use server::{serve_descriptor, stalled_server};
pub use webapp::TestWebApp;
