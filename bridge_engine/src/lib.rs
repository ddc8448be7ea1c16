pub mod bridge;
pub mod bridge_config;
pub mod endpoint;
pub mod errors;
pub mod frame_channel;
pub mod manifest;
pub mod request_translator;
pub mod types;

#[cfg(test)]
mod test_server;

pub use bridge::Bridge;
pub use bridge_config::BridgeConfig;
pub use request_translator::RequestTranslator;
pub use types::*;
