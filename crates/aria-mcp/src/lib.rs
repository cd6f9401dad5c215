pub mod client;
pub mod tool;
pub mod types;

pub use client::McpClient;
pub use tool::{RemoteTool, remote_tools};
pub use types::RemoteToolInfo;
