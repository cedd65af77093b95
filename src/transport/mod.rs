mod client;
mod http;

pub use client::Transport;
pub use http::HttpTransport;
