pub mod mock_server;

pub use mock_server::{CapturedRequest, MockResponse, spawn_mock_server, tcp_listener};
