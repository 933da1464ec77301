// Library side of the surveyor client, shared by the binary and the integration tests.

pub mod app;
pub mod cli;
pub mod controller;
pub mod gate;
pub mod logging;
pub mod output;
pub mod poller;
pub mod service_client;
pub mod state;

pub use controller::{PauseOutcome, ResetOutcome, SendOutcome, SessionController};
pub use gate::{Confirmer, ConsentGate, Gate};
pub use poller::PollingScheduler;
pub use service_client::HttpSessionClient;
