// This crate centralizes the wire definitions spoken with the session service.

pub mod session_request; // For client <-> session service communication
