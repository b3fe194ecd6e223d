//! Kiosk greeter: a chroma-keyed mascot, a guest photo booth and a greeting
//! display, split across cooperating viewport processes.

pub mod assets;
pub mod bus;
pub mod capture;
pub mod compositor;
pub mod config;
pub mod coordinator;
pub mod gesture;
pub mod media;
pub mod narration;
pub mod remote;
