pub mod network;
pub mod station;
pub mod time_window;
