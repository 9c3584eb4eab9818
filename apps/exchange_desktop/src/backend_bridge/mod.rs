//! Backend side of the desktop app: the command queue fed by the UI and the
//! worker thread that executes those commands against the dispatchers.

pub mod commands;
pub mod runtime;
