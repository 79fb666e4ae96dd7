mod backends;
mod controller;
mod reset_gate;
mod timeouts;
