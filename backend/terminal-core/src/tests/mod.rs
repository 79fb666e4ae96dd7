mod codec;
mod config;
mod control;
mod faults;
mod method;
mod mock_backend;
mod seed;
mod timing;
