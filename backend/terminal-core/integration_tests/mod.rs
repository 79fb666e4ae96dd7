mod backend_tests;
mod controller_tests;
mod ws_tests;
