mod helpers;
mod ws;
