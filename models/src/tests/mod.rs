mod api;
mod evaluation;
mod fineness;
mod storage;
