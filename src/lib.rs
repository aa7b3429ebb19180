pub mod cli;
pub mod models;
pub mod rpc;
pub mod stages;
pub mod storage;
pub mod utils;
