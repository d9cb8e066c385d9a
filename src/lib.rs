pub mod app;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod output;
pub mod probe;
pub mod progress;
pub mod runner;
pub mod utils;
pub mod wordlist;

#[cfg(test)]
mod tests;
