mod config;
mod connection;
mod exec;
mod fixtures;
mod protocol;
