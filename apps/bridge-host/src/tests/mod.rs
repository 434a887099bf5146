mod error;
mod host_loop;
