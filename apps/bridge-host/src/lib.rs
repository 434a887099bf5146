// Library exports for testing
// The binary (main.rs) imports these as well

pub mod console;
pub mod demo_scene;
pub mod error;
pub mod host_loop;
pub mod logger;
pub mod paths;

#[cfg(test)]
mod tests;
