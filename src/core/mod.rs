pub mod agent;
pub mod command;
pub mod platform;
pub mod runtime;
pub mod scheduler;

#[cfg(test)]
mod tests;
