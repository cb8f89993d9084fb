pub mod core;
pub mod main;
pub mod render;
mod run_effect;
#[cfg(test)]
mod tests;
