pub mod impl_display_refresh;
#[cfg(test)]
pub mod impl_fake;
pub mod interface;
