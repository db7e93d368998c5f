pub const K_KERNEL_NAME: &str = "cadence";
pub const K_KERNEL_VERSION: &str = env!("CARGO_PKG_VERSION");
