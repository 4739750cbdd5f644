pub mod acquisition;
pub mod analysis;
