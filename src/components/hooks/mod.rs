pub mod use_random;

#[allow(unused_imports)]
pub use use_random::*;
