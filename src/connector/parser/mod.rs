mod mock;

pub use mock::*;
