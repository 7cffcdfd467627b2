mod refresh;

pub use refresh::*;
