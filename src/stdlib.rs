mod prelude;

pub use prelude::install_prelude;
