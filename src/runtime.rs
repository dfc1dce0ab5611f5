use ahash::{self, AHasher};

mod value;
pub use value::Value;

pub mod function;
pub mod class;
pub mod ops;
pub mod errors;
pub mod vm;

pub use function::{Function, FunctionKind, NativeFunction, NativeFn};
pub use class::{Class, Instance, BoundMethod, Method};
pub use errors::{ExecResult, RuntimeError};
pub use vm::{VirtualMachine, Output};



// Default Hasher

pub type DefaultHasher = AHasher;
pub type DefaultBuildHasher = ahash::RandomState;
pub type HashMap<K, V> = std::collections::HashMap<K, V, DefaultBuildHasher>;
pub type HashSet<T> = std::collections::HashSet<T, DefaultBuildHasher>;
