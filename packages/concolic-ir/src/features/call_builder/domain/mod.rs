pub mod store_method;

pub use store_method::{StoreMethod, FLAG_TYPE, STORE_CLASS};
