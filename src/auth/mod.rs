pub mod credentials;
pub mod hmac;

pub use credentials::{Credentials, Region};
pub use hmac::HmacSigner;
