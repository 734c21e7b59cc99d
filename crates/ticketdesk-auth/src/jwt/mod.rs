//! Signed credential encoding, decoding, and hashing.

pub mod claims;
pub mod codec;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, TokenType};
pub use codec::CredentialCodec;
pub use decoder::{JwtDecoder, VerifyError};
pub use encoder::{IssuedToken, JwtEncoder};
