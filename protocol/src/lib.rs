//! Wire protocol: message framing and encoding/decoding.
//!
//! A frame is a 4-byte big-endian body length followed by the JSON body.

pub mod codec;
pub mod error;

pub use codec::{
    decode, encode, encode_body, encode_body_with_limit, encode_with_limit, read_frame,
    read_frame_with_limit, write_frame, MAX_MESSAGE_SIZE,
};
pub use error::ProtocolError;
