pub mod varbyte;

pub use varbyte::{decode_vb_dgaps, encode_vb_dgaps, vb_decode, vb_decode_one, vb_encode, vb_encode_one};
