//! VarByte encoding and d-gap compression for monotonically increasing
//! integer sequences, used throughout the index to compress posting-list
//! doc-id streams.
//!
//! Each integer is emitted as 7-bit groups, least-significant group first;
//! every group but the last has its high bit set, so a decoder can tell
//! where one integer ends and the next begins without a length prefix.

/// Encodes a single non-negative integer as VarByte bytes.
pub fn vb_encode_one(mut value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(5);
    loop {
        let mut group = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            group |= 0x80;
        }
        bytes.push(group);
        if value == 0 {
            break;
        }
    }
    bytes
}

/// Decodes a single VarByte integer starting at `bytes[0]`.
/// Returns the decoded value and the number of bytes consumed.
pub fn vb_decode_one(bytes: &[u8]) -> (u64, usize) {
    let mut value: u64 = 0;
    let mut shift = 0;
    let mut consumed = 0;
    for &b in bytes {
        consumed += 1;
        value |= ((b & 0x7f) as u64) << shift;
        if b & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    (value, consumed)
}

/// Encodes a sequence of integers, each as its own VarByte group.
pub fn vb_encode(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    for &v in values {
        out.extend(vb_encode_one(v));
    }
    out
}

/// Decodes a flat VarByte byte stream back into its integers.
pub fn vb_decode(bytes: &[u8]) -> Vec<u64> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let (value, consumed) = vb_decode_one(&bytes[offset..]);
        if consumed == 0 {
            break;
        }
        out.push(value);
        offset += consumed;
    }
    out
}

/// Transforms a strictly increasing sequence into d-gaps: [x0, x1-x0, x2-x1, ...].
pub fn to_d_gaps(values: &[u64]) -> Vec<u64> {
    let mut gaps = Vec::with_capacity(values.len());
    let mut last = 0u64;
    for (i, &v) in values.iter().enumerate() {
        if i == 0 {
            gaps.push(v);
        } else {
            gaps.push(v - last);
        }
        last = v;
    }
    gaps
}

/// Inverse of [`to_d_gaps`]: recovers the original sequence via prefix sum.
pub fn from_d_gaps(gaps: &[u64]) -> Vec<u64> {
    let mut values = Vec::with_capacity(gaps.len());
    let mut last = 0u64;
    for (i, &g) in gaps.iter().enumerate() {
        if i == 0 {
            last = g;
        } else {
            last += g;
        }
        values.push(last);
    }
    values
}

/// Encodes a strictly increasing sequence as `VB(d-gaps(xs))`.
pub fn encode_vb_dgaps(values: &[u64]) -> Vec<u8> {
    vb_encode(&to_d_gaps(values))
}

/// Decodes a byte stream produced by [`encode_vb_dgaps`] back to the
/// original strictly increasing sequence.
pub fn decode_vb_dgaps(bytes: &[u8]) -> Vec<u64> {
    from_d_gaps(&vb_decode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_strictly_increasing_sequences() {
        let xs = vec![1u64, 2, 5, 10, 100_000];
        let encoded = encode_vb_dgaps(&xs);
        assert_eq!(decode_vb_dgaps(&encoded), xs);
    }

    #[test]
    fn zero_encodes_to_one_byte() {
        assert_eq!(vb_encode_one(0).len(), 1);
    }

    #[test]
    fn three_hundred_encodes_to_two_bytes() {
        assert_eq!(vb_encode_one(300).len(), 2);
    }

    #[test]
    fn empty_sequence_round_trips() {
        let xs: Vec<u64> = Vec::new();
        assert_eq!(decode_vb_dgaps(&encode_vb_dgaps(&xs)), xs);
    }

    #[test]
    fn single_element_round_trips() {
        let xs = vec![42u64];
        assert_eq!(decode_vb_dgaps(&encode_vb_dgaps(&xs)), xs);
    }

    #[test]
    fn large_gap_round_trips() {
        let xs = vec![1u64, 1_000_000, 2_000_000, 4_294_967_295];
        assert_eq!(decode_vb_dgaps(&encode_vb_dgaps(&xs)), xs);
    }
}
