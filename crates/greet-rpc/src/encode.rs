use bytes::{BufMut, BytesMut};

/// Length of the gRPC frame header: one compression flag byte followed by a
/// big-endian `u32` message length.
pub const FRAME_HEADER_LEN: usize = 5;

/// Encodes a protobuf message as a gRPC frame into the given `BytesMut` buffer.
///
/// The buffer is cleared first. Frames are never compressed.
pub fn encode_grpc_frame_to<Msg: prost::Message>(buf: &mut BytesMut, msg: &Msg) {
    let len = msg.encoded_len();
    buf.clear();
    buf.reserve(FRAME_HEADER_LEN + len);
    buf.put_u8(0);
    buf.put_u32(len as u32);
    // ignore the error since the buffer has enough capacity
    let _ = msg.encode(buf);
}

/// Encodes a protobuf message as a gRPC frame into a new `BytesMut` buffer.
pub fn encode_grpc_frame<Msg: prost::Message>(msg: &Msg) -> BytesMut {
    let mut buf = BytesMut::new();
    encode_grpc_frame_to(&mut buf, msg);
    buf
}
