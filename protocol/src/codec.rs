//! Message codec: framing and serialization for the wire protocol.

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use powchain_messages::{Message, MessageKind};

use crate::ProtocolError;

/// Default maximum message body size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// Serialize a message to its JSON body (no length prefix), capped at
/// [`MAX_MESSAGE_SIZE`].
pub fn encode_body(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    encode_body_with_limit(message, MAX_MESSAGE_SIZE)
}

/// Serialize a message to its JSON body, rejecting bodies above `max`.
pub fn encode_body_with_limit(message: &Message, max: usize) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(message)?;
    if body.len() > max {
        return Err(ProtocolError::MessageTooLarge {
            size: body.len(),
            max,
        });
    }
    Ok(body)
}

/// Encode a message for transmission (length-prefixed JSON).
pub fn encode(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    encode_with_limit(message, MAX_MESSAGE_SIZE)
}

/// Encode a message for transmission with a body cap of `max` bytes.
///
/// `max` is clamped to what the 4-byte length prefix can express.
pub fn encode_with_limit(message: &Message, max: usize) -> Result<Vec<u8>, ProtocolError> {
    let body = encode_body_with_limit(message, max.min(u32::MAX as usize))?;
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a message body.
///
/// Bodies that are valid JSON objects with a string `type` outside the known
/// set yield [`ProtocolError::UnknownType`]; anything else that fails to
/// parse is [`ProtocolError::Malformed`].
pub fn decode(body: &[u8]) -> Result<Message, ProtocolError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing string field `type`".into()))?;
    if MessageKind::from_tag(tag).is_none() {
        return Err(ProtocolError::UnknownType(tag.to_string()));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Read one frame body, capped at [`MAX_MESSAGE_SIZE`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    read_frame_with_limit(reader, MAX_MESSAGE_SIZE).await
}

/// Read one frame body.
///
/// Returns `Ok(None)` when the peer closes the stream cleanly between frames.
/// A declared length above `max` is rejected before the body is read.
pub async fn read_frame_with_limit<R>(
    reader: &mut R,
    max: usize,
) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let body_len = u32::from_be_bytes(len_buf) as usize;
    if body_len > max {
        return Err(ProtocolError::MessageTooLarge {
            size: body_len,
            max,
        });
    }

    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Write one message as a length-prefixed frame and flush.
pub async fn write_frame<W>(writer: &mut W, message: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_ledger::Ledger;
    use powchain_types::ChainParams;

    fn chain() -> Vec<powchain_ledger::Block> {
        let mut ledger = Ledger::new(ChainParams::with_difficulty(1).unwrap()).unwrap();
        ledger.add_block(Vec::new()).unwrap();
        ledger.blocks().to_vec()
    }

    #[test]
    fn frame_has_big_endian_length_prefix() {
        let frame = encode(&Message::GetLength).unwrap();
        let body = br#"{"type":"GET_LENGTH"}"#;
        assert_eq!(&frame[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(&frame[4..], body);
    }

    #[test]
    fn decode_known_messages() {
        assert_eq!(decode(br#"{"type":"GET_CHAIN"}"#).unwrap(), Message::GetChain);
        assert_eq!(decode(br#"{"type":"LENGTH","data":4}"#).unwrap(), Message::Length(4));
        let body = encode_body(&Message::Chain(chain())).unwrap();
        assert_eq!(decode(&body).unwrap(), Message::Chain(chain()));
    }

    #[test]
    fn decode_unknown_type() {
        let err = decode(br#"{"type":"PING","data":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownType(ref t) if t == "PING"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn decode_malformed() {
        let bodies: [&[u8]; 5] = [
            b"not json",
            br#"{"data":1}"#,
            br#"{"type":7}"#,
            br#"{"type":"LENGTH","data":"seven"}"#,
            br#"{"type":"NEW_BLOCK","data":{"index":1}}"#,
        ];
        for body in bodies {
            let err = decode(body).unwrap_err();
            assert!(matches!(err, ProtocolError::Malformed(_)), "{err}");
            assert!(err.is_recoverable());
        }
    }

    #[tokio::test]
    async fn frames_roundtrip_over_stream() {
        let (mut a, mut b) = tokio::io::duplex(64 * 1024);
        let messages = vec![
            Message::GetLength,
            Message::Length(2),
            Message::NewBlock(chain().pop().unwrap()),
        ];
        for msg in &messages {
            write_frame(&mut a, msg).await.unwrap();
        }
        drop(a);

        for expected in messages {
            let body = read_frame(&mut b).await.unwrap().unwrap();
            assert_eq!(decode(&body).unwrap(), expected);
        }
        assert!(read_frame(&mut b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_length_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&((MAX_MESSAGE_SIZE as u32) + 1).to_be_bytes())
            .await
            .unwrap();
        let err = read_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn custom_limit_applies_to_both_directions() {
        let message = Message::Chain(chain());
        let size = encode_body(&message).unwrap().len();

        let err = encode_with_limit(&message, size - 1).unwrap_err();
        assert!(matches!(err, ProtocolError::MessageTooLarge { max, .. } if max == size - 1));

        let frame = encode_with_limit(&message, size).unwrap();
        let (mut a, mut b) = tokio::io::duplex(64 * 1024);
        a.write_all(&frame).await.unwrap();
        a.write_all(&frame).await.unwrap();

        let body = read_frame_with_limit(&mut b, size).await.unwrap().unwrap();
        assert_eq!(decode(&body).unwrap(), message);
        let err = read_frame_with_limit(&mut b, size - 1).await.unwrap_err();
        assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
    }

    #[tokio::test]
    async fn truncated_body_is_io_error() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&10u32.to_be_bytes()).await.unwrap();
        a.write_all(b"abc").await.unwrap();
        drop(a);
        assert!(matches!(read_frame(&mut b).await, Err(ProtocolError::Io(_))));
    }
}
