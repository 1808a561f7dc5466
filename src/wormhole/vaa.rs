//! Decoding of signed VAAs and Token Bridge transfer payloads.
//!
//! Only the fields needed to route a redemption are decoded; guardian
//! signatures are skipped, the destination contract verifies them.

use crate::types::UniversalAddress;
use alloy_primitives::{B256, U256};
use anyhow::{anyhow, Result};

const SIGNATURE_LEN: usize = 66;

pub const PAYLOAD_TRANSFER: u8 = 1;
pub const PAYLOAD_TRANSFER_WITH_PAYLOAD: u8 = 3;

/// Identifies a published Wormhole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId {
    pub emitter_chain: u16,
    pub emitter: UniversalAddress,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vaa {
    pub guardian_set_index: u32,
    pub signature_count: usize,
    pub timestamp: u32,
    pub nonce: u32,
    pub emitter_chain: u16,
    pub emitter_address: UniversalAddress,
    pub sequence: u64,
    pub consistency_level: u8,
    pub payload: Vec<u8>,
    pub raw: Vec<u8>,
}

impl Vaa {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let version = reader.u8()?;
        if version != 1 {
            anyhow::bail!("unsupported VAA version {version}");
        }
        let guardian_set_index = reader.u32()?;
        let signature_count = reader.u8()? as usize;
        reader.skip(signature_count * SIGNATURE_LEN)?;

        Ok(Self {
            guardian_set_index,
            signature_count,
            timestamp: reader.u32()?,
            nonce: reader.u32()?,
            emitter_chain: reader.u16()?,
            emitter_address: UniversalAddress(reader.b256()?),
            sequence: reader.u64()?,
            consistency_level: reader.u8()?,
            payload: reader.rest().to_vec(),
            raw: bytes.to_vec(),
        })
    }

    pub fn message_id(&self) -> MessageId {
        MessageId {
            emitter_chain: self.emitter_chain,
            emitter: self.emitter_address,
            sequence: self.sequence,
        }
    }
}

/// Token Bridge transfer payload (ids 1 and 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferPayload {
    pub payload_id: u8,
    /// Amount normalized to at most 8 decimals.
    pub amount: U256,
    pub token_address: UniversalAddress,
    pub token_chain: u16,
    pub to: UniversalAddress,
    pub to_chain: u16,
}

impl TokenTransferPayload {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let payload_id = reader.u8()?;
        if payload_id != PAYLOAD_TRANSFER && payload_id != PAYLOAD_TRANSFER_WITH_PAYLOAD {
            anyhow::bail!("not a token transfer payload (id {payload_id})");
        }
        Ok(Self {
            payload_id,
            amount: U256::from_be_bytes(reader.b256()?.0),
            token_address: UniversalAddress(reader.b256()?),
            token_chain: reader.u16()?,
            to: UniversalAddress(reader.b256()?),
            to_chain: reader.u16()?,
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| anyhow!("VAA truncated at byte {}", self.offset))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(buf))
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    fn b256(&mut self) -> Result<B256> {
        Ok(B256::from_slice(self.take(32)?))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_payload(to_chain: u16) -> Vec<u8> {
        let mut payload = vec![PAYLOAD_TRANSFER];
        payload.extend_from_slice(&U256::from(1_000_000u64).to_be_bytes::<32>());
        payload.extend_from_slice(&[0x11; 32]);
        payload.extend_from_slice(&10002u16.to_be_bytes());
        payload.extend_from_slice(&[0x22; 32]);
        payload.extend_from_slice(&to_chain.to_be_bytes());
        payload.extend_from_slice(&[0u8; 32]);
        payload
    }

    fn signed_vaa(payload: &[u8], signatures: u8) -> Vec<u8> {
        let mut vaa = vec![1u8];
        vaa.extend_from_slice(&4u32.to_be_bytes());
        vaa.push(signatures);
        vaa.extend(std::iter::repeat(0xaa).take(signatures as usize * SIGNATURE_LEN));
        vaa.extend_from_slice(&1_700_000_000u32.to_be_bytes());
        vaa.extend_from_slice(&0u32.to_be_bytes());
        vaa.extend_from_slice(&10002u16.to_be_bytes());
        vaa.extend_from_slice(&[0x33; 32]);
        vaa.extend_from_slice(&42u64.to_be_bytes());
        vaa.push(200);
        vaa.extend_from_slice(payload);
        vaa
    }

    #[test]
    fn decodes_body_after_signatures() {
        let payload = transfer_payload(1);
        let bytes = signed_vaa(&payload, 2);
        let vaa = Vaa::parse(&bytes).unwrap();

        assert_eq!(vaa.guardian_set_index, 4);
        assert_eq!(vaa.signature_count, 2);
        assert_eq!(vaa.emitter_chain, 10002);
        assert_eq!(vaa.sequence, 42);
        assert_eq!(vaa.consistency_level, 200);
        assert_eq!(vaa.payload, payload);
        assert_eq!(
            vaa.message_id(),
            MessageId {
                emitter_chain: 10002,
                emitter: UniversalAddress(B256::repeat_byte(0x33)),
                sequence: 42,
            }
        );
    }

    #[test]
    fn decodes_token_transfer_payload() {
        let transfer = TokenTransferPayload::parse(&transfer_payload(1)).unwrap();
        assert_eq!(transfer.payload_id, PAYLOAD_TRANSFER);
        assert_eq!(transfer.amount, U256::from(1_000_000u64));
        assert_eq!(transfer.token_chain, 10002);
        assert_eq!(transfer.token_address, UniversalAddress(B256::repeat_byte(0x11)));
        assert_eq!(transfer.to, UniversalAddress(B256::repeat_byte(0x22)));
        assert_eq!(transfer.to_chain, 1);
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = signed_vaa(&transfer_payload(1), 1);
        assert!(Vaa::parse(&bytes[..40]).is_err());
        assert!(TokenTransferPayload::parse(&[PAYLOAD_TRANSFER, 0, 1]).is_err());
    }

    #[test]
    fn rejects_other_payloads() {
        let err = TokenTransferPayload::parse(&[2u8; 140]).unwrap_err();
        assert!(err.to_string().contains("id 2"));
        let mut bytes = signed_vaa(&transfer_payload(1), 0);
        bytes[0] = 2;
        assert!(Vaa::parse(&bytes).is_err());
    }
}
