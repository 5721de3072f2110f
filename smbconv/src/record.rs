//! Producer data records
//!
//! A record is identified by the taxonomy it belongs to and the producer
//! that emitted it. Its data starts with a 16-byte [`RecordHeader`]
//! followed by a payload whose shape depends on the record type.

use smbconv_core::{ConvError, Guid, RecordHeader};

/// One input record as delivered by a producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    pub taxonomy: Guid,
    pub producer: Guid,
    /// Record header followed by payload
    pub data: Vec<u8>,
}

impl DataRecord {
    pub fn new(taxonomy: Guid, producer: Guid, data: Vec<u8>) -> Self {
        Self {
            taxonomy,
            producer,
            data,
        }
    }

    /// Build a record from a header and payload
    pub fn build(taxonomy: Guid, producer: Guid, header: RecordHeader, payload: &[u8]) -> Self {
        let mut data = Vec::with_capacity(RecordHeader::SIZE + payload.len());
        data.extend_from_slice(&header.to_bytes());
        data.extend_from_slice(payload);
        Self::new(taxonomy, producer, data)
    }

    /// Build a record for `record_type` at `instance`/`sub_instance`
    pub fn with_payload(
        taxonomy: Guid,
        producer: Guid,
        record_type: u32,
        instance: u16,
        sub_instance: u16,
        payload: &[u8],
    ) -> Self {
        let header = RecordHeader::new(record_type, instance, sub_instance);
        Self::build(taxonomy, producer, header, payload)
    }

    /// Decode the record header
    pub fn header(&self) -> Result<RecordHeader, ConvError> {
        RecordHeader::from_bytes(&self.data)
    }

    /// Bytes following the fixed-size header
    pub fn payload(&self) -> &[u8] {
        self.data.get(RecordHeader::SIZE..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smbconv_core::taxonomy;

    #[test]
    fn test_build_and_split() {
        let record = DataRecord::with_payload(taxonomy::MISC, Guid::NIL, 7, 1, 2, &[0xAA, 0xBB]);
        assert_eq!(record.data.len(), RecordHeader::SIZE + 2);
        let header = record.header().unwrap();
        assert_eq!(header.record_type, 7);
        assert_eq!(header.instance, 1);
        assert_eq!(header.sub_instance, 2);
        assert_eq!(record.payload(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_short_record() {
        let record = DataRecord::new(taxonomy::MISC, Guid::NIL, vec![0; 10]);
        assert_eq!(record.header(), Err(ConvError::InvalidHeader));
        assert!(record.payload().is_empty());
    }
}
