use bytes::Bytes;
use grit::areas::database::Database;
use grit::artifacts::core::zlib;
use grit::artifacts::objects::object_id::ObjectId;
use grit::artifacts::objects::object_type::ObjectType;
use grit::artifacts::transport::pkt_line::{FLUSH_PKT, encode};

const PACK_HEADER_SIZE: usize = 12;

/// Writes packfiles record by record, the way upload-pack streams them
#[derive(Default)]
pub struct PackBuilder {
    records: Vec<u8>,
    count: u32,
}

impl PackBuilder {
    fn record(&mut self, type_code: u8, base: &[u8], data: &[u8]) -> usize {
        let offset = PACK_HEADER_SIZE + self.records.len();

        let mut size = data.len();
        let mut byte = (type_code << 4) | (size & 0x0f) as u8;
        size >>= 4;
        while size != 0 {
            self.records.push(byte | 0x80);
            byte = (size & 0x7f) as u8;
            size >>= 7;
        }
        self.records.push(byte);

        self.records.extend_from_slice(base);
        self.records
            .extend(zlib::deflate(data).expect("Failed to compress record"));
        self.count += 1;
        offset
    }

    /// Append a whole object, returning its offset and id
    pub fn object(&mut self, kind: ObjectType, payload: &[u8]) -> (usize, ObjectId) {
        let type_code = match kind {
            ObjectType::Commit => 1,
            ObjectType::Tree => 2,
            ObjectType::Blob => 3,
            ObjectType::Tag => 4,
        };
        let offset = self.record(type_code, &[], payload);
        (offset, Database::hash(kind, Bytes::copy_from_slice(payload)))
    }

    /// Append a delta rebuilding `base + suffix` from the object at `base_offset`
    pub fn ofs_delta(&mut self, base_offset: usize, base: &[u8], suffix: &[u8]) -> usize {
        let offset = PACK_HEADER_SIZE + self.records.len();
        let mut distance = offset - base_offset;

        let mut encoded = vec![(distance & 0x7f) as u8];
        distance >>= 7;
        while distance != 0 {
            distance -= 1;
            encoded.push(0x80 | (distance & 0x7f) as u8);
            distance >>= 7;
        }
        encoded.reverse();

        self.record(6, &encoded, &append_delta(base, suffix))
    }

    /// Append a delta rebuilding `base + suffix` from the object with id `base_id`
    pub fn ref_delta(&mut self, base_id: &ObjectId, base: &[u8], suffix: &[u8]) -> usize {
        self.record(7, &base_id.to_raw(), &append_delta(base, suffix))
    }

    pub fn build(self) -> Vec<u8> {
        let mut pack = b"PACK".to_vec();
        pack.extend(2u32.to_be_bytes());
        pack.extend(self.count.to_be_bytes());
        pack.extend(self.records);
        // trailer checksum is not verified by the reader
        pack.extend([0u8; 20]);
        pack
    }
}

fn varint(mut value: usize, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push(0x80 | (value & 0x7f) as u8);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Copy all of `base`, then insert `suffix`
fn append_delta(base: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut delta = Vec::new();
    varint(base.len(), &mut delta);
    varint(base.len() + suffix.len(), &mut delta);

    delta.extend([
        0b1011_0000,
        (base.len() & 0xff) as u8,
        (base.len() >> 8) as u8,
    ]);
    for chunk in suffix.chunks(0x7f) {
        delta.push(chunk.len() as u8);
        delta.extend_from_slice(chunk);
    }
    delta
}

/// Frame a pack as a side-band-64k upload-pack response
pub fn side_band_response(pack: &[u8]) -> Vec<u8> {
    let mut response = encode(b"NAK\n").expect("Failed to encode NAK");
    response.extend(encode(b"\x02Enumerating objects: done.\n").expect("Failed to encode progress"));
    for chunk in pack.chunks(8192) {
        let line = [&[1u8][..], chunk].concat();
        response.extend(encode(&line).expect("Failed to encode pack chunk"));
    }
    response.extend(FLUSH_PKT);
    response
}

/// `info/refs` body advertising `refs` with `capabilities` on the first line
pub fn advertisement(refs: &[(&str, &ObjectId)], capabilities: &str) -> Vec<u8> {
    let mut body = encode(b"# service=git-upload-pack\n").expect("Failed to encode service line");
    body.extend(FLUSH_PKT);

    for (i, (name, id)) in refs.iter().enumerate() {
        let line = if i == 0 {
            format!("{id} {name}\0{capabilities}\n")
        } else {
            format!("{id} {name}\n")
        };
        body.extend(encode(line.as_bytes()).expect("Failed to encode ref line"));
    }

    body.extend(FLUSH_PKT);
    body
}
