use hickory_proto::op::Message;
use hickory_proto::rr::{Record, RecordType};

/// Ceiling, in seconds, applied while an upstream's name list may still
/// be incomplete.
pub const MINIMAL_DEFAULT_TTL: u32 = 5;

/// Clamps every record TTL in the reply down to `minimal_ttl`, never
/// raising one. OPT records are left alone: their TTL field carries the
/// extended rcode and flags, not a lifetime.
pub fn rewrite_to_minimal_ttls(reply: &mut Message, minimal_ttl: u32) {
    let answers = clamp_all(reply.take_answers(), minimal_ttl);
    reply.insert_answers(answers);

    let authority = clamp_all(reply.take_name_servers(), minimal_ttl);
    reply.insert_name_servers(authority);

    let additionals = reply
        .take_additionals()
        .into_iter()
        .map(|r| {
            if r.record_type() == RecordType::OPT {
                r
            } else {
                clamp(r, minimal_ttl)
            }
        })
        .collect();
    reply.insert_additionals(additionals);
}

fn clamp_all(records: Vec<Record>, minimal_ttl: u32) -> Vec<Record> {
    records.into_iter().map(|r| clamp(r, minimal_ttl)).collect()
}

fn clamp(mut record: Record, minimal_ttl: u32) -> Record {
    let ttl = record.ttl().min(minimal_ttl);
    record.set_ttl(ttl);
    record
}
