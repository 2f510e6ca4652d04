//! Field layout of an OTP record stored as a Redis hash

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use otp_core::domain::entities::{OtpPurpose, OtpRecord};

pub(crate) const FIELD_ATTEMPTS: &str = "attempts";

/// Hash fields for `record`, timestamps as epoch milliseconds
pub(crate) fn encode(record: &OtpRecord) -> Vec<(&'static str, String)> {
    vec![
        ("id", record.id.to_string()),
        ("subject", record.subject.clone()),
        ("purpose", record.purpose.to_string()),
        ("code_hash", record.code_hash.clone()),
        ("salt", record.salt.clone()),
        ("issued_at", record.issued_at.timestamp_millis().to_string()),
        ("expires_at", record.expires_at.timestamp_millis().to_string()),
        (FIELD_ATTEMPTS, record.attempts.to_string()),
        ("consumed", u8::from(record.consumed).to_string()),
    ]
}

/// Rebuild a record from its hash fields
///
/// Returns a description of the first problem found.
pub(crate) fn decode(fields: &HashMap<String, String>) -> Result<OtpRecord, String> {
    let id = Uuid::parse_str(field(fields, "id")?).map_err(|e| format!("id: {}", e))?;
    let purpose: OtpPurpose = field(fields, "purpose")?
        .parse()
        .map_err(|e| format!("purpose: {}", e))?;
    let attempts = field(fields, FIELD_ATTEMPTS)?
        .parse::<u32>()
        .map_err(|e| format!("attempts: {}", e))?;
    let consumed = match field(fields, "consumed")? {
        "0" => false,
        "1" => true,
        other => return Err(format!("consumed: unexpected value {:?}", other)),
    };

    Ok(OtpRecord {
        id,
        subject: field(fields, "subject")?.to_string(),
        purpose,
        code_hash: field(fields, "code_hash")?.to_string(),
        salt: field(fields, "salt")?.to_string(),
        issued_at: timestamp(fields, "issued_at")?,
        expires_at: timestamp(fields, "expires_at")?,
        attempts,
        consumed,
    })
}

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, String> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing field `{}`", name))
}

fn timestamp(fields: &HashMap<String, String>, name: &str) -> Result<DateTime<Utc>, String> {
    let millis = field(fields, name)?
        .parse::<i64>()
        .map_err(|e| format!("{}: {}", name, e))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| format!("{}: out of range", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> OtpRecord {
        OtpRecord::new(
            "+15551234567",
            OtpPurpose::TransactionConfirm,
            "ab".repeat(32),
            "cd".repeat(16),
            Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            chrono::Duration::seconds(300),
        )
    }

    fn as_map(fields: Vec<(&'static str, String)>) -> HashMap<String, String> {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_decode_encoded_record() {
        let mut original = record();
        original.attempts = 3;

        let decoded = decode(&as_map(encode(&original))).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_missing_field_is_reported() {
        let mut fields = as_map(encode(&record()));
        fields.remove("code_hash");

        let err = decode(&fields).unwrap_err();
        assert!(err.contains("code_hash"));
    }

    #[test]
    fn test_malformed_values_are_reported() {
        let mut fields = as_map(encode(&record()));
        fields.insert("attempts".to_string(), "many".to_string());
        assert!(decode(&fields).unwrap_err().starts_with("attempts"));

        let mut fields = as_map(encode(&record()));
        fields.insert("purpose".to_string(), "Not A Tag".to_string());
        assert!(decode(&fields).unwrap_err().starts_with("purpose"));

        let mut fields = as_map(encode(&record()));
        fields.insert("consumed".to_string(), "yes".to_string());
        assert!(decode(&fields).unwrap_err().starts_with("consumed"));
    }
}
