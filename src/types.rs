use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// OCLC control number identifying one WorldCat bibliographic record.
///
/// The holdings API is inconsistent about whether numbers are JSON strings or
/// integers, so deserialization accepts both and always stores the decimal text.
/// Any other scalar is kept as its JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(from = "RawOclcNumber", into = "String")]
pub struct OclcNumber(pub String);

impl OclcNumber {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OclcNumber {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOclcNumber {
    Text(String),
    Integer(u64),
    Other(serde_json::Value),
}

impl From<RawOclcNumber> for OclcNumber {
    fn from(raw: RawOclcNumber) -> Self {
        match raw {
            RawOclcNumber::Text(s) => Self(s),
            RawOclcNumber::Integer(n) => Self(n.to_string()),
            RawOclcNumber::Other(value) => Self(value.to_string()),
        }
    }
}

/// Splits a merged-numbers cell (`"123; 456; 789"`) into candidates, preserving order.
///
/// Blank pieces are dropped; duplicates are kept.
#[must_use]
pub fn split_candidates(cell: &str) -> Vec<OclcNumber> {
    cell.split("; ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(OclcNumber::from)
        .collect()
}

/// One resolved record: its number and how many institutions hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingPair {
    pub oclc_number: OclcNumber,
    pub library_count: u32,
}

impl HoldingPair {
    #[must_use]
    pub fn new(oclc_number: impl Into<OclcNumber>, library_count: u32) -> Self {
        Self {
            oclc_number: oclc_number.into(),
            library_count,
        }
    }
}

/// Body of a `bibs-holdings` response.
///
/// `brief_records` is `None` when the number exists but has no brief records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct BibHoldings {
    #[serde(default)]
    pub brief_records: Option<Vec<BriefRecord>>,
}

impl BibHoldings {
    #[must_use]
    pub fn new(brief_records: Vec<BriefRecord>) -> Self {
        Self {
            brief_records: Some(brief_records),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct BriefRecord {
    pub oclc_number: OclcNumber,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub merged_oclc_numbers: Vec<OclcNumber>,
    #[serde(default)]
    pub institution_holding: Option<InstitutionHolding>,
}

impl BriefRecord {
    #[must_use]
    pub fn new(oclc_number: impl Into<OclcNumber>) -> Self {
        Self {
            oclc_number: oclc_number.into(),
            merged_oclc_numbers: Vec::new(),
            institution_holding: None,
        }
    }

    #[must_use]
    pub fn with_merged(mut self, merged: Vec<OclcNumber>) -> Self {
        self.merged_oclc_numbers = merged;
        self
    }

    /// Attach `count` placeholder brief holdings.
    #[must_use]
    pub fn with_holdings(mut self, count: usize) -> Self {
        self.institution_holding = Some(InstitutionHolding {
            brief_holdings: Some(vec![serde_json::Value::Null; count]),
        });
        self
    }

    /// Number of institutions holding this record; 1 when the detail is absent.
    #[must_use]
    pub fn library_count(&self) -> u32 {
        self.institution_holding
            .as_ref()
            .and_then(|h| h.brief_holdings.as_ref())
            .map_or(1, |holdings| u32::try_from(holdings.len()).unwrap_or(u32::MAX))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<OclcNumber>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<OclcNumber>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct InstitutionHolding {
    #[serde(default)]
    pub brief_holdings: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_preserves_order_and_duplicates() {
        let numbers = split_candidates("123; 456; 123");
        let numbers: Vec<&str> = numbers.iter().map(OclcNumber::as_str).collect();
        assert_eq!(numbers, ["123", "456", "123"]);
    }

    #[test]
    fn test_split_drops_blank_pieces() {
        assert!(split_candidates("").is_empty());
        assert!(split_candidates("   ").is_empty());
        assert_eq!(split_candidates("42; ").len(), 1);
    }

    #[test]
    fn test_split_single_number() {
        assert_eq!(split_candidates("987654"), vec![OclcNumber::from("987654")]);
    }

    #[test]
    fn test_oclc_number_accepts_string_or_integer() {
        let from_text: OclcNumber = serde_json::from_str("\"1234\"").unwrap();
        let from_int: OclcNumber = serde_json::from_str("1234").unwrap();
        assert_eq!(from_text, from_int);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"1234\"");
    }

    #[test]
    fn test_parse_full_brief_record() {
        let json = r#"{
            "numberOfRecords": 1,
            "briefRecords": [{
                "oclcNumber": "111",
                "title": "Example",
                "mergedOclcNumbers": ["222", 333],
                "institutionHolding": {
                    "totalHoldingCount": 3,
                    "briefHoldings": [{"oclcSymbol": "A"}, {"oclcSymbol": "B"}, {"oclcSymbol": "C"}]
                }
            }]
        }"#;
        let holdings: BibHoldings = serde_json::from_str(json).unwrap();
        let records = holdings.brief_records.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].oclc_number.as_str(), "111");
        assert_eq!(
            records[0].merged_oclc_numbers,
            vec![OclcNumber::from("222"), OclcNumber::from("333")]
        );
        assert_eq!(records[0].library_count(), 3);
    }

    #[test]
    fn test_missing_holding_detail_counts_as_one() {
        let record: BriefRecord = serde_json::from_str(r#"{"oclcNumber": "5"}"#).unwrap();
        assert_eq!(record.library_count(), 1);

        let record: BriefRecord =
            serde_json::from_str(r#"{"oclcNumber": "5", "institutionHolding": {}}"#).unwrap();
        assert_eq!(record.library_count(), 1);
    }

    #[test]
    fn test_empty_holding_list_counts_as_zero() {
        let record: BriefRecord = serde_json::from_str(
            r#"{"oclcNumber": "5", "institutionHolding": {"briefHoldings": []}}"#,
        )
        .unwrap();
        assert_eq!(record.library_count(), 0);
    }

    #[test]
    fn test_null_merged_numbers_are_empty() {
        let record: BriefRecord =
            serde_json::from_str(r#"{"oclcNumber": "5", "mergedOclcNumbers": null}"#).unwrap();
        assert!(record.merged_oclc_numbers.is_empty());
        assert_eq!(record.library_count(), 1);
    }

    #[test]
    fn test_mixed_merged_numbers_are_coerced() {
        let record: BriefRecord = serde_json::from_str(
            r#"{"oclcNumber": "5", "mergedOclcNumbers": ["1", 2, 3.5, true]}"#,
        )
        .unwrap();
        let merged: Vec<&str> = record.merged_oclc_numbers.iter().map(OclcNumber::as_str).collect();
        assert_eq!(merged, ["1", "2", "3.5", "true"]);
    }

    #[test]
    fn test_response_without_brief_records() {
        let holdings: BibHoldings = serde_json::from_str(r#"{"numberOfRecords": 0}"#).unwrap();
        assert!(holdings.brief_records.is_none());
    }
}
