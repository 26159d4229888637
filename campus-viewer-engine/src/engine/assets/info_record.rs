use serde::Deserialize;

/// One posted information entry for a building role, as returned by the info
/// backend. Field names mirror the backend's wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub information: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub happenings: Option<String>,
}

/// Normalise a backend payload into a record list.
///
/// The backend usually returns an array (latest entry first) but has been
/// observed returning a bare object for single entries; `null` means no data.
pub fn normalise_records(value: serde_json::Value) -> Result<Vec<InfoRecord>, serde_json::Error> {
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>(),
        single => serde_json::from_value(single).map(|record| vec![record]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_payload_keeps_order() {
        let records = normalise_records(json!([
            { "name": "Latest", "information": "new" },
            { "name": "Older", "information": "old" }
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Latest"));
    }

    #[test]
    fn bare_object_becomes_single_entry() {
        let records =
            normalise_records(json!({ "information": "only entry", "happenings": "expo" }))
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].information, "only entry");
        assert_eq!(records[0].happenings.as_deref(), Some("expo"));
    }

    #[test]
    fn null_payload_is_empty() {
        assert!(normalise_records(serde_json::Value::Null).unwrap().is_empty());
    }

    #[test]
    fn missing_fields_default() {
        let records = normalise_records(json!([{}])).unwrap();
        assert!(records[0].name.is_none());
        assert_eq!(records[0].information, "");
    }
}
