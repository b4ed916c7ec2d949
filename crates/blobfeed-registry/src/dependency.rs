//! Framework-scoped dependency groups and their compact attribute encoding.
//!
//! Attribute values are flat strings, so the nested dependency groups of a
//! package are serialized to a JSON array and then base64-encoded into a
//! single value:
//!
//! ```text
//! [{"targetFramework": "net8.0" | null,
//!   "dependencies": [{"id": "...", "versionSpec": "[1.0,2.0)" | null}]}]
//! ```
//!
//! The wire records are kept separate from the public model so that the
//! stored layout does not shift when the model gains fields.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, Result};

/// A single dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    pub id: String,

    /// Version range constraint, e.g. `[1.0,2.0)`. `None` accepts any version.
    #[serde(default)]
    pub version_spec: Option<String>,
}

/// Dependencies that apply to one target framework.
///
/// A group without a target framework applies to every framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    #[serde(default)]
    pub target_framework: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
}

#[derive(Serialize, Deserialize)]
struct DependencyRecord {
    id: String,
    #[serde(rename = "versionSpec", default)]
    version_spec: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct DependencyGroupRecord {
    #[serde(rename = "targetFramework", default)]
    target_framework: Option<String>,
    #[serde(default)]
    dependencies: Vec<DependencyRecord>,
}

fn to_record(group: &DependencyGroup) -> DependencyGroupRecord {
    DependencyGroupRecord {
        target_framework: group.target_framework.clone(),
        dependencies: group
            .dependencies
            .iter()
            .map(|dep| {
                DependencyRecord {
                    id: dep.id.clone(),
                    version_spec: dep.version_spec.clone(),
                }
            })
            .collect(),
    }
}

fn from_record(record: DependencyGroupRecord) -> DependencyGroup {
    DependencyGroup {
        target_framework: record.target_framework,
        dependencies: record
            .dependencies
            .into_iter()
            .map(|dep| {
                PackageDependency {
                    id: dep.id,
                    version_spec: dep.version_spec,
                }
            })
            .collect(),
    }
}

/// Encodes dependency groups into a single attribute-safe string.
pub fn encode_dependency_groups(groups: &[DependencyGroup]) -> Result<String> {
    let records: Vec<DependencyGroupRecord> = groups.iter().map(to_record).collect();
    let json = serde_json::to_string(&records).map_err(EncodingError::from)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes a value produced by [`encode_dependency_groups`].
///
/// # Errors
///
/// Returns [`RegistryError::MalformedEncoding`](crate::RegistryError::MalformedEncoding)
/// if the value is not base64, not UTF-8, or not the expected JSON shape.
pub fn decode_dependency_groups(value: &str) -> Result<Vec<DependencyGroup>> {
    let bytes = STANDARD.decode(value.trim()).map_err(EncodingError::from)?;
    let json = String::from_utf8(bytes).map_err(EncodingError::from)?;
    let records: Vec<DependencyGroupRecord> =
        serde_json::from_str(&json).map_err(EncodingError::from)?;
    Ok(records.into_iter().map(from_record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    fn dep(id: &str, spec: Option<&str>) -> PackageDependency {
        PackageDependency {
            id: id.to_string(),
            version_spec: spec.map(String::from),
        }
    }

    #[test]
    fn test_empty_groups() {
        let encoded = encode_dependency_groups(&[]).unwrap();
        assert_eq!(encoded, "W10=");
        assert!(decode_dependency_groups(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_order_and_absent_values() {
        let groups = vec![
            DependencyGroup {
                target_framework: Some("net8.0".to_string()),
                dependencies: vec![
                    dep("Newtonsoft.Json", Some("[13.0.1, )")),
                    dep("Serilog", None),
                ],
            },
            DependencyGroup {
                target_framework: None,
                dependencies: vec![dep("System.Memory", Some("4.5.5"))],
            },
            DependencyGroup {
                target_framework: Some("netstandard2.0".to_string()),
                dependencies: vec![],
            },
        ];

        let encoded = encode_dependency_groups(&groups).unwrap();
        assert_eq!(decode_dependency_groups(&encoded).unwrap(), groups);
    }

    #[test]
    fn test_wire_format() {
        let groups = vec![DependencyGroup {
            target_framework: None,
            dependencies: vec![dep("A", None)],
        }];
        let encoded = encode_dependency_groups(&groups).unwrap();
        let json = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"targetFramework":null,"dependencies":[{"id":"A","versionSpec":null}]}]"#
        );
    }

    #[test]
    fn test_decode_tolerates_missing_optional_fields() {
        let json = r#"[{"dependencies":[{"id":"A"}]}]"#;
        let groups = decode_dependency_groups(&STANDARD.encode(json)).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].target_framework, None);
        assert_eq!(groups[0].dependencies, vec![dep("A", None)]);
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let result = decode_dependency_groups("not base64!");
        assert!(matches!(
            result,
            Err(RegistryError::MalformedEncoding(EncodingError::Base64(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_json() {
        let result = decode_dependency_groups(&STANDARD.encode("{\"oops\":"));
        assert!(matches!(
            result,
            Err(RegistryError::MalformedEncoding(EncodingError::Json(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let result = decode_dependency_groups(&STANDARD.encode([0xff, 0xfe, 0x5b]));
        assert!(matches!(
            result,
            Err(RegistryError::MalformedEncoding(EncodingError::Utf8(_)))
        ));
    }
}
