//! core::naming
//!
//! Naming rules for region artifacts.
//!
//! # Features
//!
//! - Derive a region's report/display name from the configured prefix
//! - Mint deterministic logical ids for artifacts that have none yet

use uuid::Uuid;

use super::types::{ArtifactKind, LogicalId, RegionCode};

/// Namespace for minted logical ids.
///
/// Changing this value changes every freshly minted id, so it must stay
/// fixed for the lifetime of the generated artifacts.
pub const LOGICAL_ID_NAMESPACE: Uuid = Uuid::from_u128(0xaaaaaaaa_bbbb_cccc_dddd_eeeeeeeeeeee);

/// Derive the display name shared by a region's model and report.
///
/// # Example
///
/// ```
/// use regionforge::core::naming::report_name;
/// use regionforge::core::types::RegionCode;
///
/// let region = RegionCode::new("EMEA").unwrap();
/// assert_eq!(report_name("Sales_", &region), "Sales_EMEA");
/// ```
pub fn report_name(prefix: &str, region: &RegionCode) -> String {
    format!("{}{}", prefix, region)
}

/// Mint the logical id for an artifact that has no prior identity.
///
/// The id is a version-5 UUID over `"{kind}:{region}"`, so the same region
/// and kind always yield the same id on any host.
///
/// # Example
///
/// ```
/// use regionforge::core::naming::mint_logical_id;
/// use regionforge::core::types::{ArtifactKind, RegionCode};
///
/// let region = RegionCode::new("Nordics").unwrap();
/// let a = mint_logical_id(ArtifactKind::Model, &region);
/// let b = mint_logical_id(ArtifactKind::Model, &region);
/// assert_eq!(a, b);
/// assert_ne!(a, mint_logical_id(ArtifactKind::Report, &region));
/// ```
pub fn mint_logical_id(kind: ArtifactKind, region: &RegionCode) -> LogicalId {
    let name = format!("{}:{}", kind.as_str(), region);
    Uuid::new_v5(&LOGICAL_ID_NAMESPACE, name.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(code: &str) -> RegionCode {
        RegionCode::new(code).unwrap()
    }

    #[test]
    fn report_name_concatenates() {
        assert_eq!(report_name("Sales_", &region("Nordics")), "Sales_Nordics");
        assert_eq!(report_name("", &region("APAC")), "APAC");
    }

    #[test]
    fn minted_id_matches_uuid5_of_kind_and_region() {
        let expected = Uuid::new_v5(&LOGICAL_ID_NAMESPACE, b"model:Nordics").to_string();
        let minted = mint_logical_id(ArtifactKind::Model, &region("Nordics"));
        assert_eq!(minted.as_str(), expected);
    }

    #[test]
    fn minted_id_is_version_5() {
        let minted = mint_logical_id(ArtifactKind::Report, &region("EMEA"));
        let parsed = Uuid::parse_str(minted.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 5);
    }

    #[test]
    fn minted_id_varies_with_region_and_kind() {
        let base = mint_logical_id(ArtifactKind::Model, &region("Nordics"));
        assert_ne!(base, mint_logical_id(ArtifactKind::Model, &region("EMEA")));
        assert_ne!(base, mint_logical_id(ArtifactKind::Report, &region("Nordics")));
    }

    #[test]
    fn namespace_constant_is_stable() {
        assert_eq!(
            LOGICAL_ID_NAMESPACE.to_string(),
            "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"
        );
    }
}
