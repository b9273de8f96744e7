//! Publisher identifier normalisation.

use crate::document::{Publisher, ServiceFamily};

/// Placeholder smvID left by templates.
pub const SMV_TEMPLATE_ID: &str = "TEMPLATE";

/// The identifier a publisher should carry.
///
/// GOOSE appIDs become `<device>_<name>`. SMV smvIDs become `<device>` when
/// still the template placeholder, get the device prepended when they do not
/// start with it, and are kept otherwise.
pub fn normalized_identifier(publisher: &Publisher) -> String {
    let device = publisher.device();
    match publisher.family() {
        ServiceFamily::Gse => format!("{}_{}", device, publisher.name()),
        ServiceFamily::Smv if publisher.identifier == SMV_TEMPLATE_ID => device.to_string(),
        ServiceFamily::Smv if !publisher.identifier.starts_with(device) => {
            format!("{}_{}", device, publisher.identifier)
        }
        ServiceFamily::Smv => publisher.identifier.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PublisherKey;

    fn publisher(family: ServiceFamily, name: &str, identifier: &str) -> Publisher {
        Publisher {
            key: PublisherKey {
                device: "BAY1_P1".to_string(),
                ld_inst: "LD0".to_string(),
                name: name.to_string(),
                family,
            },
            identifier: identifier.to_string(),
        }
    }

    #[test]
    fn test_goose_app_id() {
        let p = publisher(ServiceFamily::Gse, "CtlBreaker", "whatever");
        assert_eq!(normalized_identifier(&p), "BAY1_P1_CtlBreaker");
    }

    #[test]
    fn test_smv_template_and_prefixing() {
        assert_eq!(normalized_identifier(&publisher(ServiceFamily::Smv, "MSVCB01", "TEMPLATE")), "BAY1_P1");
        assert_eq!(
            normalized_identifier(&publisher(ServiceFamily::Smv, "MSVCB01", "Phase")),
            "BAY1_P1_Phase"
        );
        assert_eq!(
            normalized_identifier(&publisher(ServiceFamily::Smv, "MSVCB01", "BAY1_P1_VTSelStn")),
            "BAY1_P1_VTSelStn"
        );
    }
}
