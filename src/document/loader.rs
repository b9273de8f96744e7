//! Reading and writing YAML substation documents.

use log::{info, warn};
use std::path::Path;

use super::host::DocumentError;
use super::types::SclDocument;
use crate::utils::validation::validate_ied_name;

/// Load and parse a substation document from a YAML file
pub fn load_document(path: &Path) -> Result<SclDocument, DocumentError> {
    info!("Loading document from: {:?}", path);

    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let document: SclDocument = serde_yaml::from_str(&content).map_err(|source| DocumentError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    for ied in &document.ieds {
        if let Err(e) = validate_ied_name(&ied.name) {
            warn!("{}", e);
        }
    }

    let malformed = document.check_address_formats();
    if malformed > 0 {
        warn!("{} malformed address values will be ignored when scanning for used values", malformed);
    }
    if document.communication.is_none() {
        warn!("Document {:?} has no Communication section", path);
    }

    Ok(document)
}

/// Serialize a document back to YAML
pub fn save_document(document: &SclDocument, path: &Path) -> Result<(), DocumentError> {
    let yaml = serde_yaml::to_string(document)?;
    std::fs::write(path, yaml).map_err(|source| DocumentError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!("Wrote document to: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HostDocument;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"
ieds:
  - name: BAY1_P1
    type: RELAY
    control_blocks:
      - family: GSE
        name: CtlBreaker
        ld_inst: CTRL
        app_id: BAY1_P1_CtlBreaker
communication:
  sub_networks:
    - name: StationBus
      connected_aps:
        - ied_name: BAY1_P1
          ap_name: P1
          gse:
            - ld_inst: CTRL
              cb_name: CtlBreaker
              address:
                MAC-Address: 01-0C-CD-01-00-00
                APPID: "8001"
                VLAN-ID: "068"
                VLAN-PRIORITY: "6"
              min_time: "4"
              max_time: "1000"
substation:
  bays:
    - name: Bus A
      bus_connections: [BAY1_P1]
"#;

    #[test]
    fn test_load_document() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", DOCUMENT).unwrap();

        let doc = load_document(temp_file.path()).unwrap();
        assert_eq!(doc.ieds.len(), 1);
        assert_eq!(doc.publishers().len(), 1);
        assert_eq!(doc.bus_name_for_device("BAY1_P1").as_deref(), Some("Bus A"));
    }

    #[test]
    fn test_save_and_reload() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", DOCUMENT).unwrap();
        let doc = load_document(temp_file.path()).unwrap();

        let out = NamedTempFile::new().unwrap();
        save_document(&doc, out.path()).unwrap();
        let reloaded = load_document(out.path()).unwrap();
        assert_eq!(doc, reloaded);
    }

    #[test]
    fn test_missing_file() {
        let result = load_document(Path::new("/nonexistent/substation.yaml"));
        assert!(matches!(result, Err(DocumentError::Read { .. })));
    }

    #[test]
    fn test_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "ieds: [{{ name: ").unwrap();
        let result = load_document(temp_file.path());
        assert!(matches!(result, Err(DocumentError::Parse { .. })));
    }
}
