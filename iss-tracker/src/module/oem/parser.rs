///! OEM XML parser
///!
///! Decodes the ISS trajectory data document
///! (`<ndm><oem><header/><body><segment>...</segment></body></oem></ndm>`)
///! into an [`OemDocument`].

use super::types::OemDocument;
use crate::error::TrackerError;

/// Parse an OEM XML document.
pub fn parse_oem_xml(xml: &str) -> Result<OemDocument, TrackerError> {
    let document: OemDocument = quick_xml::de::from_str(xml)?;

    tracing::debug!(
        "Parsed OEM document: {} comments, {} state vectors",
        document.comments().len(),
        document.state_vectors().len()
    );

    Ok(document)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_OEM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ndm xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="http://sanaregistry.org/r/ndmxml_unqualified/ndmxml-2.0.0-master-2.0.xsd">
  <oem id="CCSDS_OEM_VERS" version="2.0">
    <header>
      <CREATION_DATE>2024-047T04:30:38.722Z</CREATION_DATE>
      <ORIGINATOR>JSC</ORIGINATOR>
    </header>
    <body>
      <segment>
        <metadata>
          <OBJECT_NAME>ISS</OBJECT_NAME>
          <OBJECT_ID>1998-067-A</OBJECT_ID>
          <CENTER_NAME>EARTH</CENTER_NAME>
          <REF_FRAME>EME2000</REF_FRAME>
          <TIME_SYSTEM>UTC</TIME_SYSTEM>
          <START_TIME>2024-047T12:00:00.000Z</START_TIME>
          <STOP_TIME>2024-047T12:08:00.000Z</STOP_TIME>
        </metadata>
        <data>
          <COMMENT>Source: This file was produced by the TOPO office within FOD at JSC.</COMMENT>
          <COMMENT>Units are in kg and m^2</COMMENT>
          <stateVector>
            <EPOCH>2024-047T12:00:00.000Z</EPOCH>
            <X units="km">3</X>
            <Y units="km">4</Y>
            <Z units="km">0</Z>
            <X_DOT units="km/s">1</X_DOT>
            <Y_DOT units="km/s">2</Y_DOT>
            <Z_DOT units="km/s">2</Z_DOT>
          </stateVector>
          <stateVector>
            <EPOCH>2024-047T12:04:00.000Z</EPOCH>
            <X units="km">-4945.0591</X>
            <Y units="km">-3808.7325</Y>
            <Z units="km">-2664.0541</Z>
            <X_DOT units="km/s">3.1434</X_DOT>
            <Y_DOT units="km/s">-6.2141</Y_DOT>
            <Z_DOT units="km/s">3.0441</Z_DOT>
          </stateVector>
          <stateVector>
            <EPOCH>2024-047T12:08:00.000Z</EPOCH>
            <X units="km">0</X>
            <Y units="km">6771</Y>
            <Z units="km">0</Z>
            <X_DOT units="km/s">N/A</X_DOT>
            <Y_DOT units="km/s">0</Y_DOT>
            <Z_DOT units="km/s">0</Z_DOT>
          </stateVector>
        </data>
      </segment>
    </body>
  </oem>
</ndm>
"#;

    #[test]
    fn test_parse_envelope() {
        let doc = parse_oem_xml(SAMPLE_OEM).unwrap();
        assert_eq!(doc.header().originator, "JSC");
        assert_eq!(doc.header().creation_date, "2024-047T04:30:38.722Z");
        assert_eq!(doc.metadata().object_name, "ISS");
        assert_eq!(doc.metadata().ref_frame, "EME2000");
        assert_eq!(doc.comments().len(), 2);
        assert_eq!(doc.comments()[1], "Units are in kg and m^2");
    }

    #[test]
    fn test_parse_state_vectors() {
        let doc = parse_oem_xml(SAMPLE_OEM).unwrap();
        let vectors = doc.state_vectors();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[1].epoch, "2024-047T12:04:00.000Z");
        assert_eq!(vectors[1].x.text, "-4945.0591");
        assert_eq!(vectors[1].x.units.as_deref(), Some("km"));
        assert_eq!(vectors[1].y_dot.units.as_deref(), Some("km/s"));
        // Non-numeric text survives parsing untouched
        assert_eq!(vectors[2].x_dot.text, "N/A");
    }

    #[test]
    fn test_state_vector_json_matches_upstream_shape() {
        let doc = parse_oem_xml(SAMPLE_OEM).unwrap();
        let json = serde_json::to_value(&doc.state_vectors()[0]).unwrap();
        assert_eq!(json["EPOCH"], "2024-047T12:00:00.000Z");
        assert_eq!(json["X"]["#text"], "3");
        assert_eq!(json["X"]["@units"], "km");
        assert_eq!(json["Z_DOT"]["#text"], "2");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_oem_xml("<html><body>Service Unavailable</body></html>"),
            Err(TrackerError::Xml(_))
        ));
    }
}
