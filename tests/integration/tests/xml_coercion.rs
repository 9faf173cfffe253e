//! XML element, protocol object and serialization coercion.

use std::sync::Arc;

use chrono::Duration;
use samlkit_saml::{
    bootstrap, to_element, to_logout_request, to_protocol_object, to_response, to_xml_string,
    Assertion, Attribute, AttributeStatement, AuthnContextClass, AuthnStatement, Conditions,
    Element, LogoutRequest, Markup, NameId, ObjectKind, ProtocolObject, Response, SamlError, SamlResult,
    Subject, SubjectConfirmation, SubjectConfirmationData, XmlInput, SAMLP_NS, SAML_NS,
};

use crate::common;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

fn response_markup() -> Markup {
    Markup::new("samlp:Response")
        .attr("xmlns:samlp", SAMLP_NS)
        .attr("xmlns:saml", SAML_NS)
        .attr("ID", "_8e8dc5f69a98cc4c1ff3427e5ce34606fd672f91e6")
        .attr("Version", "2.0")
        .attr("IssueInstant", "2014-07-17T01:01:48Z")
        .attr("Destination", "http://sp.example.com/demo1/index.php?acs")
        .attr("InResponseTo", "ONELOGIN_4fee3b046395c4e751011e97f8900b5273d56685")
        .child(Markup::new("saml:Issuer").text("http://idp.example.com/metadata.php"))
        .child(
            Markup::new("samlp:Status").child(
                Markup::new("samlp:StatusCode")
                    .attr("Value", "urn:oasis:names:tc:SAML:2.0:status:Success"),
            ),
        )
}

fn full_assertion() -> Assertion {
    Assertion::new("https://idp.example.com")
        .with_subject(
            Subject::new(NameId::email("alice@example.com")).with_confirmation(
                SubjectConfirmation::bearer().with_data(SubjectConfirmationData::for_request(
                    "_req",
                    "https://sp.example.com/acs",
                )),
            ),
        )
        .with_conditions(Conditions::starting_now(Duration::minutes(5)).with_audience("https://sp.example.com"))
        .with_authn_statement(
            AuthnStatement::new(AuthnContextClass::PasswordProtectedTransport)
                .with_session_index("_session"),
        )
        .with_attribute_statement(
            AttributeStatement::default()
                .with_attribute(Attribute::new("role", "admin").with_value("user")),
        )
}

#[test]
fn markup_literal_serializes_and_parses() -> anyhow::Result<()> {
    common::init_tracing();
    let input = XmlInput::from(response_markup());

    let text = to_xml_string(Some(&input))?.ok_or_else(|| anyhow::anyhow!("no text"))?;
    assert!(text.starts_with(DECLARATION));

    let element = to_element(Some(&input))?.ok_or_else(|| anyhow::anyhow!("no element"))?;
    assert_eq!(element.name(), "samlp:Response");
    assert_eq!(element.namespace(), Some(SAMLP_NS));
    Ok(())
}

#[test]
fn markup_literal_becomes_response() -> anyhow::Result<()> {
    let response = to_response(Some(&XmlInput::from(response_markup())))?
        .ok_or_else(|| anyhow::anyhow!("no response"))?;
    assert!(response.is_success());
    assert_eq!(
        response.in_response_to.as_deref(),
        Some("ONELOGIN_4fee3b046395c4e751011e97f8900b5273d56685")
    );
    assert_eq!(
        response.header.issuer_id(),
        Some("http://idp.example.com/metadata.php")
    );
    Ok(())
}

#[test]
fn text_round_trips_through_element() -> anyhow::Result<()> {
    let text = to_xml_string(Some(&XmlInput::from(response_markup())))?
        .ok_or_else(|| anyhow::anyhow!("no text"))?;
    let element = to_element(Some(&XmlInput::from(text.as_str())))?
        .ok_or_else(|| anyhow::anyhow!("no element"))?;

    let again = to_xml_string(Some(&XmlInput::from(element)))?;
    assert_eq!(again.as_deref(), Some(text.as_str()));
    Ok(())
}

#[test]
fn response_with_assertion_round_trips() -> anyhow::Result<()> {
    let response = Response::success("https://idp.example.com")
        .in_response_to("_req")
        .with_destination("https://sp.example.com/acs")
        .with_assertion(full_assertion());
    let object = ProtocolObject::from(response.clone());

    let element = to_element(Some(&XmlInput::from(object.clone())))?
        .ok_or_else(|| anyhow::anyhow!("no element"))?;
    let back = to_protocol_object(Some(&XmlInput::from(element)))?;
    assert_eq!(back, Some(object));

    let text = to_xml_string(Some(&XmlInput::from(response.clone())))?
        .ok_or_else(|| anyhow::anyhow!("no text"))?;
    assert_eq!(to_response(Some(&XmlInput::from(text)))?, Some(response));
    Ok(())
}

const SIGNED_RESPONSE: &str = r##"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
    xmlns:ds="http://www.w3.org/2000/09/xmldsig#"
    xmlns:xenc="http://www.w3.org/2001/04/xmlenc#"
    ID="_signed" Version="2.0" IssueInstant="2014-07-17T01:01:48Z">
  <saml:Issuer>http://idp.example.com/metadata.php</saml:Issuer>
  <ds:Signature>
    <ds:SignedInfo>
      <ds:Reference URI="#_signed"/>
    </ds:SignedInfo>
    <ds:SignatureValue>c2lnbmF0dXJl</ds:SignatureValue>
  </ds:Signature>
  <samlp:Status>
    <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
  </samlp:Status>
  <saml:EncryptedAssertion>
    <xenc:EncryptedData>
      <xenc:CipherData>
        <xenc:CipherValue>ZW5jcnlwdGVk</xenc:CipherValue>
      </xenc:CipherData>
    </xenc:EncryptedData>
  </saml:EncryptedAssertion>
</samlp:Response>"##;

#[test]
fn signed_response_keeps_signature_and_encrypted_assertion() -> anyhow::Result<()> {
    let response = to_response(Some(&XmlInput::from(SIGNED_RESPONSE)))?
        .ok_or_else(|| anyhow::anyhow!("no response"))?;
    assert!(response.header.is_signed());
    assert!(response.assertions.is_empty());
    assert_eq!(response.encrypted_assertions.len(), 1);

    let text = to_xml_string(Some(&XmlInput::from(response.clone())))?
        .ok_or_else(|| anyhow::anyhow!("no text"))?;
    assert!(text.contains("<ds:Signature"));
    assert!(text.contains("c2lnbmF0dXJl"));
    assert!(text.contains("<saml:EncryptedAssertion"));
    assert!(text.contains("ZW5jcnlwdGVk"));

    let issuer = text.find("<saml:Issuer").unwrap_or(usize::MAX);
    let signature = text.find("<ds:Signature").unwrap_or(usize::MAX);
    let status = text.find("<samlp:Status").unwrap_or(usize::MAX);
    assert!(issuer < signature && signature < status);

    assert_eq!(to_response(Some(&XmlInput::from(text)))?, Some(response));
    Ok(())
}

#[test]
fn unsupported_child_is_an_error() {
    let text = SIGNED_RESPONSE.replace(
        "<saml:EncryptedAssertion>",
        "<samlp:Scoping/><saml:EncryptedAssertion>",
    );
    assert_eq!(
        to_response(Some(&XmlInput::from(text))).unwrap_err(),
        SamlError::invalid("Response", "unsupported child samlp:Scoping")
    );
}

#[test]
fn logout_request_narrowing() -> anyhow::Result<()> {
    let request = LogoutRequest::new("https://sp.example.com", NameId::persistent("abc"))
        .with_session_index("_session")
        .with_destination("https://idp.example.com/slo");
    let text = to_xml_string(Some(&XmlInput::from(request.clone())))?
        .ok_or_else(|| anyhow::anyhow!("no text"))?;

    assert_eq!(to_logout_request(Some(&XmlInput::from(text.as_str())))?, Some(request));
    assert_eq!(
        to_response(Some(&XmlInput::from(text))).unwrap_err(),
        SamlError::IncompatibleProtocolType {
            expected: ObjectKind::Response,
            actual: ObjectKind::LogoutRequest,
        }
    );
    Ok(())
}

#[test]
fn invalid_response_content() {
    let markup = Markup::new("samlp:Response")
        .attr("xmlns:samlp", SAMLP_NS)
        .attr("ID", "_r")
        .attr("Version", "2.0")
        .attr("IssueInstant", "2014-07-17T01:01:48Z");
    let err = to_response(Some(&XmlInput::from(markup))).unwrap_err();
    assert_eq!(err, SamlError::invalid("Response", "missing Status"));
}

#[test]
fn doctype_is_rejected() {
    let text = "<!DOCTYPE r [<!ENTITY x \"y\">]><r>&x;</r>";
    let err = to_element(Some(&XmlInput::from(text))).unwrap_err();
    assert!(matches!(err, SamlError::MalformedXml(_)));
}

#[test]
fn custom_unmarshaller_extends_registry() -> anyhow::Result<()> {
    const NS: &str = "urn:example:extension";

    let registry = bootstrap::registry()?;
    registry.register_unmarshaller(
        NS,
        "Ping",
        Arc::new(|e: &Element| -> SamlResult<ProtocolObject> {
            Ok(ProtocolObject::Issuer(e.text().into()))
        }),
    );

    let text = format!("<x:Ping xmlns:x=\"{NS}\">pong</x:Ping>");
    let object = to_protocol_object(Some(&XmlInput::from(text)))?;
    assert_eq!(object.map(|o| o.kind()), Some(ObjectKind::Issuer));

    assert!(registry.deregister_unmarshaller(NS, "Ping"));
    Ok(())
}
