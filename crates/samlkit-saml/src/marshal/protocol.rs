//! Elements of the protocol namespace.

use super::assertion::{
    assertion_from_element, assertion_to_element, issuer_to_element, name_id_from_element,
    name_id_to_element, optional_issuer,
};
use super::{
    detached, expect_element, format_instant, new_element, optional_bool, optional_instant,
    optional_string, optional_u32, reject_unknown_children, required_attribute, required_instant,
};
use crate::error::{SamlError, SamlResult};
use crate::types::{
    AuthnContextComparison, AuthnRequest, LogoutRequest, LogoutResponse, MessageHeader,
    NameIdPolicy, RequestedAuthnContext, Response, Status, StatusCode, DSIG_NS, SAMLP_NS,
    SAMLP_PREFIX, SAML_NS, SAML_PREFIX, SAML_VERSION,
};
use crate::xml::Element;

fn samlp(local_name: &str) -> Element {
    new_element(SAMLP_PREFIX, SAMLP_NS, local_name)
}

/// Children every message may start with, in schema order.
const HEADER_CHILDREN: [(&str, &str); 3] = [
    (SAML_NS, "Issuer"),
    (DSIG_NS, "Signature"),
    (SAMLP_NS, "Extensions"),
];

/// Starts a message element: identification attributes now, the header
/// children once the caller has added its own attributes.
fn message_element(local_name: &str, header: &MessageHeader) -> Element {
    let mut element = samlp(local_name)
        .with_attribute("ID", header.id.as_str())
        .with_attribute("Version", header.version.as_str())
        .with_attribute("IssueInstant", format_instant(&header.issue_instant));
    element.set_optional_attribute("Destination", header.destination.as_deref());
    element
}

fn push_header_children(element: &mut Element, header: &MessageHeader) {
    if let Some(issuer) = &header.issuer {
        element.push_child(issuer_to_element(issuer));
    }
    if let Some(signature) = &header.signature {
        element.push_child(signature.clone());
    }
    if let Some(extensions) = &header.extensions {
        element.push_child(extensions.clone());
    }
}

/// Reads the header of a `local_name` message whose body may hold the
/// `body` children.
fn read_header(
    element: &Element,
    local_name: &str,
    body: &[(&str, &str)],
) -> SamlResult<MessageHeader> {
    expect_element(element, SAMLP_NS, local_name)?;
    reject_unknown_children(element, &[HEADER_CHILDREN.as_slice(), body].concat())?;

    let version = required_attribute(element, "Version")?;
    if version != SAML_VERSION {
        return Err(SamlError::invalid(local_name, format!("unsupported version {version}")));
    }

    Ok(MessageHeader {
        id: required_attribute(element, "ID")?.to_string(),
        version: version.to_string(),
        issue_instant: required_instant(element, "IssueInstant")?,
        issuer: optional_issuer(element)?,
        destination: optional_string(element, "Destination"),
        signature: element.find_child(DSIG_NS, "Signature").map(detached),
        extensions: element.find_child(SAMLP_NS, "Extensions").map(detached),
    })
}

fn required_status(element: &Element, local_name: &str) -> SamlResult<Status> {
    element
        .find_child(SAMLP_NS, "Status")
        .ok_or_else(|| SamlError::invalid(local_name, "missing Status"))
        .and_then(status_from_element)
}

// ============================================================================
// Status
// ============================================================================

pub(super) fn status_to_element(status: &Status) -> Element {
    let mut element = samlp("Status").with_child(status_code_to_element(&status.code));
    if let Some(message) = &status.message {
        element.push_child(samlp("StatusMessage").with_text(message.as_str()));
    }
    element
}

fn status_code_to_element(code: &StatusCode) -> Element {
    let mut element = samlp("StatusCode").with_attribute("Value", code.value.as_str());
    if let Some(sub) = &code.sub {
        element.push_child(status_code_to_element(sub));
    }
    element
}

pub(super) fn status_from_element(element: &Element) -> SamlResult<Status> {
    expect_element(element, SAMLP_NS, "Status")?;
    let code = element
        .find_child(SAMLP_NS, "StatusCode")
        .ok_or_else(|| SamlError::invalid("Status", "missing StatusCode"))?;

    Ok(Status {
        code: status_code_from_element(code)?,
        message: element
            .find_child(SAMLP_NS, "StatusMessage")
            .map(Element::text),
    })
}

fn status_code_from_element(element: &Element) -> SamlResult<StatusCode> {
    Ok(StatusCode {
        value: required_attribute(element, "Value")?.to_string(),
        sub: element
            .find_child(SAMLP_NS, "StatusCode")
            .map(status_code_from_element)
            .transpose()?
            .map(Box::new),
    })
}

// ============================================================================
// Response
// ============================================================================

pub(super) fn response_to_element(response: &Response) -> Element {
    let mut element = message_element("Response", &response.header);
    element.set_optional_attribute("InResponseTo", response.in_response_to.as_deref());
    element.set_optional_attribute("Consent", response.consent.as_deref());

    push_header_children(&mut element, &response.header);
    element.push_child(status_to_element(&response.status));
    for assertion in &response.assertions {
        element.push_child(assertion_to_element(assertion));
    }
    for encrypted in &response.encrypted_assertions {
        element.push_child(encrypted.clone());
    }
    element
}

pub(super) fn response_from_element(element: &Element) -> SamlResult<Response> {
    Ok(Response {
        header: read_header(
            element,
            "Response",
            &[
                (SAMLP_NS, "Status"),
                (SAML_NS, "Assertion"),
                (SAML_NS, "EncryptedAssertion"),
            ],
        )?,
        in_response_to: optional_string(element, "InResponseTo"),
        consent: optional_string(element, "Consent"),
        status: required_status(element, "Response")?,
        assertions: element
            .find_children(SAML_NS, "Assertion")
            .map(assertion_from_element)
            .collect::<SamlResult<_>>()?,
        encrypted_assertions: element
            .find_children(SAML_NS, "EncryptedAssertion")
            .map(detached)
            .collect(),
    })
}

// ============================================================================
// AuthnRequest
// ============================================================================

pub(super) fn authn_request_to_element(request: &AuthnRequest) -> Element {
    let mut element = message_element("AuthnRequest", &request.header);
    element.set_optional_attribute("AssertionConsumerServiceURL", request.acs_url.as_deref());
    element.set_optional_attribute(
        "AssertionConsumerServiceIndex",
        request.acs_index.map(|i| i.to_string()),
    );
    element.set_optional_attribute(
        "AttributeConsumingServiceIndex",
        request.attribute_consuming_service_index.map(|i| i.to_string()),
    );
    element.set_optional_attribute("ProtocolBinding", request.protocol_binding.as_deref());
    element.set_optional_attribute("ProviderName", request.provider_name.as_deref());
    if request.force_authn {
        element.set_attribute("ForceAuthn", "true");
    }
    if request.is_passive {
        element.set_attribute("IsPassive", "true");
    }

    push_header_children(&mut element, &request.header);
    if let Some(policy) = &request.name_id_policy {
        let mut child = samlp("NameIDPolicy");
        child.set_optional_attribute("Format", policy.format.as_deref());
        child.set_optional_attribute("SPNameQualifier", policy.sp_name_qualifier.as_deref());
        child.set_optional_attribute("AllowCreate", policy.allow_create.map(|b| b.to_string()));
        element.push_child(child);
    }
    if let Some(context) = &request.requested_authn_context {
        let mut child =
            samlp("RequestedAuthnContext").with_attribute("Comparison", context.comparison.as_str());
        for class_ref in &context.class_refs {
            child.push_child(
                new_element(SAML_PREFIX, SAML_NS, "AuthnContextClassRef").with_text(class_ref.as_str()),
            );
        }
        element.push_child(child);
    }
    element
}

pub(super) fn authn_request_from_element(element: &Element) -> SamlResult<AuthnRequest> {
    let header = read_header(
        element,
        "AuthnRequest",
        &[(SAMLP_NS, "NameIDPolicy"), (SAMLP_NS, "RequestedAuthnContext")],
    )?;

    let name_id_policy = element
        .find_child(SAMLP_NS, "NameIDPolicy")
        .map(|policy| -> SamlResult<NameIdPolicy> {
            Ok(NameIdPolicy {
                format: optional_string(policy, "Format"),
                sp_name_qualifier: optional_string(policy, "SPNameQualifier"),
                allow_create: optional_bool(policy, "AllowCreate")?,
            })
        })
        .transpose()?;

    let requested_authn_context = element
        .find_child(SAMLP_NS, "RequestedAuthnContext")
        .map(|context| -> SamlResult<RequestedAuthnContext> {
            let comparison = match context.attribute("Comparison") {
                None => AuthnContextComparison::default(),
                Some(value) => AuthnContextComparison::from_attribute(value).ok_or_else(|| {
                    SamlError::invalid("RequestedAuthnContext", format!("bad Comparison: {value}"))
                })?,
            };
            Ok(RequestedAuthnContext {
                comparison,
                class_refs: context
                    .find_children(SAML_NS, "AuthnContextClassRef")
                    .map(Element::text)
                    .collect(),
            })
        })
        .transpose()?;

    Ok(AuthnRequest {
        header,
        acs_url: optional_string(element, "AssertionConsumerServiceURL"),
        acs_index: optional_u32(element, "AssertionConsumerServiceIndex")?,
        attribute_consuming_service_index: optional_u32(element, "AttributeConsumingServiceIndex")?,
        protocol_binding: optional_string(element, "ProtocolBinding"),
        provider_name: optional_string(element, "ProviderName"),
        name_id_policy,
        requested_authn_context,
        force_authn: optional_bool(element, "ForceAuthn")?.unwrap_or(false),
        is_passive: optional_bool(element, "IsPassive")?.unwrap_or(false),
    })
}

// ============================================================================
// Logout
// ============================================================================

pub(super) fn logout_request_to_element(request: &LogoutRequest) -> Element {
    let mut element = message_element("LogoutRequest", &request.header);
    element.set_optional_attribute("Reason", request.reason.as_deref());
    element.set_optional_attribute(
        "NotOnOrAfter",
        request.not_on_or_after.as_ref().map(format_instant),
    );

    push_header_children(&mut element, &request.header);
    element.push_child(name_id_to_element(&request.name_id));
    for index in &request.session_indexes {
        element.push_child(samlp("SessionIndex").with_text(index.as_str()));
    }
    element
}

pub(super) fn logout_request_from_element(element: &Element) -> SamlResult<LogoutRequest> {
    let header = read_header(
        element,
        "LogoutRequest",
        &[(SAML_NS, "NameID"), (SAMLP_NS, "SessionIndex")],
    )?;
    let name_id = element
        .find_child(SAML_NS, "NameID")
        .ok_or_else(|| SamlError::invalid("LogoutRequest", "missing NameID"))
        .and_then(name_id_from_element)?;

    Ok(LogoutRequest {
        header,
        name_id,
        session_indexes: element
            .find_children(SAMLP_NS, "SessionIndex")
            .map(Element::text)
            .collect(),
        reason: optional_string(element, "Reason"),
        not_on_or_after: optional_instant(element, "NotOnOrAfter")?,
    })
}

pub(super) fn logout_response_to_element(response: &LogoutResponse) -> Element {
    let mut element = message_element("LogoutResponse", &response.header);
    element.set_optional_attribute("InResponseTo", response.in_response_to.as_deref());

    push_header_children(&mut element, &response.header);
    element.with_child(status_to_element(&response.status))
}

pub(super) fn logout_response_from_element(element: &Element) -> SamlResult<LogoutResponse> {
    Ok(LogoutResponse {
        header: read_header(element, "LogoutResponse", &[(SAMLP_NS, "Status")])?,
        in_response_to: optional_string(element, "InResponseTo"),
        status: required_status(element, "LogoutResponse")?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::{
        status_codes, Assertion, AuthnContextClass, LogoutReason, NameId, NameIdFormat, SamlBinding,
    };

    #[test]
    fn response_round_trip() {
        let response = Response::success("https://idp.example.com")
            .in_response_to("_req")
            .with_destination("https://sp.example.com/acs")
            .with_assertion(Assertion::new("https://idp.example.com"));

        let element = response_to_element(&response);
        assert_eq!(element.name(), "samlp:Response");
        assert_eq!(response_from_element(&element).unwrap(), response);
    }

    #[test]
    fn response_requires_status() {
        let element = message_element("Response", &MessageHeader::anonymous());
        assert_eq!(
            response_from_element(&element).unwrap_err(),
            SamlError::invalid("Response", "missing Status")
        );
    }

    fn declared(mut element: Element, prefix: &str, namespace: &str) -> Element {
        element.declare_namespace(prefix, namespace);
        element
    }

    #[test]
    fn signed_response_keeps_signature_and_encrypted_assertions() {
        let signature = declared(
            Element::new_ns("ds:Signature", DSIG_NS).with_child(
                Element::new_ns("ds:SignatureValue", DSIG_NS).with_text("c2lnbmF0dXJl"),
            ),
            "ds",
            DSIG_NS,
        );
        let xenc = "http://www.w3.org/2001/04/xmlenc#";
        let encrypted = declared(
            declared(
                new_element(SAML_PREFIX, SAML_NS, "EncryptedAssertion")
                    .with_child(Element::new_ns("xenc:EncryptedData", xenc)),
                SAML_PREFIX,
                SAML_NS,
            ),
            "xenc",
            xenc,
        );
        let extensions = declared(
            declared(
                samlp("Extensions").with_child(Element::new_ns("ex:Hint", "urn:example")),
                SAMLP_PREFIX,
                SAMLP_NS,
            ),
            "ex",
            "urn:example",
        );

        let mut response = Response::success("https://idp.example.com")
            .with_assertion(Assertion::new("https://idp.example.com"))
            .with_encrypted_assertion(encrypted);
        response.header.signature = Some(signature);
        response.header.extensions = Some(extensions);

        let element = response_to_element(&response);
        let order: Vec<_> = element.child_elements().map(Element::local_name).collect();
        assert_eq!(
            order,
            ["Issuer", "Signature", "Extensions", "Status", "Assertion", "EncryptedAssertion"]
        );

        let back = response_from_element(&element).unwrap();
        assert!(back.header.is_signed());
        assert_eq!(back.encrypted_assertions.len(), 1);
        assert_eq!(back, response);
    }

    #[test]
    fn unknown_message_children_are_rejected() {
        let mut element = authn_request_to_element(&AuthnRequest::new("https://sp"));
        element.push_child(samlp("Scoping"));
        assert_eq!(
            authn_request_from_element(&element).unwrap_err(),
            SamlError::invalid("AuthnRequest", "unsupported child samlp:Scoping")
        );

        let mut element = logout_response_to_element(&LogoutResponse::success("https://idp"));
        element.push_child(new_element(SAML_PREFIX, SAML_NS, "Assertion"));
        assert_eq!(
            logout_response_from_element(&element).unwrap_err(),
            SamlError::invalid("LogoutResponse", "unsupported child saml:Assertion")
        );
    }

    #[test]
    fn nested_status_codes() {
        let status = Status::authn_failed("bad password");
        let element = status_to_element(&status);
        let inner = element
            .find_child(SAMLP_NS, "StatusCode")
            .and_then(|code| code.find_child(SAMLP_NS, "StatusCode"))
            .unwrap();
        assert_eq!(inner.attribute("Value"), Some(status_codes::AUTHN_FAILED));
        assert_eq!(status_from_element(&element).unwrap(), status);
    }

    #[test]
    fn authn_request_round_trip() {
        let request = AuthnRequest::new("https://sp.example.com")
            .with_acs_url("https://sp.example.com/acs")
            .with_destination("https://idp.example.com/sso")
            .with_binding(SamlBinding::HttpPost)
            .with_name_id_policy(NameIdPolicy::with_format(NameIdFormat::Email).allow_create(true))
            .with_authn_context(
                RequestedAuthnContext::exact(AuthnContextClass::Password)
                    .with_class_ref(AuthnContextClass::X509)
                    .with_comparison(AuthnContextComparison::Minimum),
            )
            .force_authn(true)
            .with_provider_name("Example SP");

        let element = authn_request_to_element(&request);
        assert_eq!(element.attribute("ForceAuthn"), Some("true"));
        assert_eq!(element.attribute("IsPassive"), None);
        assert_eq!(authn_request_from_element(&element).unwrap(), request);
    }

    #[test]
    fn authn_request_rejects_bad_attributes() {
        let mut element = authn_request_to_element(&AuthnRequest::new("https://sp"));
        element.set_attribute("ForceAuthn", "yes");
        assert!(authn_request_from_element(&element).is_err());

        let mut element = authn_request_to_element(&AuthnRequest::new("https://sp"));
        element.set_attribute("IssueInstant", "yesterday");
        assert!(authn_request_from_element(&element).is_err());

        let mut element = authn_request_to_element(&AuthnRequest::new("https://sp"));
        element.set_attribute("Version", "1.1");
        assert_eq!(
            authn_request_from_element(&element).unwrap_err(),
            SamlError::invalid("AuthnRequest", "unsupported version 1.1")
        );
    }

    #[test]
    fn logout_round_trip() {
        let request = LogoutRequest::new("https://sp.example.com", NameId::transient("_t"))
            .with_session_index("_s1")
            .with_session_index("_s2")
            .with_reason(LogoutReason::User)
            .expires_in(Duration::minutes(5));
        let element = logout_request_to_element(&request);
        assert_eq!(logout_request_from_element(&element).unwrap(), request);

        let response = LogoutResponse::partial_logout("https://idp.example.com").in_response_to(&request.header.id);
        let element = logout_response_to_element(&response);
        assert_eq!(logout_response_from_element(&element).unwrap(), response);
    }

    #[test]
    fn logout_request_requires_name_id() {
        let element = message_element("LogoutRequest", &MessageHeader::new("https://sp"));
        assert!(matches!(
            logout_request_from_element(&element),
            Err(SamlError::InvalidProtocolObject { .. })
        ));
    }
}
