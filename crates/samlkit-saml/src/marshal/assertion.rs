//! Elements of the assertion namespace.

use super::{
    detached, expect_element, format_instant, new_element, optional_instant, optional_string,
    reject_unknown_children, required_attribute, required_instant,
};
use crate::error::{SamlError, SamlResult};
use crate::types::{
    Assertion, Attribute, AttributeStatement, AudienceRestriction, AuthnStatement, Conditions,
    Issuer, NameId, Subject, SubjectConfirmation, SubjectConfirmationData, DSIG_NS, SAML_NS,
    SAML_PREFIX, SAML_VERSION,
};
use crate::xml::Element;

fn saml(local_name: &str) -> Element {
    new_element(SAML_PREFIX, SAML_NS, local_name)
}

// ============================================================================
// Issuer and NameID
// ============================================================================

pub(super) fn issuer_to_element(issuer: &Issuer) -> Element {
    let mut element = saml("Issuer");
    element.set_optional_attribute("Format", issuer.format.as_deref());
    element.with_text(issuer.value.as_str())
}

pub(super) fn issuer_from_element(element: &Element) -> SamlResult<Issuer> {
    expect_element(element, SAML_NS, "Issuer")?;
    Ok(Issuer {
        value: element.text(),
        format: optional_string(element, "Format"),
    })
}

pub(super) fn name_id_to_element(name_id: &NameId) -> Element {
    let mut element = saml("NameID");
    element.set_optional_attribute("Format", name_id.format.as_deref());
    element.set_optional_attribute("NameQualifier", name_id.name_qualifier.as_deref());
    element.set_optional_attribute("SPNameQualifier", name_id.sp_name_qualifier.as_deref());
    element.with_text(name_id.value.as_str())
}

pub(super) fn name_id_from_element(element: &Element) -> SamlResult<NameId> {
    expect_element(element, SAML_NS, "NameID")?;
    Ok(NameId {
        value: element.text(),
        format: optional_string(element, "Format"),
        name_qualifier: optional_string(element, "NameQualifier"),
        sp_name_qualifier: optional_string(element, "SPNameQualifier"),
    })
}

/// Reads the optional `saml:Issuer` child of a message.
pub(super) fn optional_issuer(element: &Element) -> SamlResult<Option<Issuer>> {
    element
        .find_child(SAML_NS, "Issuer")
        .map(issuer_from_element)
        .transpose()
}

// ============================================================================
// Assertion
// ============================================================================

pub(super) fn assertion_to_element(assertion: &Assertion) -> Element {
    let mut element = saml("Assertion")
        .with_attribute("ID", assertion.id.as_str())
        .with_attribute("Version", assertion.version.as_str())
        .with_attribute("IssueInstant", format_instant(&assertion.issue_instant))
        .with_child(issuer_to_element(&assertion.issuer));

    if let Some(signature) = &assertion.signature {
        element.push_child(signature.clone());
    }
    if let Some(subject) = &assertion.subject {
        element.push_child(subject_to_element(subject));
    }
    if let Some(conditions) = &assertion.conditions {
        element.push_child(conditions_to_element(conditions));
    }
    if let Some(advice) = &assertion.advice {
        element.push_child(advice.clone());
    }
    for statement in &assertion.authn_statements {
        element.push_child(authn_statement_to_element(statement));
    }
    for statement in &assertion.attribute_statements {
        element.push_child(attribute_statement_to_element(statement));
    }
    element
}

pub(super) fn assertion_from_element(element: &Element) -> SamlResult<Assertion> {
    expect_element(element, SAML_NS, "Assertion")?;
    reject_unknown_children(
        element,
        &[
            (SAML_NS, "Issuer"),
            (DSIG_NS, "Signature"),
            (SAML_NS, "Subject"),
            (SAML_NS, "Conditions"),
            (SAML_NS, "Advice"),
            (SAML_NS, "AuthnStatement"),
            (SAML_NS, "AttributeStatement"),
        ],
    )?;

    let version = required_attribute(element, "Version")?;
    if version != SAML_VERSION {
        return Err(SamlError::invalid("Assertion", format!("unsupported version {version}")));
    }
    let issuer = optional_issuer(element)?
        .ok_or_else(|| SamlError::invalid("Assertion", "missing Issuer"))?;

    Ok(Assertion {
        id: required_attribute(element, "ID")?.to_string(),
        version: version.to_string(),
        issue_instant: required_instant(element, "IssueInstant")?,
        issuer,
        signature: element.find_child(DSIG_NS, "Signature").map(detached),
        subject: element
            .find_child(SAML_NS, "Subject")
            .map(subject_from_element)
            .transpose()?,
        conditions: element
            .find_child(SAML_NS, "Conditions")
            .map(conditions_from_element)
            .transpose()?,
        advice: element.find_child(SAML_NS, "Advice").map(detached),
        authn_statements: element
            .find_children(SAML_NS, "AuthnStatement")
            .map(authn_statement_from_element)
            .collect::<SamlResult<_>>()?,
        attribute_statements: element
            .find_children(SAML_NS, "AttributeStatement")
            .map(attribute_statement_from_element)
            .collect::<SamlResult<_>>()?,
    })
}

// ============================================================================
// Subject
// ============================================================================

fn subject_to_element(subject: &Subject) -> Element {
    let mut element = saml("Subject");
    if let Some(name_id) = &subject.name_id {
        element.push_child(name_id_to_element(name_id));
    }
    for confirmation in &subject.confirmations {
        let mut child = saml("SubjectConfirmation").with_attribute("Method", confirmation.method.as_str());
        if let Some(data) = &confirmation.data {
            child.push_child(confirmation_data_to_element(data));
        }
        element.push_child(child);
    }
    element
}

fn confirmation_data_to_element(data: &SubjectConfirmationData) -> Element {
    let mut element = saml("SubjectConfirmationData");
    element.set_optional_attribute("NotBefore", data.not_before.as_ref().map(format_instant));
    element.set_optional_attribute("NotOnOrAfter", data.not_on_or_after.as_ref().map(format_instant));
    element.set_optional_attribute("Recipient", data.recipient.as_deref());
    element.set_optional_attribute("InResponseTo", data.in_response_to.as_deref());
    element.set_optional_attribute("Address", data.address.as_deref());
    element
}

fn subject_from_element(element: &Element) -> SamlResult<Subject> {
    reject_unknown_children(element, &[(SAML_NS, "NameID"), (SAML_NS, "SubjectConfirmation")])?;
    let name_id = element
        .find_child(SAML_NS, "NameID")
        .map(name_id_from_element)
        .transpose()?;

    let confirmations = element
        .find_children(SAML_NS, "SubjectConfirmation")
        .map(|child| -> SamlResult<SubjectConfirmation> {
            reject_unknown_children(child, &[(SAML_NS, "SubjectConfirmationData")])?;
            Ok(SubjectConfirmation {
                method: required_attribute(child, "Method")?.to_string(),
                data: child
                    .find_child(SAML_NS, "SubjectConfirmationData")
                    .map(confirmation_data_from_element)
                    .transpose()?,
            })
        })
        .collect::<SamlResult<_>>()?;

    Ok(Subject {
        name_id,
        confirmations,
    })
}

fn confirmation_data_from_element(element: &Element) -> SamlResult<SubjectConfirmationData> {
    Ok(SubjectConfirmationData {
        in_response_to: optional_string(element, "InResponseTo"),
        not_on_or_after: optional_instant(element, "NotOnOrAfter")?,
        not_before: optional_instant(element, "NotBefore")?,
        recipient: optional_string(element, "Recipient"),
        address: optional_string(element, "Address"),
    })
}

// ============================================================================
// Conditions
// ============================================================================

fn conditions_to_element(conditions: &Conditions) -> Element {
    let mut element = saml("Conditions");
    element.set_optional_attribute("NotBefore", conditions.not_before.as_ref().map(format_instant));
    element.set_optional_attribute(
        "NotOnOrAfter",
        conditions.not_on_or_after.as_ref().map(format_instant),
    );
    for restriction in &conditions.audience_restrictions {
        let mut child = saml("AudienceRestriction");
        for audience in &restriction.audiences {
            child.push_child(saml("Audience").with_text(audience.as_str()));
        }
        element.push_child(child);
    }
    if conditions.one_time_use {
        element.push_child(saml("OneTimeUse"));
    }
    element
}

fn conditions_from_element(element: &Element) -> SamlResult<Conditions> {
    reject_unknown_children(element, &[(SAML_NS, "AudienceRestriction"), (SAML_NS, "OneTimeUse")])?;
    Ok(Conditions {
        not_before: optional_instant(element, "NotBefore")?,
        not_on_or_after: optional_instant(element, "NotOnOrAfter")?,
        audience_restrictions: element
            .find_children(SAML_NS, "AudienceRestriction")
            .map(|child| AudienceRestriction {
                audiences: child.find_children(SAML_NS, "Audience").map(Element::text).collect(),
            })
            .collect(),
        one_time_use: element.find_child(SAML_NS, "OneTimeUse").is_some(),
    })
}

// ============================================================================
// Statements
// ============================================================================

fn authn_statement_to_element(statement: &AuthnStatement) -> Element {
    let mut element =
        saml("AuthnStatement").with_attribute("AuthnInstant", format_instant(&statement.authn_instant));
    element.set_optional_attribute("SessionIndex", statement.session_index.as_deref());
    element.set_optional_attribute(
        "SessionNotOnOrAfter",
        statement.session_not_on_or_after.as_ref().map(format_instant),
    );

    let mut context = saml("AuthnContext");
    if let Some(class_ref) = &statement.class_ref {
        context.push_child(saml("AuthnContextClassRef").with_text(class_ref.as_str()));
    }
    element.with_child(context)
}

fn authn_statement_from_element(element: &Element) -> SamlResult<AuthnStatement> {
    Ok(AuthnStatement {
        authn_instant: required_instant(element, "AuthnInstant")?,
        session_index: optional_string(element, "SessionIndex"),
        session_not_on_or_after: optional_instant(element, "SessionNotOnOrAfter")?,
        class_ref: element
            .find_child(SAML_NS, "AuthnContext")
            .and_then(|context| context.find_child(SAML_NS, "AuthnContextClassRef"))
            .map(Element::text),
    })
}

fn attribute_statement_to_element(statement: &AttributeStatement) -> Element {
    let mut element = saml("AttributeStatement");
    for attribute in &statement.attributes {
        let mut child = saml("Attribute").with_attribute("Name", attribute.name.as_str());
        child.set_optional_attribute("NameFormat", attribute.name_format.as_deref());
        child.set_optional_attribute("FriendlyName", attribute.friendly_name.as_deref());
        for value in &attribute.values {
            child.push_child(saml("AttributeValue").with_text(value.as_str()));
        }
        element.push_child(child);
    }
    element
}

fn attribute_statement_from_element(element: &Element) -> SamlResult<AttributeStatement> {
    reject_unknown_children(element, &[(SAML_NS, "Attribute")])?;
    let attributes = element
        .find_children(SAML_NS, "Attribute")
        .map(|child| -> SamlResult<Attribute> {
            Ok(Attribute {
                name: required_attribute(child, "Name")?.to_string(),
                name_format: optional_string(child, "NameFormat"),
                friendly_name: optional_string(child, "FriendlyName"),
                values: child
                    .find_children(SAML_NS, "AttributeValue")
                    .map(Element::text)
                    .collect(),
            })
        })
        .collect::<SamlResult<_>>()?;
    Ok(AttributeStatement { attributes })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::types::{AuthnContextClass, NameIdFormat};

    fn instant(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    fn full_assertion() -> Assertion {
        let mut assertion = Assertion::new(Issuer::entity("https://idp.example.com"))
            .with_id("_a1")
            .with_subject(
                Subject::new(NameId::new("user").with_format(NameIdFormat::Persistent))
                    .with_confirmation(SubjectConfirmation::bearer().with_data(
                        SubjectConfirmationData::for_request("_req", "https://sp.example.com/acs"),
                    )),
            )
            .with_conditions(
                Conditions::starting_now(Duration::minutes(5))
                    .with_audience("https://sp.example.com")
                    .one_time_use(),
            )
            .with_authn_statement(
                AuthnStatement::new(AuthnContextClass::Password).with_session_index("_s1"),
            )
            .with_attribute_statement(
                AttributeStatement::default()
                    .with_attribute(Attribute::new("role", "admin").with_value("user")),
            );
        assertion.issue_instant = instant("2024-01-01T00:00:00Z");
        assertion
    }

    #[test]
    fn assertion_round_trip() {
        let assertion = full_assertion();
        let element = assertion_to_element(&assertion);
        assert_eq!(element.name(), "saml:Assertion");
        assert_eq!(element.attribute("IssueInstant"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(assertion_from_element(&element).unwrap(), assertion);
    }

    #[test]
    fn assertion_requires_issuer_and_version() {
        let mut element = assertion_to_element(&full_assertion());
        element.set_attribute("Version", "1.1");
        assert!(matches!(
            assertion_from_element(&element),
            Err(SamlError::InvalidProtocolObject { .. })
        ));

        let bare = saml("Assertion")
            .with_attribute("ID", "_a")
            .with_attribute("Version", "2.0")
            .with_attribute("IssueInstant", "2024-01-01T00:00:00Z");
        let err = assertion_from_element(&bare).unwrap_err();
        assert_eq!(err, SamlError::invalid("Assertion", "missing Issuer"));
    }

    #[test]
    fn signature_and_advice_survive_round_trip() {
        let mut signature = Element::new_ns("ds:Signature", DSIG_NS)
            .with_child(Element::new_ns("ds:SignatureValue", DSIG_NS).with_text("c2lnbmF0dXJl"));
        signature.declare_namespace("ds", DSIG_NS);
        let mut advice = saml("Advice").with_child(saml("AssertionIDRef").with_text("_other"));
        advice.declare_namespace(SAML_PREFIX, SAML_NS);

        let mut assertion = full_assertion();
        assertion.signature = Some(signature);
        assertion.advice = Some(advice);

        let element = assertion_to_element(&assertion);
        let order: Vec<_> = element.child_elements().map(Element::local_name).collect();
        assert_eq!(
            order,
            [
                "Issuer",
                "Signature",
                "Subject",
                "Conditions",
                "Advice",
                "AuthnStatement",
                "AttributeStatement"
            ]
        );

        let back = assertion_from_element(&element).unwrap();
        assert!(back.is_signed());
        assert_eq!(back, assertion);
    }

    #[test]
    fn unknown_assertion_children_are_rejected() {
        let mut element = assertion_to_element(&full_assertion());
        element.push_child(saml("AuthzDecisionStatement"));
        assert_eq!(
            assertion_from_element(&element).unwrap_err(),
            SamlError::invalid("Assertion", "unsupported child saml:AuthzDecisionStatement")
        );
    }

    #[test]
    fn encrypted_subject_parts_are_rejected() {
        let mut subject = saml("Subject");
        subject.push_child(saml("EncryptedID"));
        assert_eq!(
            subject_from_element(&subject).unwrap_err(),
            SamlError::invalid("Subject", "unsupported child saml:EncryptedID")
        );

        let statement = saml("AttributeStatement").with_child(saml("EncryptedAttribute"));
        assert_eq!(
            attribute_statement_from_element(&statement).unwrap_err(),
            SamlError::invalid("AttributeStatement", "unsupported child saml:EncryptedAttribute")
        );
    }

    #[test]
    fn name_id_rejects_other_elements() {
        assert!(name_id_from_element(&saml("Issuer")).is_err());
        let issuer = issuer_from_element(&saml("Issuer").with_text("https://idp")).unwrap();
        assert_eq!(issuer, Issuer::new("https://idp"));
    }
}
