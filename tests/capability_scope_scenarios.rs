//! Behavioural integration tests for capability-scoped discriminators.
//!
//! These tests exercise the two registry tiers against the process-wide
//! default registry: a global tag shared by every capability set, a
//! specialised tag that shadows it inside one set, and the bind step
//! that extends decoding to a further set.

use polybox::{Poly, PolyValue, capability};
use serde::{Deserialize, Serialize};

/// Broad capability set with the long, globally unique tags.
trait Job: PolyValue {
    fn describe(&self) -> String;
}
capability!(Job);

/// Narrow capability set that prefers short tags.
trait Notifier: PolyValue {
    fn channel(&self) -> &'static str;
}
capability!(Notifier);

#[derive(Debug, Default, Serialize, Deserialize)]
struct EmailJob {
    message: String,
}

impl Job for EmailJob {
    fn describe(&self) -> String {
        format!("email: {}", self.message)
    }
}

impl Notifier for EmailJob {
    fn channel(&self) -> &'static str {
        "email"
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SmsJob {
    number: String,
}

impl Job for SmsJob {
    fn describe(&self) -> String {
        format!("sms: {}", self.number)
    }
}

impl Notifier for SmsJob {
    fn channel(&self) -> &'static str {
        "sms"
    }
}

fn register_scoped() {
    polybox::register::<dyn Job, EmailJob>("job-email");
    polybox::register_specialized::<dyn Job, EmailJob>("email");
    polybox::register::<dyn Job, SmsJob>("job-sms");
    polybox::register_specialized::<dyn Notifier, SmsJob>("sms");
}

// ============================================================================
// Scenario: specialised tag wins inside its capability set
// ============================================================================

/// When a type carries both a global and a specialised tag, containers
/// declared with the specialised set should encode with the short tag
/// and decode either form.
#[test]
fn specialised_tag_wins_inside_its_capability_set() {
    // Arrange
    register_scoped();
    let poly = Poly::<dyn Job>::new(EmailJob {
        message: "Hello World!".to_owned(),
    });

    // Act
    let wire = serde_json::to_string(&poly).expect("encoding should succeed");

    // Assert
    assert_eq!(poly.discriminator().as_deref(), Some("email"));
    assert_eq!(wire, r#"["email",{"message":"Hello World!"}]"#);

    // Both the specialised and the global tag decode under this set.
    for input in [
        r#"["email",{"message":"hi"}]"#,
        r#"["job-email",{"message":"hi"}]"#,
    ] {
        let decoded: Poly<dyn Job> = serde_json::from_str(input).expect("decoding should succeed");
        let job = decoded.value().expect("job should be present");
        assert_eq!(job.describe(), "email: hi", "input {input:?}");
    }
}

// ============================================================================
// Scenario: global tag applies outside the specialised set
// ============================================================================

/// When a specialisation exists for one capability set only, other sets
/// should keep resolving the global tag.
#[test]
fn global_tag_applies_outside_the_specialised_set() {
    // Arrange
    register_scoped();

    // Act
    let as_notifier = Poly::<dyn Notifier>::new(EmailJob::default());
    let as_job = Poly::<dyn Job>::new(SmsJob::default());

    // Assert
    // EmailJob is specialised under Job, so Notifier sees the global tag.
    assert_eq!(as_notifier.discriminator().as_deref(), Some("job-email"));
    // SmsJob is specialised under Notifier, so Job sees the global tag.
    assert_eq!(as_job.discriminator().as_deref(), Some("job-sms"));
    assert_eq!(
        Poly::<dyn Notifier>::new(SmsJob::default())
            .discriminator()
            .as_deref(),
        Some("sms")
    );
}

// ============================================================================
// Scenario: bind extends decoding to a further capability set
// ============================================================================

/// When a type was registered through one capability set, decoding it
/// behind another set should fail until a bind records that the other
/// set admits it.
#[test]
fn bind_extends_decoding_to_a_further_capability_set() {
    // Arrange
    register_scoped();
    let wire = r#"["job-email",{"message":"ping"}]"#;

    // Act: before the bind, the tag resolves but cannot rebuild.
    let before = serde_json::from_str::<Poly<dyn Notifier>>(wire)
        .expect_err("decoding should fail before bind");
    assert!(
        before
            .to_string()
            .contains("no type registered for discriminator 'job-email'"),
        "unexpected error: {before}"
    );
    assert!(Poly::<dyn Notifier>::discriminated("job-email").is_none());

    polybox::bind::<dyn Notifier, EmailJob>();

    // Assert: the same wire now rebuilds behind the further set.
    let decoded: Poly<dyn Notifier> =
        serde_json::from_str(wire).expect("decoding should succeed after bind");
    let notifier = decoded.value().expect("notifier should be present");
    assert_eq!(notifier.channel(), "email");
    assert!(Poly::<dyn Notifier>::discriminated("job-email").is_some());
}
