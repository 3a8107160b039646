use std::collections::HashMap;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use abac_decision_service::domain::{AttributeCategory, AttributeType, ConditionOperator, Effect};
use abac_decision_service::features::environment::RequestContext;
use tokio_util::sync::CancellationToken;

mod common;

#[sqlx::test]
async fn s1_simple_permit(pool: PgPool) {
    let services = common::setup_services(pool).await;

    services
        .ensure_schema("Department", "department", AttributeType::String)
        .await;
    let action_a = services.create_action("read").await;
    let resource = services.create_resource("report-1").await;
    let subject = services.create_subject().await;
    services
        .assign_subject_attribute(subject, "department", "IT", None, None)
        .await;

    let p1 = services
        .create_policy(
            "Permit IT department",
            Effect::Permit,
            100,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "department",
                ConditionOperator::Equals,
                "IT",
            )],
        )
        .await;

    let response = services
        .facade
        .check_access(
            subject,
            resource,
            action_a,
            HashMap::new(),
            RequestContext::default(),
            CancellationToken::new(),
        )
        .await
        .expect("evaluation should not fail");

    assert_eq!(response.decision, "Permit");
    assert_eq!(response.deciding_policy_id, Some(p1));
    assert!(response.reason.contains(&p1.to_string()));
}

#[sqlx::test]
async fn s2_deny_overrides_permit_regardless_of_priority(pool: PgPool) {
    let services = common::setup_services(pool).await;

    services
        .ensure_schema("Department", "department", AttributeType::String)
        .await;
    services
        .ensure_schema("Classification", "classification", AttributeType::String)
        .await;
    let action_a = services.create_action("read").await;
    let resource = services.create_resource("report-1").await;
    let subject = services.create_subject().await;
    services
        .assign_subject_attribute(subject, "department", "IT", None, None)
        .await;
    services
        .set_resource_attribute(resource, "classification", "Public")
        .await;

    services
        .create_policy(
            "Permit IT department",
            Effect::Permit,
            100,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "department",
                ConditionOperator::Equals,
                "IT",
            )],
        )
        .await;
    let p2 = services
        .create_policy(
            "Deny public resources",
            Effect::Deny,
            10,
            vec![action_a],
            vec![(
                AttributeCategory::Resource,
                "classification",
                ConditionOperator::Equals,
                "Public",
            )],
        )
        .await;

    let response = services
        .facade
        .check_access(
            subject,
            resource,
            action_a,
            HashMap::new(),
            RequestContext::default(),
            CancellationToken::new(),
        )
        .await
        .expect("evaluation should not fail");

    assert_eq!(response.decision, "Deny");
    assert_eq!(response.deciding_policy_id, Some(p2));
}

#[sqlx::test]
async fn s3_non_applicable_action_denies_with_no_deciding_policy(pool: PgPool) {
    let services = common::setup_services(pool).await;

    services
        .ensure_schema("Department", "department", AttributeType::String)
        .await;
    let action_a = services.create_action("read").await;
    let action_b = services.create_action("write").await;
    let resource = services.create_resource("report-1").await;
    let subject = services.create_subject().await;
    services
        .assign_subject_attribute(subject, "department", "IT", None, None)
        .await;

    services
        .create_policy(
            "Permit IT department",
            Effect::Permit,
            100,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "department",
                ConditionOperator::Equals,
                "IT",
            )],
        )
        .await;

    let response = services
        .facade
        .check_access(
            subject,
            resource,
            action_b,
            HashMap::new(),
            RequestContext::default(),
            CancellationToken::new(),
        )
        .await
        .expect("evaluation should not fail");

    assert_eq!(response.decision, "Deny");
    assert_eq!(response.deciding_policy_id, None);
    assert_eq!(response.reason, "No applicable policy");
}

#[sqlx::test]
async fn s4_indeterminate_fails_closed(pool: PgPool) {
    let services = common::setup_services(pool).await;

    let action_a = services.create_action("read").await;
    let resource = services.create_resource("report-1").await;
    let subject = services.create_subject().await;

    let p3 = services
        .create_policy(
            "Permit on unset attribute",
            Effect::Permit,
            100,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "missing_attr",
                ConditionOperator::Equals,
                "x",
            )],
        )
        .await;

    let response = services
        .facade
        .check_access(
            subject,
            resource,
            action_a,
            HashMap::new(),
            RequestContext::default(),
            CancellationToken::new(),
        )
        .await
        .expect("evaluation should not fail");

    assert_eq!(response.decision, "Deny");
    assert_eq!(response.deciding_policy_id, Some(p3));
    assert!(response.reason.contains("AttributeMissing"));
}

#[sqlx::test]
async fn s5_combined_indeterminate_and_permit_latches_permit(pool: PgPool) {
    let services = common::setup_services(pool).await;

    services
        .ensure_schema("Department", "department", AttributeType::String)
        .await;
    let action_a = services.create_action("read").await;
    let resource = services.create_resource("report-1").await;
    let subject = services.create_subject().await;
    services
        .assign_subject_attribute(subject, "department", "IT", None, None)
        .await;

    services
        .create_policy(
            "Permit on unset attribute",
            Effect::Permit,
            50,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "missing_attr",
                ConditionOperator::Equals,
                "x",
            )],
        )
        .await;
    let p1 = services
        .create_policy(
            "Permit IT department",
            Effect::Permit,
            100,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "department",
                ConditionOperator::Equals,
                "IT",
            )],
        )
        .await;

    let response = services
        .facade
        .check_access(
            subject,
            resource,
            action_a,
            HashMap::new(),
            RequestContext::default(),
            CancellationToken::new(),
        )
        .await
        .expect("evaluation should not fail");

    assert_eq!(response.decision, "Permit");
    assert_eq!(response.deciding_policy_id, Some(p1));
}

#[sqlx::test]
async fn s6_temporal_expiry_treats_attribute_as_missing(pool: PgPool) {
    let services = common::setup_services(pool).await;

    services
        .ensure_schema("Level", "level", AttributeType::Number)
        .await;
    let action_a = services.create_action("read").await;
    let resource = services.create_resource("report-1").await;
    let subject = services.create_subject().await;

    let yesterday = Utc::now() - Duration::days(1);
    services
        .assign_subject_attribute(subject, "level", "5", None, Some(yesterday))
        .await;

    let p4 = services
        .create_policy(
            "Permit high level",
            Effect::Permit,
            100,
            vec![action_a],
            vec![(
                AttributeCategory::Subject,
                "level",
                ConditionOperator::GreaterThan,
                "3",
            )],
        )
        .await;

    let response = services
        .facade
        .check_access(
            subject,
            resource,
            action_a,
            HashMap::new(),
            RequestContext::default(),
            CancellationToken::new(),
        )
        .await
        .expect("evaluation should not fail");

    assert_eq!(response.decision, "Deny");
    assert_eq!(response.deciding_policy_id, Some(p4));
    assert!(response.reason.contains("AttributeMissing"));
}
