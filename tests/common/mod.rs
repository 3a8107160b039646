use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use abac_decision_service::domain::{AttributeCategory, AttributeType, ConditionOperator, Effect};
use abac_decision_service::features::access_control::AccessControlFacade;
use abac_decision_service::features::actions::models::CreateActionInput;
use abac_decision_service::features::actions::ActionService;
use abac_decision_service::features::attributes::models::{
    AssignSubjectAttributeInput, SetResourceAttributeInput,
};
use abac_decision_service::features::attributes::AttributeStore;
use abac_decision_service::features::audit::{AuditReader, AuditWriter};
use abac_decision_service::features::policies::models::{CreateConditionInput, CreatePolicyInput};
use abac_decision_service::features::policies::{PolicyAdmin, PolicyCatalogue};
use abac_decision_service::features::resources::models::CreateResourceInput;
use abac_decision_service::features::resources::ResourceService;
use abac_decision_service::features::schemas::models::CreateSchemaInput;
use abac_decision_service::features::schemas::SchemaService;
use abac_decision_service::features::subjects::SubjectService;

#[allow(dead_code)]
pub struct TestServices {
    pub schemas: SchemaService,
    pub actions: ActionService,
    pub resources: ResourceService,
    pub subjects: SubjectService,
    pub attributes: AttributeStore,
    pub policy_admin: PolicyAdmin,
    pub audit_reader: AuditReader,
    pub facade: AccessControlFacade,
}

pub async fn setup_services(pool: PgPool) -> TestServices {
    let schemas = SchemaService::new(pool.clone());
    let actions = ActionService::new(pool.clone());
    let resources = ResourceService::new(pool.clone());
    let subjects = SubjectService::new(pool.clone());
    let attributes = AttributeStore::new(pool.clone());
    let policy_admin = PolicyAdmin::new(pool.clone());
    let catalogue = PolicyCatalogue::new(pool.clone());
    let audit_writer = AuditWriter::new(pool.clone());
    let audit_reader = AuditReader::new(pool.clone());

    let facade = AccessControlFacade::new(
        resources.clone(),
        attributes.clone(),
        catalogue,
        audit_writer,
    );

    TestServices {
        schemas,
        actions,
        resources,
        subjects,
        attributes,
        policy_admin,
        audit_reader,
        facade,
    }
}

#[allow(dead_code)]
impl TestServices {
    pub async fn ensure_schema(&self, name: &str, key: &str, attribute_type: AttributeType) -> Uuid {
        self.schemas
            .create_schema(CreateSchemaInput {
                name: name.to_string(),
                key: key.to_string(),
                r#type: attribute_type,
                description: None,
            })
            .await
            .expect("create schema")
            .id
    }

    pub async fn create_action(&self, code: &str) -> Uuid {
        self.actions
            .create_action(CreateActionInput {
                name: code.to_string(),
                code: code.to_string(),
                description: None,
            })
            .await
            .expect("create action")
            .id
    }

    pub async fn create_resource(&self, name: &str) -> Uuid {
        self.resources
            .create_resource(CreateResourceInput {
                name: name.to_string(),
            })
            .await
            .expect("create resource")
            .id
    }

    pub async fn create_subject(&self) -> Uuid {
        self.subjects
            .create_subject()
            .await
            .expect("create subject")
            .id
    }

    pub async fn assign_subject_attribute(
        &self,
        subject_id: Uuid,
        key: &str,
        value: &str,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) {
        self.attributes
            .assign_subject_attribute(AssignSubjectAttributeInput {
                subject_id,
                attribute_key: key.to_string(),
                value: value.to_string(),
                valid_from,
                valid_to,
            })
            .await
            .expect("assign subject attribute");
    }

    pub async fn set_resource_attribute(&self, resource_id: Uuid, key: &str, value: &str) {
        self.attributes
            .set_resource_attribute(SetResourceAttributeInput {
                resource_id,
                attribute_key: key.to_string(),
                value: value.to_string(),
            })
            .await
            .expect("set resource attribute");
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_policy(
        &self,
        name: &str,
        effect: Effect,
        priority: i32,
        action_ids: Vec<Uuid>,
        conditions: Vec<(AttributeCategory, &str, ConditionOperator, &str)>,
    ) -> Uuid {
        self.policy_admin
            .create_policy(CreatePolicyInput {
                name: name.to_string(),
                description: None,
                effect,
                priority,
                is_active: Some(true),
                action_ids,
                conditions: conditions
                    .into_iter()
                    .map(|(category, key, operator, expected)| CreateConditionInput {
                        attribute_category: category,
                        attribute_key: key.to_string(),
                        operator,
                        expected_value: expected.to_string(),
                    })
                    .collect(),
            })
            .await
            .expect("create policy")
            .id
    }
}
