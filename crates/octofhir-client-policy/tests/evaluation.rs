//! End-to-end client policy evaluation against an in-memory realm.

use std::collections::HashSet;
use std::sync::Arc;

use octofhir_client_policy::prelude::*;
use octofhir_client_policy::storage::{ClientScope, ClientScopeStorage, ClientStorage, RoleStorage, UserStorage};

const REALM: &str = "acme";

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

fn realm_store() -> InMemoryRealmStore {
    let store = InMemoryRealmStore::new();
    store.add_user(REALM, User::new("u-admin", "admin"));
    store.add_user(REALM, User::new("u-dev", "developer"));
    store.add_realm_role(REALM, "admin");
    store.add_client(REALM, RealmClient::new("portal").with_id("c-portal"));
    store.add_client(REALM, RealmClient::new("registry").with_id("c-registry"));
    store.add_client(REALM, RealmClient::new("billing").with_id("c-billing"));
    store.add_client_role(REALM, "c-portal", "manage-clients");
    store.add_client_role(REALM, "c-billing", "manage-clients");
    store.add_client_role(REALM, "c-registry", "viewer");
    store.grant_role(REALM, "u-admin", Role::realm("admin"));
    store.grant_role(REALM, "u-dev", Role::client("c-billing", "manage-clients"));
    store
}

fn auth_methods(methods: &[&str]) -> ComponentModel {
    ComponentModel::new(
        "clientupdatecontext-condition",
        ComponentConfig::new().with("expected-auth-methods", methods.iter().copied()),
    )
}

fn roles(names: &[&str]) -> ComponentModel {
    ComponentModel::new(
        "clientupdatesourceroles-condition",
        ComponentConfig::new().with("roles", names.iter().copied()),
    )
}

fn evaluate_condition(
    store: &InMemoryRealmStore,
    component: &ComponentModel,
    context: &ClientPolicyContext,
) -> ClientPolicyResult<Vote> {
    let condition = ConditionRegistry::with_defaults().create(component)?;
    let session = RealmSession::new(REALM, store);
    condition.evaluate(&session, context)
}

fn admin_update(user: User) -> ClientPolicyContext {
    ClientPolicyContext::admin_update(
        Some(user),
        None,
        ClientRepresentation::new("portal"),
        RealmClient::new("portal").with_id("c-portal"),
    )
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[test]
fn registration_access_token_matches_allow_list() {
    let store = realm_store();
    let context = ClientPolicyContext::dynamic_update(
        Some(RegistrationToken::registration_access().with_subject("u-dev")),
        ClientRepresentation::new("dcr-app"),
        RealmClient::new("dcr-app"),
    );

    let vote = evaluate_condition(
        &store,
        &auth_methods(&["BY_REGISTRATION_ACCESS_TOKEN"]),
        &context,
    )
    .unwrap();
    assert_eq!(vote, Vote::Yes);
}

#[test]
fn admin_update_with_realm_role() {
    let store = realm_store();
    let context = admin_update(User::new("u-admin", "admin"));

    assert_eq!(
        evaluate_condition(&store, &roles(&["admin"]), &context).unwrap(),
        Vote::Yes
    );
    assert_eq!(
        evaluate_condition(&store, &roles(&["superuser"]), &context).unwrap(),
        Vote::No
    );
}

#[test]
fn token_request_abstains_for_registration_conditions() {
    let store = realm_store();
    let context = ClientPolicyContext::protocol(
        ClientPolicyEvent::TokenRequest,
        RealmClient::new("portal").with_id("c-portal"),
    );

    for component in [auth_methods(&["ANONYMOUS"]), roles(&["admin"])] {
        assert_eq!(
            evaluate_condition(&store, &component, &context).unwrap(),
            Vote::Abstain
        );
    }
}

// -----------------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------------

#[test]
fn contexts_without_token_are_anonymous() {
    let contexts = [
        ClientPolicyContext::dynamic_register(None, ClientRepresentation::new("a")),
        ClientPolicyContext::admin_register(
            Some(User::new("u-admin", "admin")),
            None,
            ClientRepresentation::new("a"),
        ),
        admin_update(User::new("u-dev", "developer")),
    ];

    for context in &contexts {
        assert_eq!(AuthMethod::classify(context), Some(AuthMethod::Anonymous));
    }
}

#[test]
fn empty_roles_always_vote_no() {
    let store = realm_store();
    for user in ["u-admin", "u-dev", "u-unknown"] {
        let context = admin_update(User::new(user, user));
        assert_eq!(
            evaluate_condition(&store, &roles(&[]), &context).unwrap(),
            Vote::No
        );
        let unset = ComponentModel::new("clientupdatesourceroles-condition", ComponentConfig::new());
        assert_eq!(
            evaluate_condition(&store, &unset, &context).unwrap(),
            Vote::No
        );
    }
}

/// Store listing clients in reverse registration order.
struct ReversedClients(InMemoryRealmStore);

impl UserStorage for ReversedClients {
    fn find_by_id(&self, realm: &str, user_id: &str) -> ClientPolicyResult<Option<User>> {
        self.0.find_by_id(realm, user_id)
    }
}

impl RoleStorage for ReversedClients {
    fn realm_role(&self, realm: &str, name: &str) -> ClientPolicyResult<Option<Role>> {
        self.0.realm_role(realm, name)
    }

    fn client_role(
        &self,
        realm: &str,
        client: &RealmClient,
        name: &str,
    ) -> ClientPolicyResult<Option<Role>> {
        self.0.client_role(realm, client, name)
    }

    fn role_mappings(&self, realm: &str, user_id: &str) -> ClientPolicyResult<HashSet<Role>> {
        self.0.role_mappings(realm, user_id)
    }
}

impl ClientStorage for ReversedClients {
    fn list_by_realm(&self, realm: &str) -> ClientPolicyResult<Vec<RealmClient>> {
        let mut clients = self.0.list_by_realm(realm)?;
        clients.reverse();
        Ok(clients)
    }

    fn find_by_client_id(
        &self,
        realm: &str,
        client_id: &str,
    ) -> ClientPolicyResult<Option<RealmClient>> {
        self.0.find_by_client_id(realm, client_id)
    }
}

impl ClientScopeStorage for ReversedClients {
    fn list_scopes(&self, realm: &str) -> ClientPolicyResult<Vec<ClientScope>> {
        self.0.list_scopes(realm)
    }

    fn scope_ids_by_client(
        &self,
        realm: &str,
        client_id: &str,
        default_scope: bool,
    ) -> ClientPolicyResult<Vec<String>> {
        self.0.scope_ids_by_client(realm, client_id, default_scope)
    }
}

#[test]
fn client_enumeration_order_does_not_change_vote() {
    let forward = realm_store();
    let reversed = ReversedClients(realm_store());
    let registry = ConditionRegistry::with_defaults();

    for (user, expected) in [
        ("u-dev", Vote::Yes),
        ("u-admin", Vote::No),
    ] {
        let condition = registry.create(&roles(&["manage-clients", "viewer"])).unwrap();
        let context = admin_update(User::new(user, user));

        let a = condition
            .evaluate(&RealmSession::new(REALM, &forward), &context)
            .unwrap();
        let b = condition
            .evaluate(&RealmSession::new(REALM, &reversed), &context)
            .unwrap();

        assert_eq!(a, expected, "{}", user);
        assert_eq!(a, b, "{}", user);
    }
}

#[test]
fn policy_aggregation_table() {
    use octofhir_client_policy::policy::aggregate;
    use Vote::{Abstain, No, Yes};

    assert_eq!(aggregate([Abstain, Abstain]), Abstain);
    assert_eq!(aggregate([Yes, No]), No);
    assert_eq!(aggregate([Yes, Abstain]), Yes);
    assert_eq!(aggregate([Abstain]), Abstain);
}

// -----------------------------------------------------------------------------
// Realm evaluation
// -----------------------------------------------------------------------------

fn manager_with_policies(store: &Arc<InMemoryRealmStore>) -> ClientPolicyManager {
    store.add_policy(
        REALM,
        ClientPolicyRepresentation::new("trusted-registrations")
            .with_condition(auth_methods(&["BY_INITIAL_ACCESS_TOKEN", "BY_AUTHENTICATED_USER"]))
            .with_condition(roles(&["manage-clients"]))
            .with_executor(ExecutorReference::new("secure-client-authenticator")),
    );
    store.add_policy(
        REALM,
        ClientPolicyRepresentation::new("anonymous-registrations")
            .with_condition(auth_methods(&["ANONYMOUS"]))
            .with_executor(ExecutorReference::new("reject-registration")),
    );

    let storage: Arc<InMemoryRealmStore> = Arc::clone(store);
    ClientPolicyManager::new(
        ClientPolicyConfig::default(),
        ConditionRegistry::with_defaults(),
        storage,
    )
}

#[test]
fn realm_evaluation_is_per_policy() {
    let store = Arc::new(realm_store());
    let manager = manager_with_policies(&store);
    let session = RealmSession::new(REALM, &*store);

    let context = ClientPolicyContext::builder(ClientPolicyEvent::Register)
        .dynamic_registration()
        .with_token(RegistrationToken::bearer().with_subject("u-dev"))
        .with_authenticated_user(User::new("u-dev", "developer"))
        .with_representation(ClientRepresentation::new("dcr-app"))
        .build();

    let evaluation = manager.evaluate(&session, &context).unwrap();
    assert_eq!(evaluation.decisions.len(), 2);
    assert_eq!(
        evaluation.decision("trusted-registrations").unwrap().vote,
        Vote::Yes
    );
    assert_eq!(
        evaluation.decision("anonymous-registrations").unwrap().vote,
        Vote::No
    );

    let executors: Vec<_> = evaluation
        .executors_to_run()
        .into_iter()
        .map(|e| e.provider_id.clone())
        .collect();
    assert_eq!(executors, vec!["secure-client-authenticator".to_string()]);
}

#[test]
fn realm_evaluation_is_deterministic() {
    let store = Arc::new(realm_store());
    let manager = manager_with_policies(&store);
    let session = RealmSession::new(REALM, &*store);
    let context = ClientPolicyContext::dynamic_register(None, ClientRepresentation::new("dcr-app"));

    let first = manager.evaluate(&session, &context).unwrap();
    let second = manager.evaluate(&session, &context).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.decision("anonymous-registrations").unwrap().vote,
        Vote::Yes
    );
}

#[test]
fn condition_error_aborts_realm_evaluation() {
    let store = Arc::new(realm_store());
    let manager = manager_with_policies(&store);
    let session = RealmSession::new(REALM, &*store);

    // Register event raised outside admin and dynamic registration
    let context = ClientPolicyContext::builder(ClientPolicyEvent::Register)
        .with_token(RegistrationToken::initial_access())
        .build();

    let err = manager.evaluate(&session, &context).unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.category(), ErrorCategory::Contract);
}
