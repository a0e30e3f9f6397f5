use chrono::{Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use warden_core::{Error, GrantRequest, ObjectId, Reference, ValidationReason};
use warden_policy::{NewGroup, NewIdentity, NewItem, Rbac};
use warden_store::InMemoryStorage;

fn rbac() -> Rbac<InMemoryStorage> {
    Rbac::new(Arc::new(InMemoryStorage::new()))
}

fn id(id: ObjectId) -> Reference {
    Reference::Id(id)
}

#[test]
fn cycle_closure_terminates() {
    let rbac = rbac();
    let a = rbac.create_group(NewGroup::named("a")).unwrap();
    let b = rbac.create_group(NewGroup::named("b")).unwrap();
    rbac.add_membership(a, b).unwrap();
    rbac.add_membership(b, a).unwrap();

    assert_eq!(rbac.closure(&a).unwrap(), HashSet::from([a, b]));
    assert_eq!(rbac.closure(&b).unwrap(), HashSet::from([a, b]));
}

#[test]
fn self_membership_closure() {
    let rbac = rbac();
    let g = rbac.create_group(NewGroup::named("g")).unwrap();
    assert!(rbac.add_membership(g, g).unwrap());
    assert_eq!(rbac.closure(&g).unwrap(), HashSet::from([g]));
}

#[test]
fn membership_is_idempotent() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let group = rbac.create_group(NewGroup::named("g")).unwrap();

    rbac.add_membership(user, group).unwrap();
    let once = rbac.storage().snapshot();
    rbac.add_membership(user, group).unwrap();
    assert_eq!(rbac.storage().snapshot(), once);
}

#[test]
fn grant_batch_is_idempotent() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    let batch = [GrantRequest::new(user, "read", item)];

    assert_eq!(rbac.add_permissions(&batch).unwrap(), 1);
    assert_eq!(rbac.add_permissions(&batch).unwrap(), 0);
    assert_eq!(rbac.permissions_for(&user).unwrap().len(), 1);
}

#[test]
fn inherited_edit_does_not_grant_delete() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let group = rbac.create_group(NewGroup::named("editors")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    rbac.add_membership(user, group).unwrap();
    rbac.add_permission(GrantRequest::new(group, "edit", item)).unwrap();

    assert!(rbac.has_permission(&id(user), "edit", &id(item)).unwrap());
    assert!(!rbac.has_permission(&id(user), "delete", &id(item)).unwrap());
}

#[test]
fn adding_grants_never_revokes_access() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let group = rbac.create_group(NewGroup::named("g")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    rbac.add_membership(user, group).unwrap();
    rbac.add_permission(GrantRequest::new(user, "read", item)).unwrap();

    let checks = [("read", item), ("write", item), ("read", group)];
    let before: Vec<bool> = checks
        .iter()
        .map(|(p, o)| rbac.has_permission(&id(user), p, &id(*o)).unwrap())
        .collect();

    rbac.add_permissions(&[
        GrantRequest::new(group, "write", item),
        GrantRequest::new(group, "*", group),
    ])
    .unwrap();

    for ((privilege, object), was) in checks.iter().zip(before) {
        let now = rbac.has_permission(&id(user), privilege, &id(*object)).unwrap();
        assert!(!was || now, "{} on {} was revoked", privilege, object);
    }
}

#[test]
fn wildcard_grant_covers_every_privilege() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let group = rbac.create_group(NewGroup::named("admins")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    rbac.add_membership(user, group).unwrap();
    rbac.add_permission(GrantRequest::new(group, "*", item)).unwrap();

    for privilege in ["read", "edit", "delete", "*"] {
        assert!(rbac.has_permission(&id(user), privilege, &id(item)).unwrap());
    }
}

#[test]
fn specific_grant_does_not_satisfy_wildcard_request() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    rbac.add_permission(GrantRequest::new(user, "read", item)).unwrap();

    assert!(!rbac.has_permission(&id(user), "*", &id(item)).unwrap());
}

#[test]
fn wildcard_object_is_refused() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();

    match rbac.add_permission(GrantRequest::new(user, "edit", "*")) {
        Err(Error::Validation(err)) => assert_eq!(err.reason, ValidationReason::WildcardObject),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn batch_with_unknown_object_writes_nothing() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    let before = rbac.storage().snapshot();

    let result = rbac.add_permissions(&[
        GrantRequest::new(user, "read", item),
        GrantRequest::new(user, "read", ObjectId::new()),
    ]);

    match result {
        Err(Error::Validation(err)) => {
            assert_eq!(err.index, 1);
            assert!(matches!(err.reason, ValidationReason::UnknownObject(_)));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert_eq!(rbac.storage().snapshot(), before);
}

#[test]
fn universal_object_is_not_a_wildcard() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    rbac.add_permission(GrantRequest::new(user, "login", ObjectId::universal()))
        .unwrap();

    assert!(rbac
        .has_permission(&id(user), "login", &id(ObjectId::universal()))
        .unwrap());
    assert!(!rbac.has_permission(&id(user), "login", &id(item)).unwrap());
}

#[test]
fn grants_match_only_inside_their_window() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let item = rbac.create_item(NewItem::named("doc")).unwrap();
    let starts = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
    let ends = Utc.with_ymd_and_hms(2030, 7, 1, 0, 0, 0).unwrap();
    rbac.add_permission(
        GrantRequest::new(user, "read", item)
            .starting(starts)
            .ending(ends),
    )
    .unwrap();

    let check = |when| rbac.has_permission_at(&id(user), "read", &id(item), when).unwrap();
    assert!(!check(starts - Duration::days(1)));
    assert!(check(starts));
    assert!(check(ends - Duration::seconds(1)));
    assert!(!check(ends));
}

#[test]
fn diamond_membership_yields_each_group_once() {
    let rbac = rbac();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    let left = rbac.create_group(NewGroup::named("left")).unwrap();
    let right = rbac.create_group(NewGroup::named("right")).unwrap();
    let top = rbac.create_group(NewGroup::named("top")).unwrap();
    rbac.add_membership(user, left).unwrap();
    rbac.add_membership(user, right).unwrap();
    rbac.add_membership(left, top).unwrap();
    rbac.add_membership(right, top).unwrap();

    let levels = rbac.memberships(&user).unwrap();
    assert_eq!(levels.len(), 4);
    let top_level = levels.iter().find(|level| level.id == top).unwrap();
    assert_eq!(top_level.level, 2);

    assert_eq!(
        rbac.members(&top).unwrap(),
        HashSet::from([top, left, right, user])
    );
}

#[test]
fn member_tree_terminates_on_cycle() {
    let rbac = rbac();
    let a = rbac.create_group(NewGroup::named("a")).unwrap();
    let b = rbac.create_group(NewGroup::named("b")).unwrap();
    let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
    rbac.add_membership(a, b).unwrap();
    rbac.add_membership(b, a).unwrap();
    rbac.add_membership(user, b).unwrap();

    let rendered: Vec<String> = rbac
        .member_tree(Some(a))
        .unwrap()
        .iter()
        .map(|row| row.render())
        .collect();
    assert_eq!(rendered, vec![" a", "^ b", "^^ u@example.com"]);
}

#[test]
fn checks_accept_any_reference_shape() {
    let rbac = rbac();
    let user = rbac
        .create_identity(NewIdentity::with_email("alice@example.com").fullname("Alice"))
        .unwrap();
    let item = rbac.create_item(NewItem::named("report")).unwrap();
    rbac.add_permission(GrantRequest::new("alice@example.com", "read", "report"))
        .unwrap();

    let lookup = Reference::from_value(&serde_json::json!({
        "id": "not-a-uuid",
        "email": "ALICE@example.com",
    }))
    .unwrap();
    assert!(rbac.has_permission(&lookup, "read", &id(item)).unwrap());
    assert!(rbac.has_permission(&id(user), "read", &"report".into()).unwrap());
    assert!(!rbac
        .has_permission(&"mallory@example.com".into(), "read", &id(item))
        .unwrap());
}
