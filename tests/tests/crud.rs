use tests::prelude::*;

use rowbound::mapping::{Intent, RowMap};

use pretty_assertions::assert_eq;

const SCHEMA: &str = "
    create table customer (
        id integer primary key autoincrement,
        name text not null,
        email text
    );
    create table event_log (
        message text not null
    );
    create table tag (
        label text primary key
    );
    create table customer_archive (
        id integer primary key autoincrement,
        name text not null,
        email text
    );
";

#[derive(Debug, Clone, PartialEq, Model)]
struct Customer {
    id: i64,
    name: String,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Model)]
struct EventLog {
    message: String,
}

#[derive(Debug, Clone, PartialEq, Model)]
struct Tag {
    label: String,
}

fn customer(name: &str) -> Customer {
    Customer {
        id: 0,
        name: name.to_string(),
        email: None,
    }
}

#[test]
fn insert_and_get_writes_generated_key() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let mut alice = customer("Alice");
    assert_eq!(conn.insert_and_get(&mut alice).unwrap(), 1);
    assert_eq!(alice.id, 1);

    let mut bob = customer("Bob");
    conn.insert_and_get(&mut bob).unwrap();
    assert_eq!(bob.id, 2);

    let found: Option<Customer> = conn.read_by_primary_key(2).unwrap();
    assert_eq!(found, Some(bob));

    let missing: Option<Customer> = conn.read_by_primary_key(99).unwrap();
    assert_eq!(missing, None);
}

#[test]
fn insert_omits_generated_columns() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    conn.insert(&customer("Alice")).unwrap();

    let op = setup.log.executed().pop().unwrap();
    assert_eq!(op.kind, OpKind::Execute);
    assert_eq!(op.sql, "insert into customer (name, email) values (?, ?)");
    assert_eq!(op.params, [Value::from("Alice"), Value::Null]);
}

#[test]
fn update_delete_and_exists() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let mut alice = customer("Alice");
    conn.insert_and_get(&mut alice).unwrap();
    assert!(conn.exists(&alice).unwrap());

    alice.email = Some("alice@example.com".into());
    assert_eq!(conn.update(&alice).unwrap(), 1);

    let stored: Customer = conn.read_by_primary_key(alice.id).unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some("alice@example.com"));

    assert_eq!(conn.delete(&alice).unwrap(), 1);
    assert!(!conn.exists(&alice).unwrap());
    assert_eq!(conn.count::<Customer>().unwrap(), 0);
}

#[test]
fn merge_inserts_then_updates() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let mut alice = Customer {
        id: 7,
        name: "Alice".into(),
        email: None,
    };
    conn.merge(&alice).unwrap();

    alice.name = "Alicia".into();
    conn.merge(&alice).unwrap();

    let all: Vec<Customer> = conn.read_all().unwrap();
    assert_eq!(all, [alice]);
}

#[test]
fn count_and_delete_all() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    for name in ["a", "b", "c"] {
        conn.insert(&customer(name)).unwrap();
    }

    assert_eq!(conn.count::<Customer>().unwrap(), 3);
    assert_eq!(conn.delete_all::<Customer>().unwrap(), 3);
    assert_eq!(conn.count::<Customer>().unwrap(), 0);
}

#[test]
fn keyless_table_rejects_keyed_writes_before_executing() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let event = EventLog {
        message: "started".into(),
    };
    conn.insert(&event).unwrap();
    setup.log.clear();

    let err = conn.update(&event).unwrap_err();
    assert!(err.is_unmappable_key());

    let err = conn.delete(&event).unwrap_err();
    assert!(err.is_unmappable_key());

    let err = conn.read_by_primary_key::<EventLog>("started").unwrap_err();
    assert!(err.is_unmappable_key());

    assert!(setup.log.executed().is_empty());

    let all: Vec<EventLog> = conn.read_all().unwrap();
    assert_eq!(all, [event]);
}

#[test]
fn update_without_value_columns_is_a_no_op() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let tag = Tag {
        label: "red".into(),
    };
    conn.insert(&tag).unwrap();
    setup.log.clear();

    assert_eq!(conn.update(&tag).unwrap(), 0);
    assert!(setup.log.executed().is_empty());
}

#[test]
fn execute_update_with_ordered_parameters() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    for name in ["a", "b", "c"] {
        conn.insert(&customer(name)).unwrap();
    }

    let sql = rowbound::OrderedParameterSql::new("delete from customer where name in (<?>)")
        .add(vec![Value::from("a"), Value::from("c")]);
    assert_eq!(conn.execute_update(sql).unwrap(), 2);
    assert_eq!(conn.count::<Customer>().unwrap(), 1);
}

#[test]
fn bindings_are_built_once_per_context() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    conn.insert(&customer("a")).unwrap();
    conn.insert(&customer("b")).unwrap();
    conn.count::<Customer>().unwrap();
    assert_eq!(setup.log.count(OpKind::Metadata), 1);

    setup.db.context().invalidate_bindings();
    conn.count::<Customer>().unwrap();
    assert_eq!(setup.log.count(OpKind::Metadata), 2);
}

#[test]
fn writes_against_an_explicit_table() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    conn.insert_on("customer_archive", &customer("Alice")).unwrap();
    let op = setup.log.executed().pop().unwrap();
    assert_eq!(op.sql, "insert into customer_archive (name, email) values (?, ?)");

    let mut bob = customer("Bob");
    assert_eq!(conn.insert_and_get_on("customer_archive", &mut bob).unwrap(), 1);
    assert_eq!(bob.id, 2);
    assert!(conn.exists_in("customer_archive", &bob).unwrap());
    assert!(!conn.exists(&bob).unwrap());
    assert_eq!(conn.count::<Customer>().unwrap(), 0);

    bob.email = Some("bob@example.com".into());
    assert_eq!(conn.update_on("customer_archive", &bob).unwrap(), 1);

    let carol = Customer {
        id: 9,
        name: "Carol".into(),
        email: None,
    };
    conn.merge_on("customer_archive", &carol).unwrap();

    let archived: Vec<Customer> = conn
        .read_list("select * from customer_archive order by id")
        .unwrap();
    assert_eq!(archived.len(), 3);
    assert_eq!(archived[1], bob);
    assert_eq!(archived[2], carol);

    assert_eq!(conn.delete_on("customer_archive", &bob).unwrap(), 1);
    assert!(!conn.exists_in("customer_archive", &bob).unwrap());

    assert_eq!(conn.delete_all_on::<Customer>("customer_archive").unwrap(), 2);
    assert_eq!(conn.count::<Customer>().unwrap(), 0);
}

#[test]
fn batch_writes_against_an_explicit_table() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let customers = [customer("a"), customer("b")];
    let refs: Vec<Option<&Customer>> = customers.iter().map(Some).collect();
    let result = conn
        .write_many_on("customer_archive", WriteOp::Insert, &refs)
        .unwrap();
    assert_eq!(result.rows_affected(), 2);

    let archived: Vec<Customer> = conn.read_list("select * from customer_archive").unwrap();
    assert_eq!(archived.len(), 2);
    assert_eq!(conn.count::<Customer>().unwrap(), 0);
}

#[test]
fn explicit_table_bindings_are_cached_per_table() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    let cx = setup.db.context().clone();

    let default = cx
        .binding::<Customer>(conn.connection(), Intent::Read)
        .unwrap();
    let archive = cx
        .binding_on::<Customer>(conn.connection(), "customer_archive", Intent::Read)
        .unwrap();
    let again = cx
        .binding_on::<Customer>(conn.connection(), "CUSTOMER_ARCHIVE", Intent::Read)
        .unwrap();

    assert_eq!(default.table_name(), "customer");
    assert_eq!(archive.table_name(), "customer_archive");
    assert!(std::sync::Arc::ptr_eq(&archive, &again));
    assert_eq!(setup.log.count(OpKind::Metadata), 1);

    let err = cx
        .binding_on::<Customer>(conn.connection(), "missing_table", Intent::Read)
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn insert_map_into_matches_keys_to_columns() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    let names = setup.db.context().names();
    setup.log.clear();

    let mut row = RowMap::new();
    row.insert(names.canonicalize("name"), Value::from("Alice"));
    row.insert(names.canonicalize("EMAIL"), Value::from("alice@example.com"));
    assert_eq!(conn.insert_map_into("customer_archive", &row).unwrap(), 1);

    let op = setup.log.executed().pop().unwrap();
    assert_eq!(op.sql, "insert into customer_archive (name, email) values (?, ?)");

    let archived: Vec<Customer> = conn.read_list("select * from customer_archive").unwrap();
    assert_eq!(
        archived,
        [Customer {
            id: 1,
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
        }]
    );

    setup.log.clear();
    row.insert(names.canonicalize("nickname"), Value::from("Al"));
    let err = conn.insert_map_into("customer_archive", &row).unwrap_err();
    assert!(err.is_mapping());
    assert!(setup.log.executed().is_empty());

    let err = conn.insert_map_into("customer_archive", &RowMap::new()).unwrap_err();
    assert!(err.is_invalid_argument());
}
