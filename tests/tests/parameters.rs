use tests::prelude::*;

use pretty_assertions::assert_eq;

const SCHEMA: &str = "
    create table customer (
        id integer primary key,
        name text not null,
        email text
    );
    insert into customer values (1, 'Alice', 'alice@example.com');
    insert into customer values (2, 'Bob', null);
    insert into customer values (3, 'Carol', 'carol@example.com');
";

#[derive(Debug, Clone, PartialEq, Model)]
struct Customer {
    id: i64,
    name: String,
    email: Option<String>,
}

fn names(customers: &[Customer]) -> Vec<&str> {
    customers.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn named_parameters_bind_by_name() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    let sql = conn
        .named("select * from customer where id > :min and id < :max order by id")
        .bind("max", 3)
        .bind("min", 1);
    let customers: Vec<Customer> = conn.read_list(sql).unwrap();
    assert_eq!(names(&customers), ["Bob"]);

    let op = setup.log.pop().unwrap();
    assert_eq!(op.kind, OpKind::Query);
    assert_eq!(op.sql, "select * from customer where id > ? and id < ? order by id");
    assert_eq!(op.params, [Value::from(1), Value::from(3)]);
}

#[test]
fn repeated_name_binds_every_occurrence() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let sql = conn
        .named("select * from customer where name = :name or email like :name || '%'")
        .bind("name", "alice");
    let customers: Vec<Customer> = conn.read_list(sql).unwrap();
    assert_eq!(names(&customers), ["Alice"]);
}

#[test]
fn list_placeholder_expands() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    let sql = conn
        .named("select * from customer where id in (<:ids>) order by id")
        .bind("ids", vec![Value::from(1), Value::from(3)]);
    let customers: Vec<Customer> = conn.read_list(sql).unwrap();
    assert_eq!(names(&customers), ["Alice", "Carol"]);

    let op = setup.log.pop().unwrap();
    assert_eq!(op.sql, "select * from customer where id in (?, ?) order by id");
}

#[test]
fn list_placeholder_requires_a_list() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    let sql = conn
        .named("select * from customer where id in (<:ids>)")
        .bind("ids", 1);
    let err = conn.read_list::<Customer>(sql).unwrap_err();

    assert!(err.is_binding());
    assert!(setup.log.is_empty());
}

#[test]
fn placeholders_in_literals_are_left_alone() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let sql = conn
        .named("select ':id' as label, name from customer where id = :id")
        .bind("id", 2);
    let labels = conn
        .read_with(sql, |row, _| row.get_as::<String>("label"))
        .unwrap();
    assert_eq!(labels, [":id"]);
}

#[test]
fn object_members_supply_parameters() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();
    let cx = conn.context().clone();

    let sample = Customer {
        id: 3,
        name: "Carol".into(),
        email: None,
    };
    let params = cx.parameters(&sample).unwrap();

    // Explicit bindings win over the object's members.
    let sql = conn
        .named("select * from customer where name = :name or id = :id")
        .bind("name", "Alice")
        .bind_source(&params);
    let customers: Vec<Customer> = conn.read_list(sql).unwrap();
    assert_eq!(names(&customers), ["Alice", "Carol"]);
}

#[test]
fn map_supplies_parameters() {
    let setup = Setup::new(SCHEMA);
    let mut conn = setup.db.connect().unwrap();

    let mut params = HashMap::new();
    params.insert("id".to_string(), Value::from(2));

    let sql = conn
        .named("select * from customer where id = :id")
        .bind_source(&params);
    let customer: Option<Customer> = conn.read_one(sql).unwrap();
    assert_eq!(customer.unwrap().name, "Bob");
}

#[test]
fn unbound_names_fail_when_strict() {
    let setup = Setup::with_config(SCHEMA, Config::new().strict_named_parameters(true));
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    let sql = conn
        .named("select * from customer where id = :id and name = :name")
        .bind("id", 1);
    let err = conn.read_list::<Customer>(sql).unwrap_err();

    assert!(err.is_unbound_parameter());
    assert!(err.to_string().contains(":name"));
    assert!(setup.log.is_empty());

    // Plain SQL is checked too.
    let err = conn
        .execute_update("delete from customer where id = :id")
        .unwrap_err();
    assert!(err.is_unbound_parameter());
    assert!(setup.log.is_empty());
}

#[test]
fn configured_placeholder_syntax() {
    let setup = Setup::with_config(SCHEMA, Config::new().placeholder("#{", "}"));
    let mut conn = setup.db.connect().unwrap();
    setup.log.clear();

    let sql = conn
        .named("select * from customer where id = #{id}")
        .bind("id", 3);
    let customer: Option<Customer> = conn.read_one(sql).unwrap();
    assert_eq!(customer.unwrap().name, "Carol");

    let op = setup.log.pop().unwrap();
    assert_eq!(op.sql, "select * from customer where id = ?");
}
