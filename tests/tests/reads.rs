use tests::prelude::*;

use pretty_assertions::assert_eq;
use rowbound::{mapping::RowMap, CanonicalName, OrderedParameterSql};

const SCHEMA: &str = "
    create table customer (
        id integer primary key,
        name text not null,
        email text
    );
    create table orders (
        id integer primary key,
        customer_id integer not null,
        total integer not null
    );
    insert into customer values (1, 'Alice', 'alice@example.com');
    insert into customer values (2, 'Bob', null);
    insert into customer values (3, 'Carol', null);
    insert into orders values (10, 1, 250);
    insert into orders values (11, 1, 100);
    insert into orders values (12, 2, 75);
";

#[derive(Debug, Clone, PartialEq, Model)]
struct Customer {
    id: i64,
    name: String,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[table = "orders"]
struct Order {
    id: i64,
    #[column("customer_id")]
    customer: i64,
    total: i64,
}

/// Only the name is mapped; the rest of the row is ignored.
#[derive(Debug, Clone, PartialEq, Model)]
struct Name {
    name: String,
}

fn setup() -> (Setup, OrmConnection) {
    let setup = Setup::new(SCHEMA);
    let conn = setup.db.connect().unwrap();
    (setup, conn)
}

#[test]
fn read_list_maps_rows_in_order() {
    let (_setup, mut conn) = setup();

    let customers: Vec<Customer> = conn
        .read_list("select * from customer order by id")
        .unwrap();

    let names: Vec<_> = customers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob", "Carol"]);
    assert_eq!(customers[0].email.as_deref(), Some("alice@example.com"));
    assert_eq!(customers[1].email, None);
}

#[test]
fn unmatched_columns_are_ignored() {
    let (_setup, mut conn) = setup();

    let names: Vec<Name> = conn
        .read_list("select id, name, email from customer where id = 2")
        .unwrap();
    assert_eq!(
        names,
        [Name {
            name: "Bob".into()
        }]
    );
}

#[test]
fn missing_required_column_is_a_mapping_error() {
    let (_setup, mut conn) = setup();

    let err = conn
        .read_list::<Customer>("select id, email from customer")
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn column_marker_and_table_marker() {
    let (_setup, mut conn) = setup();

    let orders: Vec<Order> = conn.read_all().unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(
        orders[0],
        Order {
            id: 10,
            customer: 1,
            total: 250
        }
    );
}

#[test]
fn read_one_and_read_first() {
    let (_setup, mut conn) = setup();

    let first: Option<Customer> = conn
        .read_first("select * from customer order by id desc")
        .unwrap();
    assert_eq!(first.unwrap().name, "Carol");

    let err = conn
        .read_one::<Customer>("select * from customer")
        .unwrap_err();
    assert!(err.is_too_many_records());

    let one: Option<Customer> = conn
        .read_one(("select * from customer where id = ?", vec![Value::from(2)]))
        .unwrap();
    assert_eq!(one.unwrap().name, "Bob");

    let none: Option<Customer> = conn
        .read_one("select * from customer where id = 42")
        .unwrap();
    assert_eq!(none, None);
}

#[test]
fn read_maps_use_canonical_keys() {
    let (_setup, mut conn) = setup();

    let rows: Vec<RowMap> = conn
        .read_map_list("select id, name as customer_name from customer order by id")
        .unwrap();
    assert_eq!(rows.len(), 3);

    let names = conn.context().names();
    let key = names.canonicalize("customerName");
    assert_eq!(rows[0].get(&key), Some(&Value::from("Alice")));

    let keys: Vec<&CanonicalName> = rows[0].keys().collect();
    assert_eq!(keys.len(), 2);

    let first = conn
        .read_map_first("select name from customer order by id")
        .unwrap()
        .unwrap();
    assert_eq!(first.len(), 1);

    let err = conn
        .read_map_one("select name from customer")
        .unwrap_err();
    assert!(err.is_too_many_records());
}

#[test]
fn tuples_from_joined_rows() {
    let (_setup, mut conn) = setup();

    let rows: Vec<(Customer, Order)> = conn
        .read_tuple2_list(
            "select c.id as c_id, c.name as c_name, c.email as c_email, \
                    o.id as o_id, o.customer_id as o_customer_id, o.total as o_total \
             from customer c join orders o on o.customer_id = c.id \
             order by o.id",
            ["c_", "o_"],
        )
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].0.name, "Alice");
    assert_eq!(rows[0].1.total, 250);
    assert_eq!(rows[2].0.name, "Bob");
    assert_eq!(rows[2].1.id, 12);

    let triples: Vec<(Customer, Order, Name)> = conn
        .read_tuple3_list(
            "select c.id as a_id, c.name as a_name, c.email as a_email, \
                    o.id as b_id, o.customer_id as b_customer_id, o.total as b_total, \
                    c.name as n_name \
             from customer c join orders o on o.customer_id = c.id \
             order by o.id",
            ["a_", "b_", "n_"],
        )
        .unwrap();
    assert_eq!(triples.len(), 3);
    assert_eq!(triples[1].2.name, "Alice");
}

#[test]
fn overlapping_prefixes_are_rejected() {
    let (_setup, mut conn) = setup();

    let err = conn
        .read_tuple2_list::<Customer, Order>("select id from customer", ["c", "c_"])
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn read_with_numbers_rows_from_one() {
    let (_setup, mut conn) = setup();

    let rows = conn
        .read_with("select name from customer order by id", |row, number| {
            Ok(format!("{number}:{}", row.get_as::<String>("name")?))
        })
        .unwrap();
    assert_eq!(rows, ["1:Alice", "2:Bob", "3:Carol"]);
}

#[test]
fn traverse_returns_row_count() {
    let (_setup, mut conn) = setup();

    let mut total = 0;
    let rows = conn
        .traverse("select total from orders", |row, _| {
            total += row.get_as::<i64>(0)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(rows, 3);
    assert_eq!(total, 425);
}

#[test]
fn stream_maps_lazily() {
    let (_setup, mut conn) = setup();

    let mut rows = conn
        .stream::<Customer>("select * from customer order by id")
        .unwrap();

    let first = rows.next().unwrap().unwrap();
    assert_eq!(first.name, "Alice");
    assert_eq!(rows.rows_read(), 1);

    let rest: Vec<Customer> = rows.collect::<Result<_>>().unwrap();
    assert_eq!(rest.len(), 2);
}

#[test]
fn stream_stops_after_mapping_error() {
    let (_setup, mut conn) = setup();

    let mut rows = conn
        .stream::<Customer>("select id, email from customer")
        .unwrap();

    assert!(rows.next().unwrap().unwrap_err().is_mapping());
    assert!(rows.next().is_none());
}

#[test]
fn read_by_list_placeholder() {
    let (_setup, mut conn) = setup();

    let sql = OrderedParameterSql::new("select * from customer where id in (<?>) and name <> ?")
        .add(vec![Value::from(1), Value::from(3)])
        .add("Carol");

    let customers: Vec<Customer> = conn.read_list(sql).unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].name, "Alice");
}
