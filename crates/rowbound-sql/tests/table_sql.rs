use pretty_assertions::assert_eq;
use rowbound_sql::{Flavor, SqlColumn, TableSql};
use std::sync::Arc;

fn customer(flavor: Flavor) -> TableSql {
    TableSql::new(
        flavor,
        "CUSTOMER",
        vec![
            SqlColumn::new("ID").primary_key(0),
            SqlColumn::new("NAME"),
            SqlColumn::new("ADDRESS"),
        ],
    )
}

#[test]
fn single_row_templates() {
    let sql = customer(Flavor::Standard);

    assert_eq!(sql.insert(), "insert into CUSTOMER (ID, NAME, ADDRESS) values (?, ?, ?)");
    assert_eq!(
        sql.update().unwrap(),
        "update CUSTOMER set NAME = ?, ADDRESS = ? where ID = ?"
    );
    assert_eq!(sql.delete().unwrap(), "delete from CUSTOMER where ID = ?");
    assert_eq!(
        sql.select_by_key().unwrap(),
        "select * from CUSTOMER where ID = ?"
    );
    assert_eq!(
        sql.exists_by_key().unwrap(),
        "select 1 from CUSTOMER where ID = ?"
    );
    assert_eq!(sql.select_all(), "select * from CUSTOMER");
    assert_eq!(sql.count(), "select count(*) from CUSTOMER");
    assert_eq!(
        sql.merge().unwrap(),
        "merge into CUSTOMER (ID, NAME, ADDRESS) key (ID) values (?, ?, ?)"
    );
}

#[test]
fn composite_key_is_ordered_by_key_position() {
    let sql = TableSql::new(
        Flavor::Standard,
        "ORDER_LINE",
        vec![
            SqlColumn::new("LINE_NO").primary_key(1),
            SqlColumn::new("ORDER_ID").primary_key(0),
            SqlColumn::new("QTY"),
        ],
    );

    assert_eq!(sql.key_columns(), &[1, 0]);
    assert_eq!(
        sql.delete().unwrap(),
        "delete from ORDER_LINE where ORDER_ID = ? and LINE_NO = ?"
    );
}

#[test]
fn auto_generated_columns_are_not_inserted() {
    let sql = TableSql::new(
        Flavor::Sqlite,
        "GUEST",
        vec![
            SqlColumn::new("ID").primary_key(0).auto_generated(),
            SqlColumn::new("NAME"),
        ],
    );

    assert_eq!(sql.insert(), "insert into GUEST (NAME) values (?)");
    assert_eq!(sql.insert_columns(), &[1]);
    assert_eq!(sql.multi_row_insert(2).as_ref(), "insert into GUEST (NAME) values (?), (?)");
}

#[test]
fn keyless_table_has_no_keyed_templates() {
    let sql = TableSql::new(Flavor::Standard, "LOG", vec![SqlColumn::new("MSG")]);

    assert!(sql.update().is_none());
    assert!(sql.delete().is_none());
    assert!(sql.merge().is_none());
    assert!(sql.multi_row_merge(3).is_none());
}

#[test]
fn multi_row_templates_are_cached() {
    let sql = customer(Flavor::Sqlite);

    let a = sql.multi_row_insert(3);
    let b = sql.multi_row_insert(3);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(
        a.as_ref(),
        "insert into CUSTOMER (ID, NAME, ADDRESS) values (?, ?, ?), (?, ?, ?), (?, ?, ?)"
    );
}

#[test]
fn merge_flavors() {
    assert_eq!(
        customer(Flavor::Sqlite).multi_row_merge(2).unwrap().as_ref(),
        "insert into CUSTOMER (ID, NAME, ADDRESS) values (?, ?, ?), (?, ?, ?) on conflict (ID) do update set NAME = excluded.NAME, ADDRESS = excluded.ADDRESS"
    );
    assert_eq!(
        customer(Flavor::Mysql).merge().unwrap(),
        "insert into CUSTOMER (ID, NAME, ADDRESS) values (?, ?, ?) on duplicate key update NAME = values(NAME), ADDRESS = values(ADDRESS)"
    );
    assert_eq!(Flavor::from_product_name("SQLite"), Flavor::Sqlite);
    assert_eq!(Flavor::from_product_name("H2"), Flavor::Standard);
}
