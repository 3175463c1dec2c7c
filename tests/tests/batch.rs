use tests::prelude::*;

use pretty_assertions::assert_eq;
use rowbound::ChunkOutcome;

const SCHEMA: &str = "
    create table customer (
        id integer primary key autoincrement,
        name text not null,
        email text unique
    );
    create table tag (
        label text primary key
    );
";

#[derive(Debug, Clone, PartialEq, Model)]
struct Customer {
    id: i64,
    name: String,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Model)]
struct Tag {
    label: String,
}

fn customers(n: usize) -> Vec<Customer> {
    (0..n)
        .map(|i| Customer {
            id: 0,
            name: format!("customer {i}"),
            email: Some(format!("c{i}@example.com")),
        })
        .collect()
}

fn setup(config: Config) -> (Setup, OrmConnection) {
    let setup = Setup::with_config(SCHEMA, config);
    let conn = setup.db.connect().unwrap();
    (setup, conn)
}

fn ranges(chunks: &[ChunkOutcome]) -> Vec<std::ops::Range<usize>> {
    chunks.iter().map(|chunk| chunk.range.clone()).collect()
}

#[test]
fn multi_row_chunks_and_trailing_rest() {
    let (setup, mut conn) = setup(Config::new().multi_row_size(2));

    let result = conn.insert_many(&customers(5)).unwrap();

    assert_eq!(setup.log.count(OpKind::Prepare), 2);
    assert_eq!(setup.log.count(OpKind::StatementExecute), 3);

    let executed = setup.log.executed();
    assert_eq!(
        executed[0].sql,
        "insert into customer (name, email) values (?, ?), (?, ?)"
    );
    assert_eq!(executed[2].sql, "insert into customer (name, email) values (?, ?)");

    assert_eq!(ranges(&result.chunks), [0..2, 2..4, 4..5]);
    assert!(result
        .chunks
        .iter()
        .all(|chunk| chunk.strategy == MultiRowStrategy::MultiRow));

    let indices: Vec<_> = result.rows.iter().map(|row| row.index).collect();
    assert_eq!(indices, [0, 1, 2, 3, 4]);

    // Per-row counts are only known for single-row statements.
    let affected: Vec<_> = result.rows.iter().map(|row| row.rows_affected).collect();
    assert_eq!(affected, [None, None, None, None, Some(1)]);
    assert_eq!(result.rows_affected(), 5);

    assert_eq!(conn.count::<Customer>().unwrap(), 5);
}

#[test]
fn simple_batch_flushes_per_chunk() {
    let (setup, mut conn) = setup(
        Config::new()
            .multi_row_strategy(MultiRowStrategy::SimpleBatch)
            .batch_size(2),
    );

    let result = conn.insert_many(&customers(5)).unwrap();

    assert_eq!(setup.log.count(OpKind::Prepare), 1);
    assert_eq!(setup.log.count(OpKind::Batch(2)), 2);
    assert_eq!(setup.log.count(OpKind::Batch(1)), 1);

    assert_eq!(ranges(&result.chunks), [0..2, 2..4, 4..5]);
    assert!(result.rows.iter().all(|row| row.rows_affected == Some(1)));
    assert_eq!(result.len(), 5);
}

#[test]
fn multi_row_and_batch_groups_statements() {
    let (setup, mut conn) = setup(
        Config::new()
            .multi_row_strategy(MultiRowStrategy::MultiRowAndBatch)
            .multi_row_size(2)
            .batch_size_with_multi_row(2),
    );

    let result = conn.insert_many(&customers(5)).unwrap();

    assert_eq!(setup.log.count(OpKind::Batch(2)), 1);
    assert_eq!(setup.log.count(OpKind::StatementExecute), 1);

    assert_eq!(ranges(&result.chunks), [0..2, 2..4, 4..5]);
    assert_eq!(result.chunks[0].strategy, MultiRowStrategy::MultiRowAndBatch);
    assert_eq!(result.rows_affected(), 5);

    let names: Vec<String> = conn
        .read_with("select name from customer order by id", |row, _| {
            row.get_as::<String>(0)
        })
        .unwrap();
    assert_eq!(
        names,
        (0..5).map(|i| format!("customer {i}")).collect::<Vec<_>>()
    );
}

#[test]
fn missing_element_fails_before_executing() {
    let (setup, mut conn) = setup(Config::new());
    let objects = customers(3);

    let err = conn
        .write_many(WriteOp::Insert, &[Some(&objects[0]), None, Some(&objects[2])])
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(err.invalid_argument_index(), Some(1));
    assert!(setup.log.executed().is_empty());
    assert_eq!(conn.count::<Customer>().unwrap(), 0);
}

#[test]
fn failing_chunk_keeps_earlier_chunks() {
    let (_setup, mut conn) = setup(Config::new().multi_row_size(2));

    let mut objects = customers(5);
    objects[3].email = objects[0].email.clone();

    let err = conn.insert_many(&objects).unwrap_err();
    assert_eq!(err.failed_chunk(), Some(2..4));
    assert!(err.is_driver());

    assert_eq!(conn.count::<Customer>().unwrap(), 2);
}

#[test]
fn empty_input_is_a_no_op() {
    let (setup, mut conn) = setup(Config::new());

    let result = conn.insert_many::<Customer>(&[]).unwrap();
    assert!(result.is_empty());
    assert!(setup.log.executed().is_empty());
}

#[test]
fn insert_many_and_get_writes_generated_keys() {
    let (setup, mut conn) = setup(Config::new().multi_row_size(2));

    let mut objects = customers(3);
    let result = conn.insert_many_and_get(&mut objects).unwrap();

    // Generated keys need the native batch path.
    assert_eq!(setup.log.count(OpKind::Batch(3)), 1);
    assert!(result
        .chunks
        .iter()
        .all(|chunk| chunk.strategy == MultiRowStrategy::SimpleBatch));

    let ids: Vec<i64> = objects.iter().map(|c| c.id).collect();
    assert_eq!(ids, [1, 2, 3]);

    let stored: Option<Customer> = conn.read_by_primary_key(2i64).unwrap();
    assert_eq!(stored.as_ref(), Some(&objects[1]));
}

#[test]
fn merge_update_and_delete_many() {
    let (setup, mut conn) = setup(Config::new().multi_row_size(2));

    let mut objects = customers(3);
    conn.insert_many_and_get(&mut objects).unwrap();

    for customer in &mut objects {
        customer.name = customer.name.to_uppercase();
    }
    objects.push(Customer {
        id: 10,
        name: "NEW".into(),
        email: None,
    });

    let merged = conn.merge_many(&objects).unwrap();
    assert_eq!(ranges(&merged.chunks), [0..2, 2..4]);
    assert_eq!(conn.count::<Customer>().unwrap(), 4);

    objects[0].email = None;
    setup.log.clear();
    let updated = conn.update_many(&objects[..2]).unwrap();
    assert_eq!(updated.rows_affected(), 2);
    assert!(updated
        .chunks
        .iter()
        .all(|chunk| chunk.strategy == MultiRowStrategy::SimpleBatch));
    assert_eq!(setup.log.count(OpKind::StatementExecute), 0);

    let stored: Vec<Customer> = conn.read_all().unwrap();
    assert_eq!(stored, objects);

    let deleted = conn.delete_many(&objects[1..]).unwrap();
    assert_eq!(deleted.rows_affected(), 3);

    let stored: Vec<Customer> = conn.read_all().unwrap();
    assert_eq!(stored, objects[..1]);
}

#[test]
fn updates_and_deletes_report_no_generated_keys() {
    let (_setup, mut conn) = setup(Config::new());

    let mut objects = customers(2);
    conn.insert_many_and_get(&mut objects).unwrap();

    objects[0].name = "renamed".into();
    let updated = conn.update_many(&objects[..1]).unwrap();
    assert_eq!(updated.rows[0].rows_affected, Some(1));
    assert!(updated.rows[0].generated_keys.is_empty());

    let deleted = conn.delete_many(&objects).unwrap();
    assert!(deleted.rows.iter().all(|row| row.generated_keys.is_empty()));

    let merged = conn
        .write_many(WriteOp::Merge, &[Some(&objects[0])])
        .unwrap();
    assert!(merged.rows[0].generated_keys.is_empty());
}

#[test]
fn no_generated_keys_without_generated_columns() {
    let (_setup, mut conn) = setup(Config::new());

    let mut tags = vec![
        Tag {
            label: "red".into(),
        },
        Tag {
            label: "blue".into(),
        },
    ];
    let result = conn.insert_many_and_get(&mut tags).unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.rows.iter().all(|row| row.generated_keys.is_empty()));
    assert_eq!(tags[0].label, "red");
}

#[test]
fn prepare_failure_names_the_first_chunk() {
    let (_setup, mut conn) = setup(Config::new().multi_row_size(2));

    // Build the binding, then remove the table underneath it.
    conn.count::<Customer>().unwrap();
    conn.execute_update("drop table customer").unwrap();

    let err = conn.insert_many(&customers(3)).unwrap_err();
    assert!(err.is_driver());
    assert_eq!(err.failed_chunk(), Some(0..2));

    let (_setup, mut conn) = setup(
        Config::new()
            .multi_row_strategy(MultiRowStrategy::SimpleBatch)
            .batch_size(2),
    );
    conn.count::<Customer>().unwrap();
    conn.execute_update("drop table customer").unwrap();

    let err = conn.update_many(&customers(3)).unwrap_err();
    assert_eq!(err.failed_chunk(), Some(0..2));
}
