use std::path::Path;

use dpool_csv::{
    Bindings, DataType, Database, DatabaseConfig, DatabaseError, Entity, LoadPolicy, Predicate,
};
use tempfile::{TempDir, tempdir};

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    first_name: String,
    last_name: String,
    age: i64,
    user_id: String,
}

impl Entity for User {
    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new()
            .text("firstname", |u| u.first_name.clone(), |u, v| u.first_name = v)
            .text("lastname", |u| u.last_name.clone(), |u, v| u.last_name = v)
            .int64("age", |u| u.age, |u, v| u.age = v)
            .text("userid", |u| u.user_id.clone(), |u, v| u.user_id = v)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Food {
    name: String,
    price: i64,
}

impl Entity for Food {
    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new()
            .text("name", |f| f.name.clone(), |f, v| f.name = v)
            .int64("price", |f| f.price, |f, v| f.price = v)
    }
}

/// Binds only part of the user table.
#[derive(Debug, Default)]
struct Person {
    first_name: String,
    age: i64,
}

impl Entity for Person {
    fn table_name() -> String {
        "user".to_string()
    }

    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new()
            .text("firstname", |p| p.first_name.clone(), |p, v| p.first_name = v)
            .int64("age", |p| p.age, |p, v| p.age = v)
    }
}

/// Binds a column the user table does not have.
#[derive(Debug, Default)]
struct Member {
    first_name: String,
    email: String,
}

impl Entity for Member {
    fn table_name() -> String {
        "user".to_string()
    }

    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new()
            .text("firstname", |m| m.first_name.clone(), |m, v| m.first_name = v)
            .text("email", |m| m.email.clone(), |m, v| m.email = v)
    }
}

/// Leaves the `int64` column `age` unbound.
#[derive(Debug, Default)]
struct Nickname {
    first_name: String,
}

impl Entity for Nickname {
    fn table_name() -> String {
        "user".to_string()
    }

    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new().text("firstname", |n| n.first_name.clone(), |n, v| n.first_name = v)
    }
}

/// Binds `age` as text although the column is `int64`.
#[derive(Debug, Default)]
struct Account {
    age: String,
}

impl Entity for Account {
    fn table_name() -> String {
        "user".to_string()
    }

    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new().text("age", |a| a.age.clone(), |a, v| a.age = v)
    }
}

fn write_table(root: &Path, dir: &str, data: &str, types: &str) {
    let path = root.join(dir);
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("data.csv"), data).unwrap();
    std::fs::write(path.join("types.csv"), types).unwrap();
}

/// Creates the `user` and `food` fixture tables.
fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    write_table(
        dir.path(),
        "user",
        "firstname,lastname,age,userid\njohn,doe,21,1\n",
        "firstname,lastname,age,userid\nstring,string,int64,string\n",
    );
    write_table(
        dir.path(),
        "food",
        "name,price\nburger,15\nsteak,45\nfries,5\n",
        "name,price\nstring,int64\n",
    );
    dir
}

fn loaded(dir: &TempDir) -> Database {
    let mut db = Database::new();
    db.ingest(dir.path()).unwrap();
    db
}

fn read_data(dir: &TempDir, table: &str) -> String {
    std::fs::read_to_string(dir.path().join(table).join("data.csv")).unwrap()
}

#[test]
fn test_ingest_registers_tables() {
    let dir = fixture();
    let db = loaded(&dir);

    assert_eq!(db.table_names().collect::<Vec<_>>(), vec!["food", "user"]);
    assert_eq!(db.count::<User>().unwrap(), 1);
    assert_eq!(db.count::<Food>().unwrap(), 3);

    let user = db.get_table("user").unwrap();
    assert_eq!(user.schema().data_type("age"), Some(DataType::Int64));
    assert_eq!(user.schema().data_type("firstname"), Some(DataType::Text));
}

#[test]
fn test_get_first_user() {
    let dir = fixture();
    let db = loaded(&dir);

    let mut user = User::default();
    db.get(&mut user, 0).unwrap();

    assert_eq!(user.first_name, "john");
    assert_eq!(user.last_name, "doe");
    assert_eq!(user.age, 21);
    assert_eq!(user.user_id, "1");
}

#[test]
fn test_get_out_of_range_leaves_destination_untouched() {
    let dir = fixture();
    let db = loaded(&dir);

    let mut user = User {
        first_name: "unchanged".to_string(),
        ..User::default()
    };
    let err = db.get(&mut user, 1).unwrap_err();

    assert!(matches!(
        err,
        DatabaseError::IndexOutOfRange {
            index: 1,
            len: 1,
            ..
        }
    ));
    assert_eq!(user.first_name, "unchanged");
}

#[test]
fn test_get_partial_shape() {
    let dir = fixture();
    let db = loaded(&dir);

    let mut person = Person::default();
    db.get(&mut person, 0).unwrap();

    assert_eq!(person.first_name, "john");
    assert_eq!(person.age, 21);
}

#[test]
fn test_get_skips_columns_the_table_lacks() {
    let dir = fixture();
    let db = loaded(&dir);

    let mut member = Member {
        email: "kept@example.com".to_string(),
        ..Member::default()
    };
    db.get(&mut member, 0).unwrap();

    assert_eq!(member.first_name, "john");
    assert_eq!(member.email, "kept@example.com");
}

#[test]
fn test_get_rejects_mismatched_binding() {
    let dir = fixture();
    let db = loaded(&dir);

    let err = db.get(&mut Account::default(), 0).unwrap_err();
    assert!(matches!(err, DatabaseError::TypeMismatch { .. }));
}

#[test]
fn test_unknown_table() {
    #[derive(Debug, Default)]
    struct Order;

    impl Entity for Order {
        fn bindings() -> Bindings<Self> {
            Bindings::new()
        }
    }

    let dir = fixture();
    let mut db = loaded(&dir);

    let err = db.get(&mut Order, 0).unwrap_err();
    assert!(matches!(err, DatabaseError::TableNotFound(ref name) if name == "order"));

    let err = db.set(&Order).unwrap_err();
    assert!(matches!(err, DatabaseError::TableNotFound(_)));

    let mut orders: Vec<Order> = Vec::new();
    let err = db
        .filter(&mut orders, "id", Predicate::int64(|_| true))
        .unwrap_err();
    assert!(matches!(err, DatabaseError::TableNotFound(_)));
}

#[test]
fn test_filter_text_column() {
    let dir = fixture();
    let db = loaded(&dir);

    let mut users: Vec<User> = Vec::new();
    db.filter(&mut users, "firstname", Predicate::text(|v| v == "john"))
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].first_name, "john");
    assert_eq!(users[0].last_name, "doe");
}

#[test]
fn test_filter_int_column_in_table_order() {
    let dir = fixture();
    let db = loaded(&dir);

    let limit = 20;
    let mut foods: Vec<Food> = Vec::new();
    db.filter(&mut foods, "price", Predicate::int64(|v| v <= limit))
        .unwrap();

    let names: Vec<&str> = foods.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["burger", "fries"]);
}

#[test]
fn test_filter_validation_errors() {
    let dir = fixture();
    let db = loaded(&dir);
    let mut foods: Vec<Food> = Vec::new();

    let err = db
        .filter(&mut foods, "rating", Predicate::int64(|_| true))
        .unwrap_err();
    assert!(matches!(err, DatabaseError::ColumnNotFound { ref column, .. } if column == "rating"));

    let err = db
        .filter(&mut foods, "price", Predicate::text(|_| true))
        .unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::TypeMismatch {
            expected: DataType::Int64,
            found: DataType::Text,
            ..
        }
    ));

    assert!(foods.is_empty());
}

#[test]
fn test_set_then_filter() {
    let dir = fixture();
    let mut db = loaded(&dir);

    let fang = User {
        first_name: "Fang".to_string(),
        last_name: "PS".to_string(),
        age: 21,
        user_id: "4".to_string(),
    };
    db.set(&fang).unwrap();

    let mut users: Vec<User> = Vec::new();
    db.filter(&mut users, "firstname", Predicate::text(|v| v == "Fang"))
        .unwrap();

    assert_eq!(users, vec![fang]);
    assert_eq!(db.count::<User>().unwrap(), 2);

    let mut foods: Vec<Food> = Vec::new();
    db.filter(&mut foods, "price", Predicate::int64(|v| v <= 20))
        .unwrap();
    assert_eq!(foods.len(), 2);
}

#[test]
fn test_set_persists_to_data_file() {
    let dir = fixture();
    let mut db = loaded(&dir);

    db.set(&User {
        first_name: "Fang".to_string(),
        last_name: "PS".to_string(),
        age: 21,
        user_id: "4".to_string(),
    })
    .unwrap();

    assert_eq!(
        read_data(&dir, "user"),
        "firstname,lastname,age,userid\njohn,doe,21,1\nFang,PS,21,4\n"
    );

    let reloaded = loaded(&dir);
    let mut user = User::default();
    reloaded.get(&mut user, 1).unwrap();
    assert_eq!(user.first_name, "Fang");
    assert_eq!(user.age, 21);
}

#[test]
fn test_set_sparse_shape_writes_empty_cells() {
    let dir = fixture();
    let mut db = loaded(&dir);

    db.set(&Person {
        first_name: "ana".to_string(),
        age: 33,
    })
    .unwrap();

    assert_eq!(
        read_data(&dir, "user"),
        "firstname,lastname,age,userid\njohn,doe,21,1\nana,,33,\n"
    );

    let mut user = User::default();
    db.get(&mut user, 1).unwrap();
    assert_eq!(user.first_name, "ana");
    assert_eq!(user.last_name, "");
}

#[test]
fn test_set_rejects_unknown_column_without_writing() {
    let dir = fixture();
    let mut db = loaded(&dir);
    let before = read_data(&dir, "user");

    let err = db
        .set(&Member {
            first_name: "eve".to_string(),
            email: "eve@example.com".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, DatabaseError::ColumnNotFound { ref column, .. } if column == "email"));
    assert_eq!(db.count::<User>().unwrap(), 1);
    assert_eq!(read_data(&dir, "user"), before);
}

#[test]
fn test_set_sparse_shape_matches_after_reload() {
    let dir = fixture();
    let mut db = loaded(&dir);

    db.set(&Person {
        first_name: "ana".to_string(),
        age: 33,
    })
    .unwrap();

    let mut before: Vec<User> = Vec::new();
    db.filter(&mut before, "lastname", Predicate::text(|s| s.is_empty()))
        .unwrap();

    db.ingest(dir.path()).unwrap();
    let mut after: Vec<User> = Vec::new();
    db.filter(&mut after, "lastname", Predicate::text(|s| s.is_empty()))
        .unwrap();

    let names = |users: &[User]| -> Vec<String> {
        users.iter().map(|u| u.first_name.clone()).collect()
    };
    assert_eq!(names(&before), vec!["ana"]);
    assert_eq!(names(&after), names(&before));
}

#[test]
fn test_set_rejects_unbound_int64_column() {
    let dir = fixture();
    let mut db = loaded(&dir);
    let before = read_data(&dir, "user");

    let err = db
        .set(&Nickname {
            first_name: "kit".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, DatabaseError::UnboundColumn { ref column, .. } if column == "age"));
    assert_eq!(db.count::<User>().unwrap(), 1);
    assert_eq!(read_data(&dir, "user"), before);

    db.ingest(dir.path()).unwrap();
    assert_eq!(db.count::<User>().unwrap(), 1);
}

#[test]
fn test_set_rejects_mismatched_binding() {
    let dir = fixture();
    let mut db = loaded(&dir);

    let err = db
        .set(&Account {
            age: "old".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, DatabaseError::TypeMismatch { .. }));
    assert_eq!(db.count::<User>().unwrap(), 1);
}

#[test]
fn test_reingest_is_idempotent() {
    let dir = fixture();
    let mut db = loaded(&dir);
    let first = db.describe_table("food").unwrap();

    db.ingest(dir.path()).unwrap();
    let second = db.describe_table("food").unwrap();

    assert_eq!(first, second);
    assert_eq!(db.table_names().count(), 2);
    assert_eq!(
        db.get_table("food").unwrap().records(),
        loaded(&dir).get_table("food").unwrap().records()
    );
}

#[test]
fn test_table_name_is_cut_at_first_dot() {
    let dir = tempdir().unwrap();
    write_table(
        dir.path(),
        "food.2024.csv",
        "name,price\nsoup,8\n",
        "name,price\nstring,int64\n",
    );

    let db = loaded(&dir);
    assert!(db.table_exists("food"));

    let mut food = Food::default();
    db.get(&mut food, 0).unwrap();
    assert_eq!(food.name, "soup");
}

#[test]
fn test_unknown_type_name_is_text() {
    let dir = tempdir().unwrap();
    write_table(
        dir.path(),
        "food",
        "name,price\nsoup,cheap\n",
        "name,price\nstring,money\n",
    );

    let db = loaded(&dir);
    let table = db.get_table("food").unwrap();
    assert_eq!(table.schema().data_type("price"), Some(DataType::Text));
}

#[test]
fn test_continue_policy_reports_all_failures() {
    let dir = fixture();
    write_table(dir.path(), "broken", "a,b\n1,2\n", "a,c\nint64,int64\n");
    write_table(dir.path(), "typeless", "a\n1\n", "a\n");

    let mut db = Database::new();
    let err = db.ingest(dir.path()).unwrap_err();

    match err {
        DatabaseError::Ingest { failures, .. } => {
            assert_eq!(failures.len(), 2);
            assert!(matches!(failures[0], DatabaseError::ColumnMismatch { .. }));
            assert!(matches!(failures[1], DatabaseError::MissingTypes { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(db.table_names().collect::<Vec<_>>(), vec!["food", "user"]);
}

#[test]
fn test_abort_policy_keeps_earlier_tables() {
    let dir = fixture();
    write_table(dir.path(), "meals", "name,kcal\nsoup,lots\n", "name,kcal\nstring,int64\n");

    let config = DatabaseConfig::default().with_load_policy(LoadPolicy::Abort);
    let mut db = Database::with_config(config);
    let err = db.ingest(dir.path()).unwrap_err();

    assert!(matches!(err, DatabaseError::InvalidInteger { ref column, .. } if column == "kcal"));
    assert_eq!(db.table_names().collect::<Vec<_>>(), vec!["food"]);
}

#[test]
fn test_extra_file_fails_table() {
    let dir = fixture();
    std::fs::write(dir.path().join("user").join("backup.csv"), "x").unwrap();

    let mut db = Database::new();
    let err = db.ingest(dir.path()).unwrap_err();

    match err {
        DatabaseError::Ingest { failures, .. } => {
            assert!(matches!(
                failures[0],
                DatabaseError::UnexpectedFile { ref file, .. } if file == "backup.csv"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!db.table_exists("user"));
    assert!(db.table_exists("food"));
}

#[test]
fn test_relative_path_resolves_against_base_dir() {
    let dir = tempdir().unwrap();
    write_table(
        &dir.path().join("data"),
        "food",
        "name,price\nsoup,8\n",
        "name,price\nstring,int64\n",
    );

    let config = DatabaseConfig::default().with_base_dir(dir.path());
    let mut db = Database::with_config(config);
    db.ingest("data").unwrap();

    assert_eq!(db.count::<Food>().unwrap(), 1);
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let mut db = Database::new();

    let err = db.ingest(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, DatabaseError::Io { .. }));
}

#[test]
fn test_describe_table() {
    let dir = fixture();
    let db = loaded(&dir);

    let described = db.describe_table("user").unwrap();
    assert!(described.contains("firstname"));
    assert!(described.contains("john"));
    assert!(described.contains("21"));

    assert!(matches!(
        db.describe_table("nope"),
        Err(DatabaseError::TableNotFound(_))
    ));
}
