//! Test fixtures.
//!
//! A small `User` entity with a managed table, a fixed sample data set and a
//! [`UserFixture`] that wires them to a [`ScriptedSource`]. The fixture can
//! also act as the database for pushed-down queries: given the predicates a
//! query pushes, it answers the compiled SQL with exactly the rows a real
//! database would return.

use entiql_core::{
    Column, Config, Filter, IntegerBoolMapper, Manager, Predicate, Query, Table, TableId,
};
use entiql_driver::{Journal, Row, ScriptedSource, Value};
use std::sync::Arc;

/// Sample entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Age, unknown for some users.
    pub age: Option<i64>,
    /// Whether the account is active; stored as 0/1.
    pub active: bool,
}

impl User {
    /// Creates a user.
    pub fn new(id: i64, name: &str, age: Option<i64>, active: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            active,
        }
    }
}

/// The `app.users` table: `id`, `name`, `age`, `active` and a disabled
/// `legacy` column.
pub fn users_table() -> Table<User> {
    Table::builder(TableId::new("app", "users"))
        .column(
            Column::new("id"),
            |u: &User| Value::Integer(u.id),
            |u: &mut User, v| u.id = v.as_integer().unwrap_or_default(),
        )
        .column(
            Column::new("name").db_name("user_name"),
            |u: &User| Value::from(u.name.as_str()),
            |u: &mut User, v| u.name = v.as_text().unwrap_or_default().to_string(),
        )
        .column(
            Column::new("age"),
            |u: &User| Value::from(u.age),
            |u: &mut User, v| u.age = v.as_integer(),
        )
        .column(
            Column::new("active").mapper(IntegerBoolMapper),
            |u: &User| Value::Bool(u.active),
            |u: &mut User, v| u.active = v.as_bool().unwrap_or_default(),
        )
        .column(
            Column::new("legacy").disabled(),
            |_: &User| Value::Null,
            |_: &mut User, _| {},
        )
        .build()
        .expect("users table is well formed")
}

/// A fixed data set with mixed case names, a null age and both activity
/// states.
pub fn sample_users() -> Vec<User> {
    vec![
        User::new(1, "Alice", Some(34), true),
        User::new(2, "bob", Some(17), true),
        User::new(3, "Carol", None, false),
        User::new(4, "alex", Some(18), true),
        User::new(5, "Dave", Some(65), false),
        User::new(6, "Eve", Some(29), true),
        User::new(7, "", Some(40), true),
        User::new(8, "ALBERT", Some(52), false),
    ]
}

/// Lays users out as rows in select-list order, database representation.
pub fn user_rows(users: &[User]) -> Vec<Row> {
    let table = users_table();
    users.iter().map(|u| table.to_row(u)).collect()
}

/// A `User` manager over a scripted driver.
pub struct UserFixture {
    /// The scripted driver.
    pub source: ScriptedSource,
    /// Its event journal.
    pub journal: Journal,
    /// The manager under test.
    pub manager: Manager<User>,
    /// The data set the fixture serves.
    pub users: Vec<User>,
}

impl UserFixture {
    /// Creates a fixture serving [`sample_users`].
    pub fn new(config: Config) -> Self {
        Self::with_users(config, sample_users())
    }

    /// Creates a fixture serving `users`.
    pub fn with_users(config: Config, users: Vec<User>) -> Self {
        let source = ScriptedSource::new();
        let journal = source.journal();
        let manager = Manager::new(users_table(), Arc::new(source.clone()), config);
        Self {
            source,
            journal,
            manager,
            users,
        }
    }

    /// Answers the base select with every user.
    pub fn serve_all(&self) {
        self.source
            .respond_with(self.manager.sql().select(), user_rows(&self.users));
    }

    /// Answers the base `COUNT(*)` with the number of users.
    pub fn serve_count(&self) {
        self.source.respond_with(
            self.manager.sql().count(),
            vec![Row::new(vec![Value::Integer(self.users.len() as i64)])],
        );
    }

    /// Answers `sql` with the users matching every predicate in `pushed`.
    ///
    /// Matching uses in-memory evaluation, which follows the same
    /// three-valued logic as the rendered SQL.
    pub fn serve_filtered(&self, sql: &str, pushed: &[Predicate]) {
        let matching = self.matching(pushed);
        self.source.respond_with(sql, user_rows(&matching));
    }

    /// Answers the count statement `sql` with the number of users matching
    /// every predicate in `pushed`.
    pub fn serve_filtered_count(&self, sql: &str, pushed: &[Predicate]) {
        let n = self.matching(pushed).len() as i64;
        self.source
            .respond_with(sql, vec![Row::new(vec![Value::Integer(n)])]);
    }

    /// The users matching every predicate in `predicates`.
    pub fn matching(&self, predicates: &[Predicate]) -> Vec<User> {
        let table = self.manager.table();
        self.users
            .iter()
            .filter(|user| {
                predicates.iter().all(|p| {
                    table
                        .resolve(p.field())
                        .map(|(_, accessor)| p.test(&accessor.get(user)))
                        .unwrap_or(false)
                })
            })
            .cloned()
            .collect()
    }

    /// Builds a query with one filter stage per predicate.
    pub fn query(&self, predicates: &[Predicate]) -> Query<User> {
        predicates
            .iter()
            .cloned()
            .fold(self.manager.stream(), |q, p| q.filter(Filter::Field(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_back_to_users() {
        let table = users_table();
        for (user, row) in sample_users().iter().zip(user_rows(&sample_users())) {
            assert_eq!(&table.map_row(&row).unwrap(), user);
        }
    }

    #[test]
    fn matching_uses_sql_null_semantics() {
        let fixture = UserFixture::new(Config::default());
        let age = fixture.manager.field("age");
        let adults = fixture.matching(&[age.greater_or_equal(18)]);
        assert!(adults.iter().all(|u| u.age.is_some()));
        let minors = fixture.matching(&[age.greater_or_equal(18).negate()]);
        assert_eq!(adults.len() + minors.len() + 1, fixture.users.len());
    }
}
