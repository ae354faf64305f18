//! Property tests: pushdown never changes what a query returns.

use entiql_core::{Config, DbmsType, Filter, Predicate, Query};
use entiql_testkit::prelude::*;
use proptest::prelude::*;
use std::sync::atomic::{self, AtomicUsize};
use std::sync::Arc;

fn dbms_strategy() -> impl Strategy<Value = DbmsType> {
    prop::sample::select(DbmsType::ALL.to_vec())
}

fn predicates_strategy() -> impl Strategy<Value = Vec<entiql_core::Predicate>> {
    prop::collection::vec(user_predicate_strategy(), 0..4)
}

fn ids(users: &[User]) -> Vec<i64> {
    users.iter().map(|u| u.id).collect()
}

/// One pipeline stage, described as data so a case can be built twice.
#[derive(Debug, Clone)]
enum Step {
    Where(Predicate),
    WhereBoth(Predicate, Predicate),
    WhereButNot(Predicate, Predicate),
    Either(Predicate, Predicate),
    Unless(Predicate),
    ActiveOnly,
    SortById { descending: bool },
    AgeOneYearOn,
    Peek,
    Skip(usize),
    Limit(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    let p = user_predicate_strategy;
    prop_oneof![
        p().prop_map(Step::Where),
        (p(), p()).prop_map(|(a, b)| Step::WhereBoth(a, b)),
        (p(), p()).prop_map(|(a, b)| Step::WhereButNot(a, b)),
        (p(), p()).prop_map(|(a, b)| Step::Either(a, b)),
        p().prop_map(Step::Unless),
        Just(Step::ActiveOnly),
        any::<bool>().prop_map(|descending| Step::SortById { descending }),
        Just(Step::AgeOneYearOn),
        Just(Step::Peek),
        (0usize..4).prop_map(Step::Skip),
        (0usize..6).prop_map(Step::Limit),
    ]
}

fn steps_strategy() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(step_strategy(), 0..6)
}

fn build(query: Query<User>, steps: &[Step], peeked: &Arc<AtomicUsize>) -> Query<User> {
    steps.iter().cloned().fold(query, |query, step| match step {
        Step::Where(p) => query.filter(p),
        Step::WhereBoth(a, b) => query.filter(Filter::<User>::from(a).and(b)),
        Step::WhereButNot(a, b) => {
            query.filter(Filter::<User>::from(a).and(Filter::<User>::from(b).negate()))
        }
        Step::Either(a, b) => query.filter(Filter::<User>::from(a).or(b)),
        Step::Unless(p) => query.filter(Filter::<User>::from(p).negate()),
        Step::ActiveOnly => query.filter_with(|u: &User| u.active),
        Step::SortById { descending } => query.sorted_by(move |a: &User, b: &User| {
            if descending {
                b.id.cmp(&a.id)
            } else {
                a.id.cmp(&b.id)
            }
        }),
        Step::AgeOneYearOn => query.map(|mut u: User| {
            u.age = u.age.map(|age| age + 1);
            u
        }),
        Step::Peek => {
            let peeked = Arc::clone(peeked);
            query.peek(move |_| {
                peeked.fetch_add(1, atomic::Ordering::Relaxed);
            })
        }
        Step::Skip(n) => query.skip(n),
        Step::Limit(n) => query.limit(n),
    })
}

/// The field predicates a database would see: every field conjunct up to
/// the first stage that reshapes the sequence. `sorted` and in-memory
/// conjuncts do not stop the scan.
fn pushed_predicates(steps: &[Step]) -> Vec<Predicate> {
    let mut pushed = Vec::new();
    for step in steps {
        match step {
            Step::Where(p) | Step::WhereButNot(p, _) => pushed.push(p.clone()),
            Step::WhereBoth(a, b) => pushed.extend([a.clone(), b.clone()]),
            Step::Either(..) | Step::Unless(_) | Step::ActiveOnly | Step::SortById { .. } => {}
            Step::AgeOneYearOn | Step::Peek | Step::Skip(_) | Step::Limit(_) => break,
        }
    }
    pushed
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pushdown_preserves_results(
        users in users_strategy(),
        predicates in predicates_strategy(),
        dbms in dbms_strategy(),
        limit in prop::option::of(0usize..6),
    ) {
        let pushed = UserFixture::with_users(Config::new().dbms(dbms), users.clone());
        let mut query = pushed.query(&predicates);
        if let Some(n) = limit {
            query = query.limit(n);
        }
        let explain = query.explain().unwrap();
        let binds: usize = predicates.iter().map(|p| p.bind_count()).sum();
        prop_assert_eq!(explain.binds.len(), binds);
        pushed.serve_filtered(&explain.sql, &predicates);

        let mut query = pushed.query(&predicates);
        if let Some(n) = limit {
            query = query.limit(n);
        }
        let with_pushdown = query.to_vec().unwrap();

        let plain = UserFixture::with_users(Config::new().dbms(dbms).pushdown(false), users);
        plain.serve_all();
        let mut query = plain.query(&predicates);
        if let Some(n) = limit {
            query = query.limit(n);
        }
        let without_pushdown = query.to_vec().unwrap();

        prop_assert_eq!(ids(&with_pushdown), ids(&without_pushdown));
        prop_assert_eq!(with_pushdown, without_pushdown);
        prop_assert_eq!(pushed.journal.open_resources(), 0);
        prop_assert_eq!(plain.journal.open_resources(), 0);
    }

    #[test]
    fn pushdown_preserves_results_of_mixed_pipelines(
        users in users_strategy(),
        steps in steps_strategy(),
        dbms in dbms_strategy(),
    ) {
        let pushed = pushed_predicates(&steps);
        let unused = Arc::new(AtomicUsize::new(0));

        let on = UserFixture::with_users(Config::new().dbms(dbms), users.clone());
        let explain = build(on.manager.stream(), &steps, &unused).explain().unwrap();
        let binds: usize = pushed.iter().map(|p| p.bind_count()).sum();
        prop_assert_eq!(explain.binds.len(), binds);
        on.serve_filtered(&explain.sql, &pushed);
        let on_peeked = Arc::new(AtomicUsize::new(0));
        let with_pushdown = build(on.manager.stream(), &steps, &on_peeked).to_vec().unwrap();

        let off = UserFixture::with_users(Config::new().dbms(dbms).pushdown(false), users);
        off.serve_all();
        let off_peeked = Arc::new(AtomicUsize::new(0));
        let without_pushdown = build(off.manager.stream(), &steps, &off_peeked).to_vec().unwrap();

        prop_assert_eq!(with_pushdown, without_pushdown);
        prop_assert_eq!(
            on_peeked.load(atomic::Ordering::Relaxed),
            off_peeked.load(atomic::Ordering::Relaxed)
        );
        prop_assert_eq!(unused.load(atomic::Ordering::Relaxed), 0);
        prop_assert_eq!(on.journal.open_resources(), 0);
        prop_assert_eq!(off.journal.open_resources(), 0);
    }

    #[test]
    fn fast_count_matches_materialized_count(
        users in users_strategy(),
        predicates in predicates_strategy(),
        dbms in dbms_strategy(),
    ) {
        let fast = UserFixture::with_users(Config::new().dbms(dbms), users.clone());
        let explain = fast.query(&predicates).explain_count().unwrap();
        prop_assert!(explain.residual.is_empty());
        fast.serve_filtered_count(&explain.sql, &predicates);
        let counted = fast.query(&predicates).count().unwrap();

        let slow = UserFixture::with_users(
            Config::new().dbms(dbms).pushdown(false).count_fast_path(false),
            users,
        );
        slow.serve_all();
        let materialized = slow.query(&predicates).count().unwrap();

        prop_assert_eq!(counted, materialized);
        prop_assert_eq!(fast.journal.executed().len(), 1);
    }

    #[test]
    fn compilation_is_deterministic(
        predicates in predicates_strategy(),
        dbms in dbms_strategy(),
    ) {
        let fixture = UserFixture::new(Config::new().dbms(dbms));
        let first = fixture.query(&predicates).explain().unwrap();
        let second = fixture.query(&predicates).explain().unwrap();
        prop_assert_eq!(&first.sql, &second.sql);
        prop_assert_eq!(&first.binds, &second.binds);
        prop_assert!(first.residual.is_empty());
        prop_assert!(fixture.journal.events().is_empty());
    }
}
